// bird-conf: Configuration generator for the BIRD routing daemon
// Copyright (C) 2024 The bird-conf Authors
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! This module contains the code for reading the declaration file.
//!
//! The declaration file is a TOML document:
//!
//! ```toml
//! [output]
//! conf_path = "/etc/bird.conf"
//! confd_dir = "/etc/bird.d"
//!
//! [global]
//! router_id = "172.16.254.254"
//! environment = "rp_env"
//!
//! [[bgp]]
//! name = "uplink"
//! local_as = 65000
//! remote_ip = "10.0.0.2"
//! remote_as = 65001
//! mode = "confd"
//!
//! [[filter]]
//! name = "rip_in"
//! body = "{ accept; }"
//! defines = { am = "[= 65000 65000 =]" }
//! variables = { ps = "pair set", odds = "int set" }
//! ```
//!
//! The tables `defines` and `variables` keep the order in which they are written in the file.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    declarations::Declarations,
    render::{BgpProtocol, Filter, GlobalConfig, Target, DEFAULT_CONF_PATH},
    types::ValidationError,
};

/// Error thrown while reading the declaration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file cannot be read.
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        /// Path of the declaration file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid declaration file.
    #[error("Cannot parse the declaration file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A declaration refers to an output location that is not configured.
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Whether a declaration is appended to the main file or written to its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Append to `output.conf_path`.
    #[default]
    Concat,
    /// Write to its own file inside `output.confd_dir`.
    Confd,
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Main configuration file.
    #[serde(default = "default_conf_path")]
    pub conf_path: PathBuf,
    /// Directory for declarations in the `confd` mode.
    #[serde(default)]
    pub confd_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            conf_path: default_conf_path(),
            confd_dir: None,
        }
    }
}

impl OutputConfig {
    /// Resolve the target of an instance with the given mode.
    fn target(&self, name: &str, mode: Mode) -> Result<Target, ValidationError> {
        match mode {
            Mode::Concat => Ok(Target::Concat(self.conf_path.clone())),
            Mode::Confd => self
                .confd_dir
                .clone()
                .map(Target::ConfD)
                .ok_or_else(|| ValidationError::MissingConfdDir(name.to_string())),
        }
    }
}

/// Default value of `output.conf_path`.
fn default_conf_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONF_PATH)
}

/// The `[global]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSection {
    /// Router id as a dotted-quad.
    pub router_id: String,
    /// Environment shown in the header.
    #[serde(default)]
    pub environment: Option<String>,
    /// Managing system shown in the header.
    #[serde(default)]
    pub managed_by: Option<String>,
    /// Output mode.
    #[serde(default)]
    pub mode: Mode,
}

/// A `[[bgp]]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BgpSection {
    /// Name of the protocol instance.
    pub name: String,
    /// Local AS number.
    pub local_as: i64,
    /// Address of the neighbor.
    pub remote_ip: String,
    /// AS number of the neighbor.
    #[serde(default)]
    pub remote_as: Option<i64>,
    /// Output mode.
    #[serde(default)]
    pub mode: Mode,
}

/// A `[[filter]]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Name of the filter.
    pub name: String,
    /// Filter body, written verbatim.
    pub body: String,
    /// Constant definitions, in order.
    #[serde(default)]
    pub defines: IndexMap<String, String>,
    /// Variable declarations (name to type), in order.
    #[serde(default)]
    pub variables: IndexMap<String, String>,
    /// Output mode.
    #[serde(default)]
    pub mode: Mode,
}

/// The complete declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
    /// Global settings.
    #[serde(default)]
    pub global: Option<GlobalSection>,
    /// BGP protocol instances.
    #[serde(default)]
    pub bgp: Vec<BgpSection>,
    /// Filters.
    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterSection>,
}

impl FromStr for ConfigFile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl ConfigFile {
    /// Read and parse the declaration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = content.parse()?;
        log::debug!(
            "Loaded {}: {} bgp protocols, {} filters",
            path.display(),
            cfg.bgp.len(),
            cfg.filters.len()
        );
        Ok(cfg)
    }

    /// Turn the file into declarations, resolving the output location of every instance. The
    /// parameters themselves are only validated when rendering.
    pub fn declarations(&self) -> Result<Declarations, ConfigError> {
        let mut decl = Declarations::new();

        if let Some(g) = &self.global {
            let mut global = GlobalConfig::new(g.router_id.as_str());
            if let Some(env) = &g.environment {
                global.environment(env.as_str());
            }
            if let Some(managed_by) = &g.managed_by {
                global.managed_by(managed_by.as_str());
            }
            global.write_to(self.output.target("global", g.mode)?);
            decl.global(global);
        }

        for f in &self.filters {
            let mut filter = Filter::new(f.name.as_str(), f.body.as_str());
            filter
                .defines(f.defines.clone())
                .variables(f.variables.clone())
                .write_to(self.output.target(&f.name, f.mode)?);
            decl.filter(filter);
        }

        for b in &self.bgp {
            let mut protocol = BgpProtocol::new(b.name.as_str(), b.local_as, b.remote_ip.as_str());
            if let Some(remote_as) = b.remote_as {
                protocol.remote_as(remote_as);
            }
            protocol.write_to(self.output.target(&b.name, b.mode)?);
            decl.bgp(protocol);
        }

        Ok(decl)
    }
}
