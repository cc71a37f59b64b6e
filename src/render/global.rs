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

//! Global router settings.

use std::net::Ipv4Addr;

use super::{Render, Target};
use crate::{fragment::FragmentKind, types::ValidationError};

/// Managing system named in the header unless overridden.
const DEFAULT_MANAGED_BY: &str = "Puppet";
/// Environment named in the header unless overridden.
const DEFAULT_ENVIRONMENT: &str = "rp_env";

/// Global settings of the daemon: the header comment and the router id.
///
/// ```
/// # use bird_conf::render::{GlobalConfig, Render};
/// assert_eq!(
///     GlobalConfig::new("10.0.0.1").environment("lab").render_content().unwrap(),
///     "\n#\n# Managed by Puppet in the lab environment\n#\n\nrouter id 10.0.0.1\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    router_id: String,
    managed_by: String,
    environment: String,
    target: Target,
}

impl GlobalConfig {
    /// Create the global settings with the given router id, written to the default target.
    pub fn new(router_id: impl Into<String>) -> Self {
        Self {
            router_id: router_id.into(),
            managed_by: String::from(DEFAULT_MANAGED_BY),
            environment: String::from(DEFAULT_ENVIRONMENT),
            target: Target::default(),
        }
    }

    /// Set the name of the managing system shown in the header.
    pub fn managed_by(&mut self, managed_by: impl Into<String>) -> &mut Self {
        self.managed_by = managed_by.into();
        self
    }

    /// Set the environment shown in the header.
    pub fn environment(&mut self, environment: impl Into<String>) -> &mut Self {
        self.environment = environment.into();
        self
    }

    /// Set the output target.
    pub fn write_to(&mut self, target: Target) -> &mut Self {
        self.target = target;
        self
    }
}

impl Render for GlobalConfig {
    fn kind(&self) -> FragmentKind {
        FragmentKind::Global
    }

    fn name(&self) -> &str {
        ""
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn render_content(&self) -> Result<String, ValidationError> {
        let router_id: Ipv4Addr = self
            .router_id
            .parse()
            .map_err(|_| ValidationError::InvalidRouterId(self.router_id.clone()))?;

        Ok(format!(
            "
#
# Managed by {} in the {} environment
#

router id {}
",
            self.managed_by, self.environment, router_id
        ))
    }
}
