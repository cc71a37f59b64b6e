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

//! This module turns declarations into [`Fragment`]s. The main trait is [`Render`], which is
//! implemented for every kind of declaration: [`GlobalConfig`], [`BgpProtocol`] and [`Filter`].
//!
//! Rendering is pure. All parameters are validated first, and a [`ValidationError`] is returned
//! before any text is produced. Every rendered fragment starts with a single newline, such that
//! concatenating fragments yields exactly one blank line between two consecutive blocks.

use std::path::{Path, PathBuf};

use crate::{
    fragment::{Fragment, FragmentKind},
    types::ValidationError,
};

mod bgp;
mod filter;
mod global;

pub use bgp::BgpProtocol;
pub use filter::Filter;
pub use global::GlobalConfig;

/// Default path of the main configuration file.
pub const DEFAULT_CONF_PATH: &str = "/etc/bird.conf";

/// Where a declaration is written to. A declaration is either appended to a shared file, or it is
/// written to a file of its own inside a conf.d directory. The two modes are never mixed for the
/// same declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Assemble the fragment into the given file, together with all other fragments addressed to
    /// the same file.
    Concat(PathBuf),
    /// Write the fragment into its own file in the given directory, named after its kind and name,
    /// e.g., `<dir>/protocol_bgp_<name>.conf`.
    ConfD(PathBuf),
}

impl Default for Target {
    fn default() -> Self {
        Self::Concat(PathBuf::from(DEFAULT_CONF_PATH))
    }
}

impl Target {
    /// Compute the file path for a fragment of the given kind and name.
    ///
    /// ```
    /// # use bird_conf::{fragment::FragmentKind, render::Target};
    /// # use std::path::Path;
    /// let concat = Target::Concat("/etc/bird.conf".into());
    /// assert_eq!(concat.path(FragmentKind::Bgp, "peer"), Path::new("/etc/bird.conf"));
    ///
    /// let confd = Target::ConfD("/etc/bird.d".into());
    /// assert_eq!(
    ///     confd.path(FragmentKind::Bgp, "peer"),
    ///     Path::new("/etc/bird.d/protocol_bgp_peer.conf")
    /// );
    /// assert_eq!(
    ///     confd.path(FragmentKind::Filter, "rip_in"),
    ///     Path::new("/etc/bird.d/filter_rip_in.conf")
    /// );
    /// ```
    pub fn path(&self, kind: FragmentKind, name: &str) -> PathBuf {
        match self {
            Target::Concat(path) => path.clone(),
            Target::ConfD(dir) => dir.join(confd_file_name(kind, name)),
        }
    }

    /// Create a concat target.
    pub fn concat(path: impl AsRef<Path>) -> Self {
        Self::Concat(path.as_ref().to_path_buf())
    }
}

/// File name of a fragment written in the conf.d mode.
fn confd_file_name(kind: FragmentKind, name: &str) -> String {
    match kind {
        FragmentKind::Global => String::from("global.conf"),
        FragmentKind::Filter => format!("filter_{name}.conf"),
        FragmentKind::Bgp => format!("protocol_bgp_{name}.conf"),
    }
}

/// Trait implemented by every declaration that can be rendered into a [`Fragment`].
pub trait Render {
    /// Kind of the produced fragment.
    fn kind(&self) -> FragmentKind;

    /// Name of the declared instance. Singletons return an empty string.
    fn name(&self) -> &str;

    /// Where the fragment is written to.
    fn target(&self) -> &Target;

    /// Validate all parameters and produce the text of the fragment.
    fn render_content(&self) -> Result<String, ValidationError>;

    /// Validate all parameters and produce the fragment.
    fn render(&self) -> Result<Fragment, ValidationError> {
        let content = self.render_content()?;
        let fragment = Fragment::new(
            self.target().path(self.kind(), self.name()),
            self.kind(),
            self.name(),
            content,
        );
        log::debug!(
            "Rendered {} for {}",
            fragment.id(),
            fragment.target_path.display()
        );
        Ok(fragment)
    }
}
