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

//! # bird-conf: Configuration generator for the BIRD routing daemon
//!
//! This library generates `bird.conf` from typed declarations of the global router settings, BGP
//! protocol instances, and filters. The output is deterministic: it only depends on the set of
//! declarations, and never on the order in which they were declared. This makes repeated runs
//! idempotent, and the daemon only needs to be reloaded if the content actually changed.
//!
//! ## Structure
//! The pipeline from declarations to files is built as follows:
//! - The module [`render`] turns every declaration ([`render::GlobalConfig`],
//!   [`render::BgpProtocol`] and [`render::Filter`]) into a [`fragment::Fragment`], validating all
//!   parameters on the way.
//! - The module [`fragment`] defines the key by which fragments are ordered, and the identifiers
//!   (`bird_conf_50_bgp_<name>`) by which they can be referred to.
//! - The module [`assemble`] collects all fragments of a target file, orders them, and
//!   concatenates them into an [`assemble::AssembledConfig`] together with its content hash.
//! - The module [`output`] persists the assembled files and reports which of them changed.
//! - The module [`config`] reads the declarations from a TOML file, and [`declarations`] ties
//!   everything together.
//!
//! ## Example usage
//!
//! ```
//! use bird_conf::prelude::*;
//!
//! fn main() -> Result<(), bird_conf::Error> {
//!     let mut decl = Declarations::new();
//!     decl.global(GlobalConfig::new("172.16.254.254"))
//!         .bgp(BgpProtocol::new("uplink", 65000, "10.0.0.2").remote_as(65001).clone());
//!
//!     let mut writer = MemoryWriter::new();
//!     let report = decl.apply(&mut writer)?;
//!     assert!(report.needs_reload());
//!
//!     // applying the same declarations again does not change anything.
//!     let report = decl.apply(&mut writer)?;
//!     assert!(!report.needs_reload());
//!     Ok(())
//! }
//! ```

#![deny(
    missing_docs,
    clippy::missing_docs_in_private_items,
    missing_debug_implementations,
    rust_2018_idioms
)]

use std::path::PathBuf;

use thiserror::Error;

pub mod assemble;
pub mod config;
pub mod declarations;
pub mod fragment;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
mod test;

/// Re-exports of the commonly used types.
pub mod prelude {
    pub use crate::{
        assemble::{assemble, assemble_all, AssembledConfig, ContentHash},
        declarations::Declarations,
        fragment::{Fragment, FragmentKind},
        output::{Change, FileWriter, MemoryWriter, OutputWriter, Report},
        render::{BgpProtocol, Filter, GlobalConfig, Render, Target},
    };
}

/// Error that aborts the generation of the configuration. No file is written once any of these
/// errors occurs during rendering or assembling.
#[derive(Debug, Error)]
pub enum Error {
    /// A declaration is invalid.
    #[error("Invalid declaration for {}: {source}", .target.display())]
    Validation {
        /// The file the declaration was addressed to
        target: PathBuf,
        /// The reason
        #[source]
        source: types::ValidationError,
    },
    /// Two declarations collide in the same file.
    #[error(transparent)]
    Assemble(#[from] assemble::AssembleError),
    /// A file could not be written.
    #[error(transparent)]
    Persistence(#[from] output::PersistenceError),
    /// The declaration file could not be read.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
