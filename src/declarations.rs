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

//! The set of all declared instances, and the pipeline from declarations to persisted files.

use std::{collections::BTreeMap, path::PathBuf};

use itertools::Itertools;

use crate::{
    assemble::{assemble_all, AssembledConfig},
    fragment::Fragment,
    output::{apply, OutputWriter, Report},
    render::{BgpProtocol, Filter, GlobalConfig, Render},
    Error,
};

/// All instances declared by the caller. The order of declaration does not matter; the output is
/// fully determined by the names and kinds of the instances.
///
/// ```
/// # use bird_conf::{declarations::Declarations, render::{BgpProtocol, GlobalConfig}};
/// let mut decl = Declarations::new();
/// decl.bgp(BgpProtocol::new("peer", 65000, "10.0.0.2"))
///     .global(GlobalConfig::new("10.0.0.1"));
/// let configs = decl.build().unwrap();
/// let cfg = &configs[std::path::Path::new("/etc/bird.conf")];
/// assert_eq!(cfg.fragment_ids(), ["bird_conf_10_global", "bird_conf_50_bgp_peer"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    globals: Vec<GlobalConfig>,
    protocols: Vec<BgpProtocol>,
    filters: Vec<Filter>,
}

impl Declarations {
    /// Create an empty set of declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the global settings of a target file.
    pub fn global(&mut self, global: GlobalConfig) -> &mut Self {
        self.globals.push(global);
        self
    }

    /// Declare a BGP protocol instance.
    pub fn bgp(&mut self, protocol: BgpProtocol) -> &mut Self {
        self.protocols.push(protocol);
        self
    }

    /// Declare a filter.
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Returns `true` if nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.protocols.is_empty() && self.filters.is_empty()
    }

    /// Iterate over all declared instances.
    pub fn instances(&self) -> impl Iterator<Item = &dyn Render> {
        self.globals
            .iter()
            .map(|x| x as &dyn Render)
            .chain(self.filters.iter().map(|x| x as &dyn Render))
            .chain(self.protocols.iter().map(|x| x as &dyn Render))
    }

    /// Render every declared instance. Fails on the first invalid instance.
    pub fn fragments(&self) -> Result<Vec<Fragment>, Error> {
        self.instances()
            .map(|x| {
                x.render().map_err(|source| Error::Validation {
                    target: x.target().path(x.kind(), x.name()),
                    source,
                })
            })
            .collect()
    }

    /// Render and assemble all target files. Nothing is returned unless every file could be built.
    pub fn build(&self) -> Result<BTreeMap<PathBuf, AssembledConfig>, Error> {
        let fragments = self.fragments()?;
        let configs = assemble_all(&fragments)?;
        log::debug!(
            "Built {} files: {}",
            configs.len(),
            configs.keys().map(|p| p.display()).join(", ")
        );
        Ok(configs)
    }

    /// Build all target files and hand them to the writer. Every file is built before the first
    /// one is written, so an invalid declaration never leads to a partially written configuration.
    pub fn apply<W: OutputWriter + ?Sized>(&self, writer: &mut W) -> Result<Report, Error> {
        let configs = self.build()?;
        Ok(apply(writer, configs.values())?)
    }
}
