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

//! BGP protocol instances.

use std::net::IpAddr;

use lazy_static::lazy_static;
use regex::Regex;

use super::{Render, Target};
use crate::{
    fragment::FragmentKind,
    types::{AsNumber, InstanceName, ValidationError},
};

lazy_static! {
    /// Interface names allowed as the scope of a link-local neighbor.
    static ref IFACE_RE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap();
}

/// BGP session towards a single neighbor.
///
/// ```
/// # use bird_conf::render::{BgpProtocol, Render};
/// assert_eq!(
///     BgpProtocol::new("peer", 65000, "10.0.0.2").render_content().unwrap(),
///     "
/// protocol bgp peer {
///     local as 65000
///     neighbor 10.0.0.2
///
///     export none
///     import all
/// }
/// "
/// );
/// ```
///
/// Setting the remote AS adds the `neighbor as` line, and nothing else:
///
/// ```
/// # use bird_conf::render::{BgpProtocol, Render};
/// assert_eq!(
///     BgpProtocol::new("peer", 65000, "10.0.0.2")
///         .remote_as(65001)
///         .render_content()
///         .unwrap(),
///     "
/// protocol bgp peer {
///     local as 65000
///     neighbor as 65001
///     neighbor 10.0.0.2
///
///     export none
///     import all
/// }
/// "
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpProtocol {
    name: String,
    local_as: i64,
    remote_ip: String,
    remote_as: Option<i64>,
    target: Target,
}

impl BgpProtocol {
    /// Create a new BGP protocol instance, written to the default target.
    pub fn new(name: impl Into<String>, local_as: i64, remote_ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_as,
            remote_ip: remote_ip.into(),
            remote_as: None,
            target: Target::default(),
        }
    }

    /// Set the AS number of the neighbor.
    pub fn remote_as(&mut self, remote_as: i64) -> &mut Self {
        self.remote_as = Some(remote_as);
        self
    }

    /// Remove the AS number of the neighbor.
    pub fn no_remote_as(&mut self) -> &mut Self {
        self.remote_as = None;
        self
    }

    /// Set the output target.
    pub fn write_to(&mut self, target: Target) -> &mut Self {
        self.target = target;
        self
    }

    /// Parse the neighbor address. An IPv6 address may carry the interface of a link-local
    /// neighbor, as in `fe80::1%eth0`.
    fn neighbor_address(&self) -> Result<String, ValidationError> {
        let invalid = || ValidationError::InvalidAddress {
            instance: self.name.clone(),
            address: self.remote_ip.clone(),
        };
        let (addr, iface) = match self.remote_ip.split_once('%') {
            Some((addr, iface)) => (addr, Some(iface)),
            None => (self.remote_ip.as_str(), None),
        };
        let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
        match iface {
            None => Ok(addr.to_string()),
            Some(iface) if addr.is_ipv6() && IFACE_RE.is_match(iface) => {
                Ok(format!("{addr}%{iface}"))
            }
            Some(_) => Err(invalid()),
        }
    }
}

impl Render for BgpProtocol {
    fn kind(&self) -> FragmentKind {
        FragmentKind::Bgp
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn render_content(&self) -> Result<String, ValidationError> {
        let name = InstanceName::new(self.name.as_str())?;
        let local_as = AsNumber::new(&name, self.local_as)?;
        let remote_as = self
            .remote_as
            .map(|x| AsNumber::new(&name, x))
            .transpose()?;
        if self.remote_ip.is_empty() {
            return Err(ValidationError::EmptyField {
                instance: self.name.clone(),
                field: "remote_ip",
            });
        }
        let remote_ip = self.neighbor_address()?;

        Ok(format!(
            "
protocol bgp {name} {{
    local as {local_as}
{neighbor_as}    neighbor {remote_ip}

    export none
    import all
}}
",
            neighbor_as = match remote_as {
                Some(id) => format!("    neighbor as {id}\n"),
                None => String::new(),
            },
        ))
    }
}
