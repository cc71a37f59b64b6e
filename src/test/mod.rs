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

use crate::render::{BgpProtocol, Filter, GlobalConfig, Target};

mod test_config;
mod test_output;

pub(self) const CONF_PATH: &str = "/etc/bird.conf";

pub(self) fn filter_body() -> &'static str {
    include_str!("golden/filter_body")
}

pub(self) fn rp_env_global() -> GlobalConfig {
    GlobalConfig::new("172.16.254.254")
        .environment("rp_env")
        .write_to(Target::concat(CONF_PATH))
        .clone()
}

pub(self) fn namevar_bgp() -> BgpProtocol {
    BgpProtocol::new("namevar", 65000, "10.0.0.2")
        .write_to(Target::concat(CONF_PATH))
        .clone()
}

pub(self) fn namevar_filter() -> Filter {
    Filter::new("namevar", filter_body())
        .define("am", "[= 65000 65000 =]")
        .variable("ps", "pair set")
        .variable("odds", "int set")
        .write_to(Target::concat(CONF_PATH))
        .clone()
}
