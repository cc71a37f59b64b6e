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

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use maplit::btreemap;
use pretty_assertions::{assert_eq, assert_str_eq};

use super::filter_body;
use crate::{
    config::{ConfigError, ConfigFile, Mode},
    output::MemoryWriter,
    types::ValidationError,
};

/// The full scenario with all three declarations, as a declaration file.
fn scenario_toml() -> String {
    format!(
        r#"
[global]
router_id = "172.16.254.254"
environment = "rp_env"

[[bgp]]
name = "namevar"
local_as = 65000
remote_ip = "10.0.0.2"

[[filter]]
name = "namevar"
body = """
{body}"""
defines = {{ am = "[= 65000 65000 =]" }}
variables = {{ ps = "pair set", odds = "int set" }}
"#,
        body = filter_body()
    )
}

#[test]
fn parse() {
    let cfg: ConfigFile = scenario_toml().parse().unwrap();
    assert_eq!(cfg.output.conf_path, Path::new("/etc/bird.conf"));
    assert_eq!(cfg.output.confd_dir, None);

    let global = cfg.global.as_ref().unwrap();
    assert_eq!(global.router_id, "172.16.254.254");
    assert_eq!(global.environment.as_deref(), Some("rp_env"));
    assert_eq!(global.managed_by, None);
    assert_eq!(global.mode, Mode::Concat);

    assert_eq!(cfg.bgp.len(), 1);
    assert_eq!(cfg.bgp[0].local_as, 65000);
    assert_eq!(cfg.bgp[0].remote_as, None);

    assert_eq!(cfg.filters.len(), 1);
    assert_str_eq!(cfg.filters[0].body, filter_body());
    assert_eq!(
        cfg.filters[0].variables.keys().collect_vec(),
        ["ps", "odds"]
    );
}

#[test_log::test]
fn build_from_file() {
    let decl = scenario_toml()
        .parse::<ConfigFile>()
        .unwrap()
        .declarations()
        .unwrap();
    let configs = decl.build().unwrap();
    assert_eq!(configs.len(), 1);
    assert_str_eq!(
        configs[Path::new("/etc/bird.conf")].content(),
        include_str!("golden/bird_conf")
    );
}

#[test]
fn keeps_table_order() {
    let cfg: ConfigFile = r#"
[[filter]]
name = "f"
body = "{ accept; }"
defines = { zulu = "1", alpha = "2", mike = "3" }
"#
    .parse()
    .unwrap();
    assert_eq!(
        cfg.filters[0].defines.keys().collect_vec(),
        ["zulu", "alpha", "mike"]
    );
    let configs = cfg.declarations().unwrap().build().unwrap();
    assert_str_eq!(
        configs[Path::new("/etc/bird.conf")].content(),
        "\nfilter f\ndefine zulu = 1;\ndefine alpha = 2;\ndefine mike = 3;\n{ accept; }\n"
    );
}

#[test]
fn confd_mode() {
    let cfg: ConfigFile = r#"
[output]
conf_path = "/srv/bird.conf"
confd_dir = "/srv/bird.d"

[global]
router_id = "10.0.0.1"

[[bgp]]
name = "uplink"
local_as = 65000
remote_ip = "10.0.0.2"
remote_as = 65001
mode = "confd"

[[bgp]]
name = "backup"
local_as = 65000
remote_ip = "10.0.0.3"
"#
    .parse()
    .unwrap();

    let mut writer = MemoryWriter::new();
    let report = cfg.declarations().unwrap().apply(&mut writer).unwrap();

    let written: Vec<&Path> = writer.files().map(|(p, _)| p).collect();
    assert_eq!(
        written,
        [
            Path::new("/srv/bird.conf"),
            Path::new("/srv/bird.d/protocol_bgp_uplink.conf")
        ]
    );
    assert_eq!(
        report
            .files
            .iter()
            .map(|f| (f.path.clone(), f.fragments.clone()))
            .collect::<std::collections::BTreeMap<_, _>>(),
        btreemap! {
            PathBuf::from("/srv/bird.conf") => vec![
                String::from("bird_conf_10_global"),
                String::from("bird_conf_50_bgp_backup"),
            ],
            PathBuf::from("/srv/bird.d/protocol_bgp_uplink.conf") => vec![
                String::from("bird_conf_50_bgp_uplink"),
            ],
        }
    );
    assert!(writer
        .get("/srv/bird.conf")
        .unwrap()
        .starts_with("\n#\n# Managed by Puppet in the rp_env environment\n#\n\nrouter id 10.0.0.1\n"));
    assert!(writer
        .get("/srv/bird.d/protocol_bgp_uplink.conf")
        .unwrap()
        .contains("    neighbor as 65001\n"));
}

#[test]
fn confd_mode_requires_directory() {
    let cfg: ConfigFile = r#"
[[bgp]]
name = "uplink"
local_as = 65000
remote_ip = "10.0.0.2"
mode = "confd"
"#
    .parse()
    .unwrap();
    match cfg.declarations() {
        Err(ConfigError::Validation(e)) => {
            assert_eq!(e, ValidationError::MissingConfdDir(String::from("uplink")))
        }
        r => panic!("Unexpected result: {r:?}"),
    }
}

#[test]
fn unknown_fields() {
    for s in [
        "[global]\nrouter_id = \"10.0.0.1\"\nrouter = \"x\"\n",
        "[[bgp]]\nname = \"a\"\nlocal_as = 1\nremote_ip = \"10.0.0.2\"\nexport = \"all\"\n",
        "[output]\npath = \"/etc/bird.conf\"\n",
        "[[protocol]]\nname = \"a\"\n",
    ] {
        assert!(matches!(
            s.parse::<ConfigFile>(),
            Err(ConfigError::Parse(_))
        ));
    }
}

#[test]
fn invalid_values() {
    assert!(matches!(
        "[[bgp]]\nname = \"a\"\nlocal_as = \"x\"\nremote_ip = \"10.0.0.2\"\n".parse::<ConfigFile>(),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        "[[bgp]]\nname = \"a\"\nlocal_as = 1\nremote_ip = \"10.0.0.2\"\nmode = \"append\"\n"
            .parse::<ConfigFile>(),
        Err(ConfigError::Parse(_))
    ));

    // out-of-range values parse, but fail when rendering.
    let cfg: ConfigFile = "[[bgp]]\nname = \"a\"\nlocal_as = 4294967296\nremote_ip = \"10.0.0.2\"\n"
        .parse()
        .unwrap();
    let decl = cfg.declarations().unwrap();
    assert!(matches!(
        decl.build(),
        Err(crate::Error::Validation {
            source: ValidationError::AsNumberOutOfRange { value: 4294967296, .. },
            ..
        })
    ));
}

#[test]
fn empty_file() {
    let cfg: ConfigFile = "".parse().unwrap();
    assert_eq!(cfg, ConfigFile::default());
    let decl = cfg.declarations().unwrap();
    assert!(decl.is_empty());
    assert!(decl.build().unwrap().is_empty());
}

#[test]
fn load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bird-conf.toml");
    fs::write(&path, scenario_toml()).unwrap();
    let cfg = ConfigFile::load(&path).unwrap();
    assert_eq!(cfg, scenario_toml().parse::<ConfigFile>().unwrap());

    match ConfigFile::load(dir.path().join("missing.toml")) {
        Err(ConfigError::Io { path: p, .. }) => assert_eq!(p, dir.path().join("missing.toml")),
        r => panic!("Unexpected result: {r:?}"),
    }
}
