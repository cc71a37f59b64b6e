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

use std::fs;

use pretty_assertions::{assert_eq, assert_str_eq};

use super::{namevar_bgp, namevar_filter, rp_env_global, CONF_PATH};
use crate::{
    assemble::assemble,
    declarations::Declarations,
    output::{apply, Change, FileWriter, MemoryWriter, OutputWriter},
    render::{BgpProtocol, Render, Target},
};

fn scenario(target: &Target) -> Declarations {
    let mut decl = Declarations::new();
    decl.global(rp_env_global().write_to(target.clone()).clone())
        .filter(namevar_filter().write_to(target.clone()).clone())
        .bgp(namevar_bgp().write_to(target.clone()).clone());
    decl
}

#[test]
fn memory_writer() {
    let fragments = [namevar_bgp().render().unwrap()];
    let cfg = assemble(CONF_PATH, &fragments).unwrap();
    let mut writer = MemoryWriter::new();

    assert_eq!(writer.write(&cfg).unwrap(), Change::Created);
    assert_eq!(writer.write(&cfg).unwrap(), Change::Unchanged);
    assert_eq!(writer.get(CONF_PATH), Some(include_str!("golden/bgp")));

    let fragments = [namevar_bgp().remote_as(65000).render().unwrap()];
    let cfg = assemble(CONF_PATH, &fragments).unwrap();
    assert_eq!(writer.write(&cfg).unwrap(), Change::Updated);
    assert_eq!(
        writer.get(CONF_PATH),
        Some(include_str!("golden/bgp_remote_as"))
    );
    assert_eq!(writer.files().count(), 1);
}

#[test_log::test]
fn file_writer() {
    let dir = tempfile::tempdir().unwrap();
    let target = Target::concat(dir.path().join("bird.conf"));
    let path = dir.path().join("bird.conf");
    let mut writer = FileWriter::new();

    let report = scenario(&target).apply(&mut writer).unwrap();
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].change, Change::Created);
    assert_eq!(report.files[0].path, path);
    assert!(report.needs_reload());
    assert_str_eq!(
        fs::read_to_string(&path).unwrap(),
        include_str!("golden/bird_conf")
    );

    let report = scenario(&target).apply(&mut writer).unwrap();
    assert_eq!(report.files[0].change, Change::Unchanged);
    assert!(!report.needs_reload());
    assert_eq!(report.changed().count(), 0);

    let mut decl = scenario(&target);
    decl.bgp(
        BgpProtocol::new("peer", 65000, "10.0.0.3")
            .write_to(target.clone())
            .clone(),
    );
    let report = decl.apply(&mut writer).unwrap();
    assert_eq!(report.files[0].change, Change::Updated);
    assert!(report.needs_reload());
    assert_eq!(
        report.files[0].fragments,
        [
            "bird_conf_10_global",
            "bird_conf_20_filter_namevar",
            "bird_conf_50_bgp_namevar",
            "bird_conf_50_bgp_peer"
        ]
    );
    assert!(fs::read_to_string(&path)
        .unwrap()
        .ends_with("\nprotocol bgp peer {\n    local as 65000\n    neighbor 10.0.0.3\n\n    export none\n    import all\n}\n"));
}

#[test]
fn file_writer_detects_manual_edits() {
    let dir = tempfile::tempdir().unwrap();
    let target = Target::concat(dir.path().join("bird.conf"));
    let path = dir.path().join("bird.conf");
    let mut writer = FileWriter::new();

    scenario(&target).apply(&mut writer).unwrap();
    fs::write(&path, "router id 10.0.0.1\n").unwrap();

    let report = scenario(&target).apply(&mut writer).unwrap();
    assert_eq!(report.files[0].change, Change::Updated);
    assert_str_eq!(
        fs::read_to_string(&path).unwrap(),
        include_str!("golden/bird_conf")
    );
}

#[test]
fn file_writer_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let confd = dir.path().join("bird.d");
    let target = Target::ConfD(confd.clone());
    let mut writer = FileWriter::new();

    let report = scenario(&target).apply(&mut writer).unwrap();
    assert_eq!(report.files.len(), 3);
    assert!(report.files.iter().all(|f| f.change == Change::Created));

    assert_str_eq!(
        fs::read_to_string(confd.join("protocol_bgp_namevar.conf")).unwrap(),
        include_str!("golden/bgp")
    );
    assert_str_eq!(
        fs::read_to_string(confd.join("filter_namevar.conf")).unwrap(),
        include_str!("golden/filter")
    );
    assert_str_eq!(
        fs::read_to_string(confd.join("global.conf")).unwrap(),
        include_str!("golden/global")
    );
    // no temporary files are left behind.
    assert_eq!(fs::read_dir(&confd).unwrap().count(), 3);
}

#[test]
fn dry_run_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let target = Target::concat(dir.path().join("bird.conf"));
    let path = dir.path().join("bird.conf");

    let report = scenario(&target)
        .apply(&mut MemoryWriter::read_through())
        .unwrap();
    assert_eq!(report.files[0].change, Change::Created);
    assert!(!path.exists());

    scenario(&target).apply(&mut FileWriter::new()).unwrap();
    let report = scenario(&target)
        .apply(&mut MemoryWriter::read_through())
        .unwrap();
    assert_eq!(report.files[0].change, Change::Unchanged);

    // without reading through, nothing exists yet.
    let report = scenario(&target).apply(&mut MemoryWriter::new()).unwrap();
    assert_eq!(report.files[0].change, Change::Created);
}

#[test]
fn invalid_declaration_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let target = Target::ConfD(dir.path().join("bird.d"));
    let mut decl = scenario(&target);
    decl.bgp(
        BgpProtocol::new("zzz", 0, "10.0.0.3")
            .write_to(target.clone())
            .clone(),
    );

    let mut writer = MemoryWriter::new();
    assert!(decl.apply(&mut writer).is_err());
    assert_eq!(writer.files().count(), 0);

    assert!(decl.apply(&mut FileWriter::new()).is_err());
    assert!(!dir.path().join("bird.d").exists());
}

#[test]
fn apply_reports_every_file() {
    let fragments = [namevar_bgp().render().unwrap()];
    let cfg = assemble(CONF_PATH, &fragments).unwrap();
    let mut writer = MemoryWriter::new();

    let report = apply(&mut writer, [&cfg]).unwrap();
    assert_eq!(report.files.len(), 1);
    assert_eq!(&report.files[0].hash, cfg.hash());
    assert_eq!(report.files[0].fragments, ["bird_conf_50_bgp_namevar"]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["files"][0]["change"], "created");
    assert_eq!(json["files"][0]["path"], CONF_PATH);
    assert_eq!(json["files"][0]["hash"], cfg.hash().as_str());
}

#[test]
fn change_display() {
    assert_eq!(Change::Created.to_string(), "created");
    assert_eq!(Change::Updated.to_string(), "updated");
    assert_eq!(Change::Unchanged.to_string(), "unchanged");
    assert!(Change::Created.is_changed());
    assert!(Change::Updated.is_changed());
    assert!(!Change::Unchanged.is_changed());
}
