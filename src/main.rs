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

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use bird_conf::{
    config::ConfigFile,
    output::{FileWriter, MemoryWriter, OutputWriter, Report},
    Error,
};

/// Exit status if `--check` finds a file that would change.
const EXIT_WOULD_CHANGE: u8 = 2;

/// Generate the configuration of the BIRD routing daemon from a declaration file.
#[derive(Debug, Parser)]
#[clap(name = "bird-conf", version)]
struct Cli {
    /// The declaration file (TOML).
    #[clap(long = "config", short = 'c')]
    config: PathBuf,
    /// Do not write anything, only report what would change.
    #[clap(long = "dry-run", short = 'n')]
    dry_run: bool,
    /// Print the assembled files to stdout instead of writing them.
    #[clap(long, conflicts_with_all = ["dry_run", "json", "check"])]
    print: bool,
    /// Print the report as JSON.
    #[clap(long)]
    json: bool,
    /// Do not write anything, and exit with status 2 if any file would change.
    #[clap(long)]
    check: bool,
}

fn main() -> ExitCode {
    pretty_env_logger::init_timed();

    let args = Cli::parse();

    match run(&args) {
        Ok(report) if args.check && report.needs_reload() => ExitCode::from(EXIT_WOULD_CHANGE),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<Report, Box<dyn std::error::Error>> {
    let decl = ConfigFile::load(&args.config)
        .and_then(|cfg| cfg.declarations())
        .map_err(Error::from)?;

    if decl.is_empty() {
        log::warn!("{} does not declare anything", args.config.display());
    }

    if args.print {
        for (path, cfg) in decl.build()? {
            println!("# {} ({})", path.display(), cfg.hash());
            print!("{}", cfg.content());
        }
        return Ok(Report::default());
    }

    let mut writer: Box<dyn OutputWriter> = if args.dry_run || args.check {
        Box::new(MemoryWriter::read_through())
    } else {
        Box::new(FileWriter::new())
    };
    let report = decl.apply(writer.as_mut())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for file in &report.files {
            println!("{} {} {}", file.change, file.path.display(), file.hash);
        }
    }

    if report.needs_reload() {
        log::info!("Configuration changed, the daemon must be reloaded.");
    }

    Ok(report)
}
