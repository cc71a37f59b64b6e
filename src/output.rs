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

//! This module persists assembled configurations. The main trait is [`OutputWriter`]. It compares
//! the hash of the new content with the hash of what is currently persisted, and only writes if
//! they differ. The resulting [`Change`] is the signal for the orchestration layer to reload the
//! daemon; this crate never decides to do so on its own.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::assemble::{AssembledConfig, ContentHash};

/// Error thrown while reading or writing a target file.
#[derive(Debug, Error)]
#[error("Cannot persist {}: {source}", .path.display())]
pub struct PersistenceError {
    /// The file that could not be read or written
    pub path: PathBuf,
    /// The underlying error
    #[source]
    pub source: io::Error,
}

impl PersistenceError {
    /// Create a new persistence error for the given path.
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Outcome of writing a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    /// The file did not exist before.
    Created,
    /// The file existed with a different content.
    Updated,
    /// The file already had the exact same content. Nothing was written.
    Unchanged,
}

impl Change {
    /// Returns `true` if the file was created or updated.
    pub fn is_changed(&self) -> bool {
        !matches!(self, Change::Unchanged)
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Change::Created => "created",
            Change::Updated => "updated",
            Change::Unchanged => "unchanged",
        })
    }
}

/// Trait for persisting assembled configurations.
pub trait OutputWriter {
    /// Get the hash of the content currently persisted at `path`, or `None` if there is none.
    fn current_hash(&self, path: &Path) -> Result<Option<ContentHash>, PersistenceError>;

    /// Persist `content` at `path`, replacing whatever is there.
    fn persist(&mut self, path: &Path, content: &str) -> Result<(), PersistenceError>;

    /// Persist the configuration if its hash differs from the currently persisted one.
    fn write(&mut self, cfg: &AssembledConfig) -> Result<Change, PersistenceError> {
        let path = cfg.target_path();
        let change = match self.current_hash(path)? {
            Some(old) if &old == cfg.hash() => Change::Unchanged,
            Some(_) => Change::Updated,
            None => Change::Created,
        };
        if change.is_changed() {
            self.persist(path, cfg.content())?;
            log::info!("{} {} ({})", change, path.display(), cfg.hash());
        } else {
            log::trace!("{} is up to date", path.display());
        }
        Ok(change)
    }
}

/// Writes configurations to the local file system. Files are replaced atomically by writing a
/// temporary file in the same directory and renaming it. Missing parent directories are created.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileWriter;

impl FileWriter {
    /// Create a new file writer.
    pub fn new() -> Self {
        Self
    }
}

/// Read the hash of a file on disk.
fn hash_on_disk(path: &Path) -> Result<Option<ContentHash>, PersistenceError> {
    match fs::read(path) {
        Ok(content) => Ok(Some(ContentHash::of(content))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistenceError::new(path, e)),
    }
}

impl OutputWriter for FileWriter {
    fn current_hash(&self, path: &Path) -> Result<Option<ContentHash>, PersistenceError> {
        hash_on_disk(path)
    }

    fn persist(&mut self, path: &Path, content: &str) -> Result<(), PersistenceError> {
        let err = |e: io::Error| PersistenceError::new(path, e);
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(err)?;
        let mut file = NamedTempFile::new_in(dir).map_err(err)?;
        file.write_all(content.as_bytes()).map_err(err)?;
        file.as_file().sync_all().map_err(err)?;
        file.persist(path).map_err(|e| err(e.error))?;
        Ok(())
    }
}

/// Keeps all written configurations in memory. Used for dry runs and tests.
///
/// With [`MemoryWriter::read_through`], files that were not written yet are looked up on disk,
/// such that the reported [`Change`]s match what a [`FileWriter`] would do.
#[derive(Debug, Default, Clone)]
pub struct MemoryWriter {
    files: BTreeMap<PathBuf, String>,
    read_through: bool,
}

impl MemoryWriter {
    /// Create an empty writer that pretends that no file exists yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer that compares against the files on disk.
    pub fn read_through() -> Self {
        Self {
            files: BTreeMap::new(),
            read_through: true,
        }
    }

    /// Get the content written to `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(|s| s.as_str())
    }

    /// Iterate over all written files.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }
}

impl OutputWriter for MemoryWriter {
    fn current_hash(&self, path: &Path) -> Result<Option<ContentHash>, PersistenceError> {
        match self.files.get(path) {
            Some(content) => Ok(Some(ContentHash::of(content))),
            None if self.read_through => hash_on_disk(path),
            None => Ok(None),
        }
    }

    fn persist(&mut self, path: &Path, content: &str) -> Result<(), PersistenceError> {
        self.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

/// Outcome of writing a single file, as part of a [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// The target file
    pub path: PathBuf,
    /// Hash of the new content
    pub hash: ContentHash,
    /// What happened to the file
    pub change: Change,
    /// Identifiers of the fragments contained in the file
    pub fragments: Vec<String>,
}

/// Outcome of writing all target files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// One entry per target file, ordered by path
    pub files: Vec<FileReport>,
}

impl Report {
    /// Returns `true` if any file was created or updated, i.e., the daemon must reload its
    /// configuration.
    pub fn needs_reload(&self) -> bool {
        self.files.iter().any(|f| f.change.is_changed())
    }

    /// Iterate over all files that were created or updated.
    pub fn changed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.change.is_changed())
    }
}

/// Write all assembled configurations using the given writer. Stops at the first error.
pub fn apply<'a, W: OutputWriter + ?Sized>(
    writer: &mut W,
    configs: impl IntoIterator<Item = &'a AssembledConfig>,
) -> Result<Report, PersistenceError> {
    let mut files = Vec::new();
    for cfg in configs {
        files.push(FileReport {
            path: cfg.target_path().to_path_buf(),
            hash: cfg.hash().clone(),
            change: writer.write(cfg)?,
            fragments: cfg.fragment_ids().to_vec(),
        });
    }
    Ok(Report { files })
}
