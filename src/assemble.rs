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

//! This module assembles the fragments of a single target file into its final content.
//!
//! Fragments are ordered by their [`SortKey`](crate::fragment::SortKey) and concatenated without
//! any additional separator, since every fragment already starts with its own blank line. The
//! output therefore only depends on the set of fragments, and not on the order in which they were
//! declared. Two fragments with the same sort key in the same file are a conflict.

use std::{
    collections::BTreeMap,
    fmt::Display,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::fragment::Fragment;

/// SHA-256 of the assembled content, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Compute the hash of some content.
    ///
    /// ```
    /// # use bird_conf::assemble::ContentHash;
    /// assert_eq!(
    ///     ContentHash::of("").to_string(),
    ///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(Sha256::digest(content.as_ref())))
    }

    /// Get the hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final content of a single target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledConfig {
    target_path: PathBuf,
    content: String,
    hash: ContentHash,
    fragment_ids: Vec<String>,
}

impl AssembledConfig {
    /// Path of the target file.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// The assembled content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Hash of the assembled content.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Identifiers of all fragments that contributed to this file, in output order.
    pub fn fragment_ids(&self) -> &[String] {
        &self.fragment_ids
    }
}

/// Error thrown while assembling fragments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    /// Two fragments resolve to the same position in the same file.
    #[error("Conflicting declarations of {id} in {}", .target.display())]
    Conflict {
        /// The target file
        target: PathBuf,
        /// Identifier of the duplicate fragment
        id: String,
    },
}

/// Assemble all fragments addressed to `target_path`. Fragments addressed to any other file are
/// ignored.
///
/// ```
/// # use bird_conf::{assemble::assemble, fragment::{Fragment, FragmentKind}};
/// let fragments = vec![
///     Fragment::new("/etc/bird.conf", FragmentKind::Bgp, "b", "\nB\n"),
///     Fragment::new("/etc/bird.conf", FragmentKind::Bgp, "a", "\nA\n"),
///     Fragment::new("/etc/other.conf", FragmentKind::Bgp, "c", "\nC\n"),
/// ];
/// let cfg = assemble("/etc/bird.conf", &fragments).unwrap();
/// assert_eq!(cfg.content(), "\nA\n\nB\n");
/// assert_eq!(cfg.fragment_ids(), ["bird_conf_50_bgp_a", "bird_conf_50_bgp_b"]);
/// ```
pub fn assemble<'a>(
    target_path: impl AsRef<Path>,
    fragments: impl IntoIterator<Item = &'a Fragment>,
) -> Result<AssembledConfig, AssembleError> {
    let target_path = target_path.as_ref();
    let group = fragments
        .into_iter()
        .filter(|f| f.target_path == target_path)
        .sorted_by_key(|f| f.sort_key())
        .collect_vec();

    if let Some((_, dup)) = group
        .iter()
        .tuple_windows()
        .find(|(a, b)| a.sort_key() == b.sort_key())
    {
        return Err(AssembleError::Conflict {
            target: target_path.to_path_buf(),
            id: dup.id(),
        });
    }

    let content: String = group.iter().map(|f| f.content.as_str()).collect();
    let hash = ContentHash::of(&content);
    log::debug!(
        "Assembled {} fragments into {} ({})",
        group.len(),
        target_path.display(),
        hash
    );

    Ok(AssembledConfig {
        target_path: target_path.to_path_buf(),
        content,
        hash,
        fragment_ids: group.iter().map(|f| f.id()).collect(),
    })
}

/// Group all fragments by their target file and assemble each group. The groups share nothing, so
/// they are assembled in parallel. If any group fails, the error of the first failing file (in
/// path order) is returned and nothing else.
pub fn assemble_all(
    fragments: &[Fragment],
) -> Result<BTreeMap<PathBuf, AssembledConfig>, AssembleError> {
    let groups: BTreeMap<&Path, Vec<&Fragment>> = fragments
        .iter()
        .map(|f| (f.target_path.as_path(), f))
        .into_group_map()
        .into_iter()
        .collect();

    let mut results: Vec<(PathBuf, Result<AssembledConfig, AssembleError>)> = groups
        .into_par_iter()
        .map(|(path, group)| (path.to_path_buf(), assemble(path, group)))
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));

    results
        .into_iter()
        .map(|(path, result)| result.map(|cfg| (path, cfg)))
        .collect()
}
