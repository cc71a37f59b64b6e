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

//! This module defines the [`Fragment`], the unit of text that is produced by rendering a single
//! declaration, and the key that decides where in the final file a fragment ends up.
//!
//! Fragments are ordered by their [`SortKey`], which consists of the priority class of the
//! [`FragmentKind`] and the instance name. The classes leave gaps such that new protocol kinds can
//! be slotted in between without renumbering the existing ones:
//!
//! | kind     | class |
//! |----------|-------|
//! | `global` | 10    |
//! | `filter` | 20    |
//! | `bgp`    | 50    |

use std::{fmt::Display, path::PathBuf};

/// Prefix of every fragment identifier.
const ID_PREFIX: &str = "bird_conf";

/// The kind of a fragment. Each kind owns a fixed priority class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FragmentKind {
    /// The singleton header with the router id.
    Global,
    /// A named filter.
    Filter,
    /// A BGP protocol instance.
    Bgp,
}

impl FragmentKind {
    /// Priority class of the kind. Lower classes are written first.
    pub fn priority_class(&self) -> u32 {
        match self {
            FragmentKind::Global => 10,
            FragmentKind::Filter => 20,
            FragmentKind::Bgp => 50,
        }
    }

    /// The name of the kind as used in fragment identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Global => "global",
            FragmentKind::Filter => "filter",
            FragmentKind::Bgp => "bgp",
        }
    }

    /// Whether there is at most one instance of this kind per file, in which case the name is
    /// omitted from the identifier.
    pub fn is_singleton(&self) -> bool {
        matches!(self, FragmentKind::Global)
    }
}

impl Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key by which fragments of the same target file are ordered. Fragments are compared by priority
/// class first and by name second.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    /// Priority class of the fragment kind
    pub priority_class: u32,
    /// Instance name (empty for singletons)
    pub name: String,
}

/// Compute the sort key of a fragment of the given kind and name.
///
/// ```
/// # use bird_conf::fragment::{key, FragmentKind};
/// assert!(key(FragmentKind::Global, "") < key(FragmentKind::Filter, "a"));
/// assert!(key(FragmentKind::Filter, "z") < key(FragmentKind::Bgp, "a"));
/// assert!(key(FragmentKind::Bgp, "a") < key(FragmentKind::Bgp, "b"));
/// ```
pub fn key(kind: FragmentKind, name: impl Into<String>) -> SortKey {
    SortKey {
        priority_class: kind.priority_class(),
        name: name.into(),
    }
}

/// Compute the externally visible identifier of a fragment. Singleton kinds omit the name.
///
/// ```
/// # use bird_conf::fragment::{fragment_id, FragmentKind};
/// assert_eq!(fragment_id(FragmentKind::Global, ""), "bird_conf_10_global");
/// assert_eq!(fragment_id(FragmentKind::Filter, "namevar"), "bird_conf_20_filter_namevar");
/// assert_eq!(fragment_id(FragmentKind::Bgp, "namevar"), "bird_conf_50_bgp_namevar");
/// ```
pub fn fragment_id(kind: FragmentKind, name: &str) -> String {
    if kind.is_singleton() || name.is_empty() {
        format!("{ID_PREFIX}_{}_{}", kind.priority_class(), kind)
    } else {
        format!("{ID_PREFIX}_{}_{}_{}", kind.priority_class(), kind, name)
    }
}

/// A rendered piece of configuration, addressed to a single target file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    /// File into which the fragment is assembled.
    pub target_path: PathBuf,
    /// Kind of the fragment, determining the priority class.
    pub kind: FragmentKind,
    /// Name of the instance (empty for singletons).
    pub name: String,
    /// The rendered text. It already carries its leading blank line.
    pub content: String,
}

impl Fragment {
    /// Create a new fragment.
    pub fn new(
        target_path: impl Into<PathBuf>,
        kind: FragmentKind,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            kind,
            name: name.into(),
            content: content.into(),
        }
    }

    /// Priority class of the fragment.
    pub fn priority_class(&self) -> u32 {
        self.kind.priority_class()
    }

    /// Key used for ordering the fragment within its target file.
    pub fn sort_key(&self) -> SortKey {
        key(self.kind, self.name.as_str())
    }

    /// Identifier of the fragment, e.g., `bird_conf_50_bgp_namevar`.
    pub fn id(&self) -> String {
        fragment_id(self.kind, &self.name)
    }
}
