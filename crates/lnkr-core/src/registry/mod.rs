//! The link registry: configured roots plus the ordered set of link entries.
//!
//! This module provides:
//! - The strongly typed registry document ([`Registry`], [`LinkEntry`], [`LinkKind`])
//! - Atomic TOML persistence through [`RegistryStore`]

mod store;

pub use store::RegistryStore;

use crate::error::{LnkrError, Result, RootKind};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How an entry is materialized between the two roots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Hard link (files only, same filesystem)
    #[default]
    Hard,
    /// Symbolic link (files or directories)
    Symbolic,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Hard => "hard",
            LinkKind::Symbolic => "symbolic",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = LnkrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hard" => Ok(LinkKind::Hard),
            "symbolic" => Ok(LinkKind::Symbolic),
            other => Err(LnkrError::InvalidKind(other.to_string())),
        }
    }
}

/// A single registered path and its link kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Path relative to the applicable root, `/`-separated
    pub path: String,
    /// Link kind, stored under `type`
    #[serde(rename = "type")]
    pub kind: LinkKind,
}

impl LinkEntry {
    pub fn new(path: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Whether this entry is `key` itself or lies beneath it.
    pub fn is_at_or_under(&self, key: &str) -> bool {
        self.path == key
            || self
                .path
                .strip_prefix(key)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// The registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Absolute path of the local (source) root
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_path_as_none"
    )]
    pub local: Option<PathBuf>,
    /// Absolute path of the remote (destination) root
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_path_as_none"
    )]
    pub remote: Option<PathBuf>,
    /// Override for the exclude ledger location
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_path_as_none"
    )]
    pub git_exclude_path: Option<PathBuf>,
    /// Registered links, kept sorted by path on save
    #[serde(default, rename = "links")]
    pub entries: Vec<LinkEntry>,
}

impl Registry {
    /// Get a configured root, or fail naming the missing one.
    pub fn root(&self, root: RootKind) -> Result<&Path> {
        let path = match root {
            RootKind::Local => self.local.as_deref(),
            RootKind::Remote => self.remote.as_deref(),
        };
        path.ok_or(LnkrError::UnconfiguredRoot { root })
    }

    /// Check if a path is already registered.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    /// Insert entries whose path is not yet registered.
    ///
    /// Returns the entries actually inserted, in the order given. Entries
    /// are re-sorted afterwards.
    pub fn insert_new(&mut self, entries: impl IntoIterator<Item = LinkEntry>) -> Vec<LinkEntry> {
        let mut inserted = Vec::new();
        for entry in entries {
            if self.contains(&entry.path) || inserted.iter().any(|e: &LinkEntry| e.path == entry.path)
            {
                continue;
            }
            inserted.push(entry);
        }
        self.entries.extend(inserted.iter().cloned());
        self.sort_entries();
        inserted
    }

    /// Remove the entry at `key` and every entry beneath it.
    pub fn remove_at_or_under(&mut self, key: &str) -> Vec<LinkEntry> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.is_at_or_under(key));
        self.entries = kept;
        removed
    }

    /// Sort entries ascending by path (byte-wise).
    pub fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Whether entries are in persisted order.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].path <= w[1].path)
    }
}

fn empty_path_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(PathBuf::from))
}
