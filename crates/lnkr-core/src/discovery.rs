//! Discovery: turning a user path into registry entries.
//!
//! Validation runs completely before the registry is touched, so a failed
//! `add` never leaves a partial write behind.

use crate::error::{LnkrError, Result, RootKind};
use crate::paths;
use crate::project::{LedgerUpdate, Project};
use crate::registry::{LinkEntry, LinkKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Parameters for [`add`].
#[derive(Debug, Clone)]
pub struct AddRequest {
    /// Path relative to the chosen root
    pub path: PathBuf,
    /// Expand a directory into one hard-link entry per file
    pub recursive: bool,
    pub kind: LinkKind,
    /// Resolve `path` against the remote root instead of the local one
    pub from_remote: bool,
}

impl AddRequest {
    pub fn new(path: impl Into<PathBuf>, kind: LinkKind) -> Self {
        Self {
            path: path.into(),
            recursive: false,
            kind,
            from_remote: false,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn from_remote(mut self, from_remote: bool) -> Self {
        self.from_remote = from_remote;
        self
    }
}

/// Result of [`add`].
#[derive(Debug, Clone)]
pub struct AddReport {
    /// Newly registered entries; empty means nothing to add
    pub added: Vec<LinkEntry>,
    pub ledger: Option<LedgerUpdate>,
}

impl AddReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

/// Lazy walk over the plain files beneath a directory.
///
/// Yields registry keys relative to the base root, in file name order.
/// Symlinks are not followed and directories are not yielded.
pub struct CandidateWalk {
    base_root: PathBuf,
    inner: walkdir::IntoIter,
}

impl CandidateWalk {
    pub fn new(dir: &Path, base_root: &Path) -> Self {
        Self {
            base_root: base_root.to_path_buf(),
            inner: WalkDir::new(dir)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
        }
    }
}

impl Iterator for CandidateWalk {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        return Some(paths::relative_key(&self.base_root, entry.path()));
                    }
                }
                Err(err) => return Some(Err(walk_error(err))),
            }
        }
    }
}

fn walk_error(err: walkdir::Error) -> LnkrError {
    let path = err.path().map(Path::to_path_buf);
    let message = err.to_string();
    LnkrError::Io {
        message,
        path,
        source: err.into_io_error(),
    }
}

/// Register `request.path` (or the files beneath it) in the registry.
pub fn add(project: &Project, request: &AddRequest) -> Result<AddReport> {
    // Absolute paths are rejected before the registry is even loaded.
    paths::normalize_relative(&request.path)?;

    let mut registry = project.load()?;
    let root_kind = if request.from_remote {
        RootKind::Remote
    } else {
        RootKind::Local
    };
    let base_root = registry.root(root_kind)?.to_path_buf();
    let resolved = paths::resolve(&request.path, &base_root)?;

    let metadata = fs::metadata(&resolved.absolute).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LnkrError::NotFound(resolved.absolute.clone())
        } else {
            LnkrError::io_with_path(e, &resolved.absolute)
        }
    })?;

    if request.recursive && request.kind == LinkKind::Symbolic {
        return Err(LnkrError::IncompatibleOptions);
    }
    let is_dir = metadata.is_dir();
    if is_dir && request.kind == LinkKind::Hard && !request.recursive {
        return Err(LnkrError::RecursionRequired(resolved.absolute));
    }

    let candidates = if is_dir && request.kind == LinkKind::Hard {
        let keys = CandidateWalk::new(&resolved.absolute, &base_root).collect::<Result<Vec<_>>>()?;
        if keys.is_empty() {
            return Err(LnkrError::EmptyDirectory(resolved.absolute));
        }
        debug!("Found {} file(s) under {}", keys.len(), resolved.key);
        keys
    } else {
        vec![resolved.key]
    };

    let added = registry.insert_new(
        candidates
            .into_iter()
            .map(|key| LinkEntry::new(key, request.kind)),
    );
    if added.is_empty() {
        info!("No new paths to add.");
        return Ok(AddReport {
            added,
            ledger: None,
        });
    }

    project.save(&registry)?;
    for entry in &added {
        info!("Added link: {} (type: {})", entry.path, entry.kind);
    }

    let paths: Vec<String> = added.iter().map(|e| e.path.clone()).collect();
    let ledger = LedgerUpdate::apply(&project.ledger(&registry), |ledger| ledger.ensure(&paths));

    Ok(AddReport {
        added,
        ledger: Some(ledger),
    })
}
