//! Materializer: creating and removing the filesystem links for each entry.
//!
//! Every entry is processed on its own. A failing entry is recorded in the
//! report and the batch carries on.

use crate::error::{LnkrError, Result, RootKind};
use crate::platform;
use crate::project::Project;
use crate::registry::{LinkEntry, LinkKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which root links are created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkDirection {
    /// Source is the local root, links land in the remote root
    #[default]
    LocalToRemote,
    /// Source is the remote root, links land in the local root
    RemoteToLocal,
}

impl LinkDirection {
    pub fn from_remote(from_remote: bool) -> Self {
        if from_remote {
            LinkDirection::RemoteToLocal
        } else {
            LinkDirection::LocalToRemote
        }
    }

    fn roots(self) -> (RootKind, RootKind) {
        match self {
            LinkDirection::LocalToRemote => (RootKind::Local, RootKind::Remote),
            LinkDirection::RemoteToLocal => (RootKind::Remote, RootKind::Local),
        }
    }
}

/// What happened to a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Created,
    Removed,
    Skipped(String),
    Failed(String),
}

/// Outcome for one entry, with the path that was acted on.
#[derive(Debug, Clone)]
pub struct EntryResult {
    pub entry: LinkEntry,
    pub path: PathBuf,
    pub outcome: EntryOutcome,
}

/// Result of [`link`] or [`unlink`], in registry order.
#[derive(Debug, Clone, Default)]
pub struct LinkReport {
    pub results: Vec<EntryResult>,
}

impl LinkReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Created))
    }

    pub fn removed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Removed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    fn push(&mut self, entry: &LinkEntry, path: PathBuf, outcome: EntryOutcome) {
        self.results.push(EntryResult {
            entry: entry.clone(),
            path,
            outcome,
        });
    }
}

/// Create the link for every registered entry.
pub fn link(project: &Project, direction: LinkDirection) -> Result<LinkReport> {
    let registry = project.load()?;
    let mut report = LinkReport::default();
    if registry.entries.is_empty() {
        return Ok(report);
    }

    let (source_kind, target_kind) = direction.roots();
    let source_root = registry.root(source_kind)?;
    let target_root = registry.root(target_kind)?;
    debug!(
        "Linking {} entries from {} to {}",
        registry.entries.len(),
        source_root.display(),
        target_root.display()
    );

    for entry in &registry.entries {
        let source = source_root.join(&entry.path);
        let target = target_root.join(&entry.path);

        let outcome = match link_entry(entry, &source, &target) {
            Ok(()) => {
                info!(
                    "Created {} link: {} -> {}",
                    entry.kind,
                    target.display(),
                    source.display()
                );
                EntryOutcome::Created
            }
            Err(e @ LnkrError::AlreadyExists(_)) => {
                info!("Skipping {}: {}", entry.path, e);
                EntryOutcome::Skipped(e.to_string())
            }
            Err(e) => {
                warn!("Error creating link for {}: {}", entry.path, e);
                EntryOutcome::Failed(e.to_string())
            }
        };
        report.push(entry, target, outcome);
    }

    info!("Link creation completed.");
    Ok(report)
}

fn link_entry(entry: &LinkEntry, source: &Path, target: &Path) -> Result<()> {
    let source_meta = fs::metadata(source).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LnkrError::NotFound(source.to_path_buf())
        } else {
            LnkrError::io_with_path(e, source)
        }
    })?;

    if platform::path_exists_no_follow(target) {
        return Err(LnkrError::AlreadyExists(target.to_path_buf()));
    }

    if entry.kind == LinkKind::Hard && source_meta.is_dir() {
        return Err(LnkrError::UnsupportedOperation {
            path: source.to_path_buf(),
            message: "Hard links cannot be created for directories".to_string(),
        });
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LnkrError::io_context(
                e,
                format!("Failed to create directory {}", parent.display()),
                parent,
            )
        })?;
    }

    match entry.kind {
        LinkKind::Hard => fs::hard_link(source, target).map_err(|e| {
            LnkrError::io_context(
                e,
                format!("Failed to create hard link {}", target.display()),
                target,
            )
        }),
        LinkKind::Symbolic => platform::create_symlink(source, target),
    }
}

/// Remove the link for every registered entry from the local root.
pub fn unlink(project: &Project) -> Result<LinkReport> {
    let registry = project.load()?;
    let mut report = LinkReport::default();
    if registry.entries.is_empty() {
        return Ok(report);
    }

    let local_root = registry.root(RootKind::Local)?;
    for entry in &registry.entries {
        let path = local_root.join(&entry.path);

        let outcome = match unlink_entry(entry, &path) {
            Ok(true) => {
                info!("Removed {} link: {}", entry.kind, path.display());
                EntryOutcome::Removed
            }
            Ok(false) => {
                info!("Link not found, skipping: {}", path.display());
                EntryOutcome::Skipped(format!("Path does not exist: {}", path.display()))
            }
            Err(e) => {
                warn!("Error removing link for {}: {}", entry.path, e);
                EntryOutcome::Failed(e.to_string())
            }
        };
        report.push(entry, path, outcome);
    }

    info!("Link removal completed.");
    Ok(report)
}

/// Returns `false` when there was nothing to remove.
fn unlink_entry(entry: &LinkEntry, path: &Path) -> Result<bool> {
    let meta = match path.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(LnkrError::io_with_path(e, path)),
    };

    let removed = match entry.kind {
        LinkKind::Hard if meta.is_dir() => fs::remove_dir_all(path),
        LinkKind::Hard => fs::remove_file(path),
        LinkKind::Symbolic => {
            if !meta.file_type().is_symlink() {
                return Err(LnkrError::UnsupportedOperation {
                    path: path.to_path_buf(),
                    message: "Not a symbolic link, refusing to remove".to_string(),
                });
            }
            platform::remove_symlink(path)?;
            return Ok(true);
        }
    };
    removed.map_err(|e| {
        LnkrError::io_context(e, format!("Failed to remove {}", path.display()), path)
    })?;

    Ok(true)
}
