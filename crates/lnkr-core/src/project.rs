//! Project configuration and lifecycle operations.
//!
//! A [`Project`] is the explicit configuration object every operation takes:
//! the working directory, the registry document path and the default ledger
//! path. The configured roots themselves live in the registry document.

use crate::config::ProjectConfig;
use crate::error::{LnkrError, Result};
use crate::ledger::ExcludeLedger;
use crate::paths;
use crate::registry::{LinkEntry, Registry, RegistryStore};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Paths a single invocation works with.
#[derive(Debug, Clone)]
pub struct Project {
    work_dir: PathBuf,
    store: RegistryStore,
    default_ledger_path: PathBuf,
}

impl Project {
    /// Create a project rooted at `work_dir` with the standard file names.
    ///
    /// A relative `work_dir` is resolved against the process working
    /// directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let work_dir = match std::path::absolute(&work_dir) {
            Ok(absolute) => paths::normalize_absolute(&absolute),
            Err(e) => {
                warn!("Cannot resolve {}: {}", work_dir.display(), e);
                work_dir
            }
        };
        let store = RegistryStore::new(work_dir.join(ProjectConfig::REGISTRY_FILE_NAME));
        let default_ledger_path = work_dir.join(ProjectConfig::DEFAULT_GIT_EXCLUDE_PATH);
        Self {
            work_dir,
            store,
            default_ledger_path,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn registry_path(&self) -> &Path {
        self.store.path()
    }

    /// Load the registry document (empty if absent).
    pub fn load(&self) -> Result<Registry> {
        self.store.load()
    }

    /// Persist the registry document.
    pub fn save(&self, registry: &Registry) -> Result<()> {
        self.store.save(registry)
    }

    /// Ledger file for this project, honoring the registry's override.
    pub fn ledger_path(&self, registry: &Registry) -> PathBuf {
        match &registry.git_exclude_path {
            Some(path) => paths::absolutize(path, &self.work_dir),
            None => self.default_ledger_path.clone(),
        }
    }

    pub fn ledger(&self, registry: &Registry) -> ExcludeLedger {
        ExcludeLedger::new(self.ledger_path(registry))
    }
}

/// Outcome of a ledger update. Ledger failures never fail the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerUpdate {
    Changed { path: PathBuf },
    Unchanged { path: PathBuf },
    Failed { path: PathBuf, message: String },
}

impl LedgerUpdate {
    pub(crate) fn apply(
        ledger: &ExcludeLedger,
        op: impl FnOnce(&ExcludeLedger) -> Result<bool>,
    ) -> Self {
        let path = ledger.path().to_path_buf();
        match op(ledger) {
            Ok(true) => LedgerUpdate::Changed { path },
            Ok(false) => LedgerUpdate::Unchanged { path },
            Err(e) => {
                warn!("Failed to update {}: {}", path.display(), e);
                LedgerUpdate::Failed {
                    path,
                    message: e.to_string(),
                }
            }
        }
    }
}

// ========================================
// init
// ========================================

/// Options for [`init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Remote root; relative values are resolved against the working
    /// directory. `None` keeps the configured remote.
    pub remote: Option<PathBuf>,
    /// Create the remote directory if it does not exist
    pub create_remote: bool,
    /// Override for the exclude ledger location
    pub git_exclude_path: Option<PathBuf>,
}

/// Result of [`init`].
#[derive(Debug, Clone)]
pub struct InitReport {
    /// `true` if the registry document was newly written
    pub created: bool,
    pub local: PathBuf,
    pub remote: Option<PathBuf>,
    /// `true` if the remote directory was created
    pub remote_created: bool,
    pub ledger: LedgerUpdate,
}

/// Initialize (or re-initialize) the project's registry document.
///
/// The local root is always the working directory. Existing entries are
/// kept when the document already exists.
pub fn init(project: &Project, options: &InitOptions) -> Result<InitReport> {
    let local = paths::normalize_absolute(project.work_dir());
    let mut remote_created = false;

    let remote = match &options.remote {
        Some(remote) => {
            let remote = paths::absolutize(remote, project.work_dir());
            match fs::metadata(&remote) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => return Err(LnkrError::NotADirectory(remote)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    if !options.create_remote {
                        return Err(LnkrError::NotFound(remote));
                    }
                    fs::create_dir_all(&remote).map_err(|e| {
                        LnkrError::io_context(e, "Failed to create remote directory", &remote)
                    })?;
                    info!("Created remote directory {}", remote.display());
                    remote_created = true;
                }
                Err(e) => return Err(LnkrError::io_with_path(e, &remote)),
            }
            Some(remote)
        }
        None => None,
    };

    let created = !project.store.exists();
    let mut registry = project.load()?;
    registry.local = Some(local.clone());
    if remote.is_some() {
        registry.remote = remote;
    }
    if let Some(exclude) = &options.git_exclude_path {
        registry.git_exclude_path = Some(exclude.clone());
    }
    project.save(&registry)?;

    if created {
        info!("Created {}", project.registry_path().display());
    } else {
        info!("Updated local and remote in {}", project.registry_path().display());
    }

    let ledger = LedgerUpdate::apply(&project.ledger(&registry), |ledger| {
        ledger.ensure(&[ProjectConfig::REGISTRY_FILE_NAME.to_string()])
    });

    Ok(InitReport {
        created,
        local,
        remote: registry.remote.clone(),
        remote_created,
        ledger,
    })
}

/// Default remote root for a working directory.
///
/// Joins `base` with the last `depth` components of `work_dir`. With a
/// depth of 2, `/home/alice/src/app` under `/backup` becomes
/// `/backup/src/app`.
pub fn default_remote_path(work_dir: &Path, base: &Path, depth: usize) -> PathBuf {
    let components: Vec<_> = work_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    let start = components.len().saturating_sub(depth);
    let mut remote = base.to_path_buf();
    for part in &components[start..] {
        remote.push(part);
    }
    remote
}

// ========================================
// remove
// ========================================

/// Result of [`remove`].
#[derive(Debug, Clone)]
pub struct RemoveReport {
    pub removed: Vec<LinkEntry>,
    pub ledger: Option<LedgerUpdate>,
}

/// Drop the entry at `path` and every entry beneath it from the registry.
///
/// Filesystem links are left in place; `unlink` removes those.
pub fn remove(project: &Project, path: &Path) -> Result<RemoveReport> {
    let key = paths::normalize_key(path)?;

    let mut registry = project.load()?;
    let removed = registry.remove_at_or_under(&key);
    if removed.is_empty() {
        debug!("No registered links match {}", key);
        return Ok(RemoveReport {
            removed,
            ledger: None,
        });
    }

    project.save(&registry)?;
    for entry in &removed {
        info!("Removed link: {} (type: {})", entry.path, entry.kind);
    }

    let paths: Vec<String> = removed.iter().map(|e| e.path.clone()).collect();
    let ledger = LedgerUpdate::apply(&project.ledger(&registry), |ledger| ledger.remove(&paths));

    Ok(RemoveReport {
        removed,
        ledger: Some(ledger),
    })
}

// ========================================
// clean
// ========================================

/// Result of [`clean`].
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub registry_path: PathBuf,
    /// `true` if the registry document existed and was deleted
    pub registry_removed: bool,
    pub ledger: LedgerUpdate,
}

/// Delete the registry document and the lnkr block of the ledger.
pub fn clean(project: &Project) -> Result<CleanReport> {
    // Load first: the ledger location may be overridden in the document.
    let registry = project.load()?;
    let ledger = project.ledger(&registry);

    let registry_removed = project.store.remove()?;
    if registry_removed {
        info!("Removed {}", project.registry_path().display());
    } else {
        debug!("{} does not exist", project.registry_path().display());
    }

    let ledger = LedgerUpdate::apply(&ledger, ExcludeLedger::clear);

    Ok(CleanReport {
        registry_path: project.registry_path().to_path_buf(),
        registry_removed,
        ledger,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::LinkKind;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Project) {
        let temp_dir = TempDir::new().unwrap();
        let work = temp_dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let project = Project::new(&work);
        (temp_dir, project)
    }

    #[test]
    fn test_init_creates_document_and_ledger() {
        let (temp, project) = setup();
        let remote = temp.path().join("remote");

        let report = init(
            &project,
            &InitOptions {
                remote: Some(remote.clone()),
                create_remote: true,
                git_exclude_path: None,
            },
        )
        .unwrap();

        assert!(report.created);
        assert!(report.remote_created);
        assert!(remote.is_dir());

        let registry = project.load().unwrap();
        assert_eq!(registry.local.as_deref(), Some(project.work_dir()));
        assert_eq!(registry.remote, Some(remote));

        let ledger = project.ledger(&registry);
        assert_eq!(ledger.entries().unwrap(), vec!["/.lnkr.toml".to_string()]);
        assert!(matches!(report.ledger, LedgerUpdate::Changed { .. }));
    }

    #[test]
    fn test_relative_work_dir_stored_absolute() {
        let temp = TempDir::new_in(".").unwrap();
        assert!(temp.path().is_relative());
        let project = Project::new(temp.path());
        assert!(project.work_dir().is_absolute());

        init(&project, &InitOptions::default()).unwrap();
        let registry = project.load().unwrap();
        let expected =
            paths::normalize_absolute(&std::env::current_dir().unwrap().join(temp.path()));
        assert_eq!(registry.local, Some(expected));
    }

    #[test]
    fn test_init_missing_remote_without_create_fails() {
        let (temp, project) = setup();
        let err = init(
            &project,
            &InitOptions {
                remote: Some(temp.path().join("missing")),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, LnkrError::NotFound(_)));
        assert!(!project.registry_path().exists());
    }

    #[test]
    fn test_init_remote_is_file_fails() {
        let (temp, project) = setup();
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();
        let err = init(
            &project,
            &InitOptions {
                remote: Some(file),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, LnkrError::NotADirectory(_)));
    }

    #[test]
    fn test_init_relative_remote_and_update_keeps_entries() {
        let (temp, project) = setup();
        fs::create_dir_all(temp.path().join("remote")).unwrap();

        init(
            &project,
            &InitOptions {
                remote: Some(PathBuf::from("../remote")),
                ..Default::default()
            },
        )
        .unwrap();

        let mut registry = project.load().unwrap();
        assert_eq!(
            registry.remote,
            Some(paths::normalize_absolute(&temp.path().join("remote")))
        );
        registry.insert_new([LinkEntry::new("a.txt", LinkKind::Hard)]);
        project.save(&registry).unwrap();

        let report = init(&project, &InitOptions::default()).unwrap();
        assert!(!report.created);
        let registry = project.load().unwrap();
        assert_eq!(report.remote, registry.remote);
        assert!(registry.remote.is_some());
        assert_eq!(registry.entries.len(), 1);
    }

    #[test]
    fn test_init_custom_exclude_path() {
        let (_temp, project) = setup();
        init(
            &project,
            &InitOptions {
                git_exclude_path: Some(PathBuf::from("ignore/list")),
                ..Default::default()
            },
        )
        .unwrap();

        let expected = project.work_dir().join("ignore/list");
        assert!(expected.exists());
        let registry = project.load().unwrap();
        assert_eq!(project.ledger_path(&registry), expected);
    }

    #[test]
    fn test_init_ledger_failure_is_reported() {
        let (temp, project) = setup();
        fs::create_dir_all(temp.path().join("remote")).unwrap();
        fs::write(project.work_dir().join("blocker"), "not a directory").unwrap();

        let report = init(
            &project,
            &InitOptions {
                remote: Some(temp.path().join("remote")),
                git_exclude_path: Some(PathBuf::from("blocker/exclude")),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(matches!(report.ledger, LedgerUpdate::Failed { .. }));
        assert!(project.registry_path().exists());
        let registry = project.load().unwrap();
        assert_eq!(registry.git_exclude_path, Some(PathBuf::from("blocker/exclude")));
        assert!(registry.remote.is_some());
    }

    #[test]
    fn test_default_remote_path() {
        let work = Path::new("/home/alice/src/app");
        assert_eq!(
            default_remote_path(work, Path::new("/backup"), 2),
            PathBuf::from("/backup/src/app")
        );
        assert_eq!(
            default_remote_path(work, Path::new("/backup"), 1),
            PathBuf::from("/backup/app")
        );
        assert_eq!(
            default_remote_path(work, Path::new("/"), 10),
            PathBuf::from("/home/alice/src/app")
        );
        assert_eq!(
            default_remote_path(work, Path::new("/backup"), 0),
            PathBuf::from("/backup")
        );
    }

    #[test]
    fn test_remove_prefix_semantics() {
        let (_temp, project) = setup();
        let mut registry = Registry::default();
        registry.insert_new([
            LinkEntry::new("dir/a.txt", LinkKind::Hard),
            LinkEntry::new("dir/sub/b.txt", LinkKind::Hard),
            LinkEntry::new("dir2/c.txt", LinkKind::Hard),
        ]);
        project.save(&registry).unwrap();
        project
            .ledger(&registry)
            .ensure(&["dir/a.txt".to_string(), "dir2/c.txt".to_string()])
            .unwrap();

        let report = remove(&project, Path::new("./dir/")).unwrap();
        assert_eq!(report.removed.len(), 2);

        let registry = project.load().unwrap();
        assert_eq!(registry.entries, vec![LinkEntry::new("dir2/c.txt", LinkKind::Hard)]);
        assert_eq!(
            project.ledger(&registry).entries().unwrap(),
            vec!["/dir2/c.txt".to_string()]
        );
    }

    #[test]
    fn test_remove_no_match_is_noop() {
        let (_temp, project) = setup();
        let report = remove(&project, Path::new("nothing")).unwrap();
        assert!(report.removed.is_empty());
        assert!(report.ledger.is_none());
        assert!(!project.registry_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_rejects_absolute() {
        let (_temp, project) = setup();
        let err = remove(&project, Path::new("/etc/passwd")).unwrap_err();
        assert!(matches!(err, LnkrError::InvalidPath { .. }));
    }

    #[test]
    fn test_clean_removes_document_and_block() {
        let (_temp, project) = setup();
        init(&project, &InitOptions::default()).unwrap();
        let ledger_path = project.ledger_path(&Registry::default());
        fs::write(
            &ledger_path,
            format!("*.log\n{}", fs::read_to_string(&ledger_path).unwrap()),
        )
        .unwrap();

        let report = clean(&project).unwrap();
        assert!(report.registry_removed);
        assert!(matches!(report.ledger, LedgerUpdate::Changed { .. }));
        assert!(!project.registry_path().exists());
        assert_eq!(fs::read_to_string(&ledger_path).unwrap(), "*.log\n");

        let again = clean(&project).unwrap();
        assert!(!again.registry_removed);
        assert!(matches!(again.ledger, LedgerUpdate::Unchanged { .. }));
    }
}
