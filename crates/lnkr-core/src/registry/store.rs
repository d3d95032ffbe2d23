//! TOML persistence of the registry document.

use super::Registry;
use crate::atomic::atomic_write;
use crate::error::{LnkrError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads and saves a [`Registry`] at a fixed path.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the registry.
    ///
    /// A missing or empty document yields an empty registry.
    pub fn load(&self) -> Result<Registry> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No registry at {}, starting empty", self.path.display());
                return Ok(Registry::default());
            }
            Err(e) => {
                return Err(LnkrError::io_context(
                    e,
                    format!("Failed to read {}", self.path.display()),
                    &self.path,
                ))
            }
        };

        if contents.trim().is_empty() {
            return Ok(Registry::default());
        }

        toml::from_str(&contents).map_err(|e| LnkrError::Document {
            path: self.path.clone(),
            message: format!("failed to parse: {}", e),
        })
    }

    /// Save the registry, sorting entries first.
    pub fn save(&self, registry: &Registry) -> Result<()> {
        let mut sorted = registry.clone();
        sorted.sort_entries();

        let serialized = toml::to_string_pretty(&sorted).map_err(|e| LnkrError::Document {
            path: self.path.clone(),
            message: format!("failed to serialize: {}", e),
        })?;

        atomic_write(&self.path, serialized.as_bytes())?;
        debug!(
            "Saved {} link(s) to {}",
            sorted.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Delete the document. Returns `false` if there was nothing to delete.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LnkrError::io_context(
                e,
                format!("Failed to remove {}", self.path.display()),
                &self.path,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{LinkEntry, LinkKind};
    use tempfile::TempDir;

    fn sample_registry() -> Registry {
        Registry {
            local: Some(PathBuf::from("/work/project")),
            remote: Some(PathBuf::from("/backup/project")),
            git_exclude_path: None,
            entries: vec![
                LinkEntry::new("zeta.txt", LinkKind::Hard),
                LinkEntry::new("config", LinkKind::Symbolic),
                LinkEntry::new("alpha/b.txt", LinkKind::Hard),
            ],
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = RegistryStore::new(temp_dir.path().join(".lnkr.toml"));
        assert_eq!(store.load().unwrap(), Registry::default());
    }

    #[test]
    fn test_load_blank_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lnkr.toml");
        fs::write(&path, "\n  \n").unwrap();
        assert_eq!(RegistryStore::new(path).load().unwrap(), Registry::default());
    }

    #[test]
    fn test_save_sorts_and_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let store = RegistryStore::new(temp_dir.path().join(".lnkr.toml"));

        store.save(&sample_registry()).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.is_sorted());
        assert_eq!(loaded.entries[0].path, "alpha/b.txt");

        store.save(&loaded).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_document_format() {
        let temp_dir = TempDir::new().unwrap();
        let store = RegistryStore::new(temp_dir.path().join(".lnkr.toml"));
        store.save(&sample_registry()).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("local = \"/work/project\""));
        assert!(text.contains("remote = \"/backup/project\""));
        assert!(text.contains("[[links]]"));
        assert!(text.contains("type = \"symbolic\""));
        assert!(!text.contains("git_exclude_path"));
    }

    #[test]
    fn test_load_handwritten_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lnkr.toml");
        fs::write(
            &path,
            r#"local = "/src"
remote = ""

[[links]]
path = "notes.md"
type = "hard"
"#,
        )
        .unwrap();

        let registry = RegistryStore::new(path).load().unwrap();
        assert_eq!(registry.local, Some(PathBuf::from("/src")));
        assert_eq!(registry.remote, None);
        assert_eq!(
            registry.entries,
            vec![LinkEntry::new("notes.md", LinkKind::Hard)]
        );
    }

    #[test]
    fn test_load_rejects_unknown_type() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lnkr.toml");
        fs::write(&path, "[[links]]\npath = \"a\"\ntype = \"soft\"\n").unwrap();

        let err = RegistryStore::new(path).load().unwrap_err();
        assert!(matches!(err, LnkrError::Document { .. }));
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = RegistryStore::new(temp_dir.path().join(".lnkr.toml"));
        assert!(!store.remove().unwrap());
        store.save(&Registry::default()).unwrap();
        assert!(store.remove().unwrap());
        assert!(!store.exists());
    }
}
