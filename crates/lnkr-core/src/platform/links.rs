//! Symbolic link helpers.
//!
//! # Platform Behavior
//! - **Linux/macOS**: `std::os::unix::fs::symlink` for files and directories
//! - **Windows**: `symlink_dir` or `symlink_file` depending on the source type

use crate::error::{LnkrError, Result};
use std::path::Path;
use tracing::debug;

/// Create a symbolic link at `link` pointing at `original`.
pub fn create_symlink(original: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(original, link).map_err(|e| {
            LnkrError::io_context(
                e,
                format!("Failed to create symbolic link {}", link.display()),
                link,
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if original.is_dir() {
            std::os::windows::fs::symlink_dir(original, link)
        } else {
            std::os::windows::fs::symlink_file(original, link)
        };
        result.map_err(|e| {
            LnkrError::io_context(
                e,
                format!("Failed to create symbolic link {}", link.display()),
                link,
            )
        })?;
    }

    #[cfg(not(any(unix, windows)))]
    {
        return Err(LnkrError::UnsupportedOperation {
            path: link.to_path_buf(),
            message: "symbolic links are not supported on this platform".to_string(),
        });
    }

    debug!("Created symlink {} -> {}", link.display(), original.display());
    Ok(())
}

/// Remove the symbolic link at `link`, leaving its target alone.
pub fn remove_symlink(link: &Path) -> Result<()> {
    #[cfg(windows)]
    let result = std::fs::remove_file(link).or_else(|_| std::fs::remove_dir(link));

    #[cfg(not(windows))]
    let result = std::fs::remove_file(link);

    result.map_err(|e| {
        LnkrError::io_context(
            e,
            format!("Failed to remove symbolic link {}", link.display()),
            link,
        )
    })
}

/// Whether anything exists at `path`, without following a final symlink.
///
/// A dangling symlink counts as existing.
pub fn path_exists_no_follow(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_create_symlink_and_dangling_detection() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target.txt");
        let link = temp_dir.path().join("link.txt");
        std::fs::write(&target, "data").unwrap();

        create_symlink(&target, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), target);

        std::fs::remove_file(&target).unwrap();
        assert!(!link.exists());
        assert!(path_exists_no_follow(&link));
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_symlink_keeps_target_dir() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("dir");
        let link = temp_dir.path().join("link");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "x").unwrap();
        create_symlink(&target, &link).unwrap();

        remove_symlink(&link).unwrap();
        assert!(!path_exists_no_follow(&link));
        assert!(target.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_create_symlink_fails_when_present() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        let link = temp_dir.path().join("link");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(&link, "occupied").unwrap();

        let err = create_symlink(&target, &link).unwrap_err();
        assert!(matches!(err, LnkrError::Io { .. }));
    }
}
