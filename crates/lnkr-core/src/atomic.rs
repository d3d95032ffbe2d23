//! Atomic file writes.
//!
//! Implements atomic writes using:
//! 1. Write to a temp file with a unique PID suffix
//! 2. fsync to ensure data reaches disk
//! 3. Atomic rename to the target path

use crate::error::{LnkrError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process;

/// Write `data` to `path` via temp file, fsync and rename.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                LnkrError::io_context(
                    e,
                    format!("Failed to create directory {}", parent.display()),
                    parent,
                )
            })?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{}.{}.tmp", file_name, process::id()));

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| {
            LnkrError::io_context(
                e,
                format!("Failed to create temp file {}", temp_path.display()),
                &temp_path,
            )
        })?;

    let written = write_and_sync(&mut file, data, &temp_path);
    drop(file);

    let result = written.and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| {
            LnkrError::io_context(
                e,
                format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    path.display()
                ),
                path,
            )
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_sync(file: &mut fs::File, data: &[u8], temp_path: &Path) -> Result<()> {
    file.write_all(data).map_err(|e| {
        LnkrError::io_context(
            e,
            format!("Failed to write temp file {}", temp_path.display()),
            temp_path,
        )
    })?;
    file.sync_all().map_err(|e| {
        LnkrError::io_context(
            e,
            format!("Failed to sync temp file {}", temp_path.display()),
            temp_path,
        )
    })?;
    Ok(())
}
