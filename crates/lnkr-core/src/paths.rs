//! Path resolution against the local and remote roots.
//!
//! Registry keys are always root-relative, `/`-separated and lexically
//! normalized. Nothing here touches the filesystem.

use crate::error::{LnkrError, Result};
use std::path::{Component, Path, PathBuf};

/// A user path resolved against one of the roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// `base_root` joined with the normalized relative path
    pub absolute: PathBuf,
    /// Registry key for the path, relative to `base_root`
    pub key: String,
}

/// Resolve a user-supplied relative path against `base_root`.
///
/// Absolute inputs are rejected: the registry only stores root-relative
/// paths, so the same key can be joined onto either root.
pub fn resolve(user_path: &Path, base_root: &Path) -> Result<ResolvedPath> {
    let relative = normalize_relative(user_path)?;
    let absolute = base_root.join(&relative);
    let key = relative_key(base_root, &absolute)?;
    Ok(ResolvedPath { absolute, key })
}

/// Lexically normalize a relative path.
///
/// Drops `.` components and folds `..` into the preceding component. Fails
/// on absolute paths, on paths that climb above their base, and on paths
/// that normalize to nothing.
pub fn normalize_relative(user_path: &Path) -> Result<PathBuf> {
    if user_path.is_absolute() || user_path.has_root() {
        return Err(LnkrError::invalid_path(
            user_path,
            "absolute path is not allowed. Please use relative path",
        ));
    }

    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in user_path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(LnkrError::invalid_path(
                        user_path,
                        "path escapes the root directory",
                    ));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(LnkrError::invalid_path(
                    user_path,
                    "absolute path is not allowed. Please use relative path",
                ));
            }
        }
    }

    if parts.is_empty() {
        return Err(LnkrError::invalid_path(
            user_path,
            "path refers to the root directory itself",
        ));
    }

    Ok(parts.iter().collect())
}

/// Normalize a user path straight into a registry key.
pub fn normalize_key(user_path: &Path) -> Result<String> {
    key_from_relative(&normalize_relative(user_path)?)
}

/// Express `absolute` as a registry key relative to `base_root`.
pub fn relative_key(base_root: &Path, absolute: &Path) -> Result<String> {
    let relative = absolute.strip_prefix(base_root).map_err(|_| {
        LnkrError::invalid_path(
            absolute,
            format!("path is not under {}", base_root.display()),
        )
    })?;
    key_from_relative(relative)
}

fn key_from_relative(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| LnkrError::invalid_path(relative, "path is not valid UTF-8"))?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(LnkrError::invalid_path(
                    relative,
                    "path must be relative and normalized",
                ))
            }
        }
    }
    if parts.is_empty() {
        return Err(LnkrError::invalid_path(
            relative,
            "path refers to the root directory itself",
        ));
    }
    Ok(parts.join("/"))
}

/// Lexically normalize an absolute path, folding `.` and `..`.
///
/// Used for configured roots, which are stored absolute but never
/// canonicalized so that symlinked roots keep the spelling the user chose.
pub fn normalize_absolute(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` absolute relative to `base` (when needed) and normalize it.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_absolute(path)
    } else {
        normalize_absolute(&base.join(path))
    }
}
