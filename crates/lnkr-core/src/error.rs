//! Error types for lnkr.
//!
//! Validation variants abort an operation before anything is written.
//! Filesystem and document variants carry enough context to name the
//! offending path in the message shown to the user.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two configured roots an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Local,
    Remote,
}

impl RootKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootKind::Local => "local",
            RootKind::Remote => "remote",
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the lnkr library.
#[derive(Debug, Error)]
pub enum LnkrError {
    // Validation errors
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Invalid link type: {0}. Must be 'hard' or 'symbolic'")]
    InvalidKind(String),

    #[error("{root} directory not configured. Run 'lnkr init --remote <path>' first")]
    UnconfiguredRoot { root: RootKind },

    #[error("Recursive option cannot be used with symbolic links")]
    IncompatibleOptions,

    #[error("Recursive option must be set when adding a directory with hard links: {0}")]
    RecursionRequired(PathBuf),

    #[error("No files to add under directory: {0}")]
    EmptyDirectory(PathBuf),

    // File system errors
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Target already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Unsupported operation on {path}: {message}")]
    UnsupportedOperation { path: PathBuf, message: String },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Registry document errors
    #[error("Registry document error in {path}: {message}")]
    Document { path: PathBuf, message: String },
}

/// Result type alias for lnkr operations.
pub type Result<T> = std::result::Result<T, LnkrError>;

impl From<std::io::Error> for LnkrError {
    fn from(err: std::io::Error) -> Self {
        LnkrError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl LnkrError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        LnkrError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create an IO error with a custom message and path context.
    pub fn io_context(
        err: std::io::Error,
        message: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        LnkrError::Io {
            message: message.into(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Reject an input path with a reason.
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LnkrError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
