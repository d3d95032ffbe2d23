//! Centralized configuration for lnkr.
//!
//! Well-known file names, ledger markers and environment variable names.
//! Runtime paths derived from these live on [`crate::Project`].

/// Project-level file names and defaults.
pub struct ProjectConfig;

impl ProjectConfig {
    pub const REGISTRY_FILE_NAME: &'static str = ".lnkr.toml";
    pub const DEFAULT_GIT_EXCLUDE_PATH: &'static str = ".git/info/exclude";
    /// Trailing working-directory components kept when deriving a default remote.
    pub const DEFAULT_REMOTE_DEPTH: usize = 2;
    /// Depth used when the remote base comes from `LNKR_REMOTE_ROOT`.
    pub const DEFAULT_REMOTE_ROOT_DEPTH: usize = 1;
}

/// Markers delimiting the block lnkr owns inside the exclude ledger.
pub struct LedgerConfig;

impl LedgerConfig {
    pub const SECTION_START: &'static str = "# lnkr start";
    pub const SECTION_END: &'static str = "# lnkr end";
}

/// Environment variables consulted by the command line front end.
pub struct EnvConfig;

impl EnvConfig {
    pub const REMOTE_ROOT: &'static str = "LNKR_REMOTE_ROOT";
    pub const REMOTE_DEPTH: &'static str = "LNKR_REMOTE_DEPTH";
}
