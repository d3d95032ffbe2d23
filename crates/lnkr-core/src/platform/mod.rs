//! Platform abstraction layer for link creation and file identity.
//!
//! All `#[cfg]` blocks for OS-specific filesystem behavior live here rather
//! than in the materializer or the status reconciler.
//!
//! - `identity` - Unique file identity used to verify hard links
//! - `links` - Symbolic link creation and detection

pub mod identity;
pub mod links;

pub use identity::FileIdentity;
pub use links::{create_symlink, path_exists_no_follow, remove_symlink};

/// Returns the current platform name.
pub fn current_platform() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "linux"
    }
    #[cfg(target_os = "windows")]
    {
        "windows"
    }
    #[cfg(target_os = "macos")]
    {
        "macos"
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        "unknown"
    }
}
