//! Unique file identity for hard link verification.
//!
//! # Platform Behavior
//! - **Linux/macOS**: device id plus inode number
//! - **Windows**: not available through stable std; callers get `None`

use std::fs::Metadata;

/// Identity of a filesystem object. Two paths with equal identity are hard
/// links to the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub device: u64,
    pub inode: u64,
}

impl FileIdentity {
    /// Read the identity from already-fetched metadata.
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Some(Self {
                device: metadata.dev(),
                inode: metadata.ino(),
            })
        }

        #[cfg(not(unix))]
        {
            let _ = metadata;
            None
        }
    }
}
