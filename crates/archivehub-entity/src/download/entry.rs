//! Archive entry model.

use serde::{Deserialize, Serialize};

use archivehub_core::types::NodeId;

/// One record in a produced archive, derived by the tree resolver.
///
/// Entries exist only for the lifetime of a job's build; they are not
/// persisted. Directory paths carry a trailing `/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Slash-separated path inside the archive.
    pub zip_path: String,
    /// The content node this entry was derived from.
    pub source: NodeId,
    /// Whether this entry is a directory record.
    pub is_directory: bool,
    /// Declared content size. Zero for directories.
    pub size_bytes: u64,
}

impl ArchiveEntry {
    /// Create a directory entry.
    pub fn directory(zip_path: impl Into<String>, source: NodeId) -> Self {
        Self {
            zip_path: zip_path.into(),
            source,
            is_directory: true,
            size_bytes: 0,
        }
    }

    /// Create a file entry.
    pub fn file(zip_path: impl Into<String>, source: NodeId, size_bytes: u64) -> Self {
        Self {
            zip_path: zip_path.into(),
            source,
            is_directory: false,
            size_bytes,
        }
    }
}
