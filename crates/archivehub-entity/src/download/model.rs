//! Download job entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use archivehub_core::types::{DownloadId, NodeId, UserId};

use super::status::DownloadStatus;

/// Immutable descriptor of an accepted download job.
///
/// Returned by submission. The totals are computed by the tree resolver
/// before the record becomes visible and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    /// Unique job identifier.
    pub id: DownloadId,
    /// The user who submitted the job. Only the owner may observe,
    /// cancel, or delete it.
    pub owner_id: UserId,
    /// The requested root node ids, in submission order.
    pub requested_root_ids: Vec<NodeId>,
    /// Total number of file entries the finished archive will contain.
    pub total_files: u64,
    /// Total content bytes the finished archive will contain.
    pub total_bytes: u64,
    /// When the job was accepted.
    pub created_at: DateTime<Utc>,
}

/// Point-in-time progress snapshot of a download job.
///
/// Designed for fixed-interval polling: counters are monotonically
/// non-decreasing, never exceed their totals, and equal them exactly when
/// `status` is [`DownloadStatus::Done`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// The job identifier.
    pub id: DownloadId,
    /// Current job status.
    pub status: DownloadStatus,
    /// Content bytes written so far.
    pub bytes_added: u64,
    /// Total content bytes the archive will contain.
    pub total_bytes: u64,
    /// File entries written so far.
    pub files_added: u64,
    /// Total file entries the archive will contain.
    pub total_files: u64,
    /// Diagnostic message when `status` is [`DownloadStatus::Failed`].
    pub error_message: Option<String>,
}

impl DownloadProgress {
    /// Check if the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
