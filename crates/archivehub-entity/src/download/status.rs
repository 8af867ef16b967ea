//! Download job status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a download job.
///
/// Transitions are monotonic: `Pending → InProgress → {Done, Cancelled,
/// Failed}`, with the extra edge `Pending → Cancelled` for jobs cancelled
/// before their worker starts. A terminal status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Accepted; totals computed, worker not yet building.
    Pending,
    /// The archive worker is writing entries.
    InProgress,
    /// All entries written; the archive is retrievable.
    Done,
    /// Stopped at a cancellation checkpoint; partial counters retained.
    Cancelled,
    /// A source node became unreadable mid-build or the archive write
    /// failed. No archive is retrievable.
    Failed,
}

impl DownloadStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!DownloadStatus::Pending.is_terminal());
        assert!(!DownloadStatus::InProgress.is_terminal());
        assert!(DownloadStatus::Done.is_terminal());
        assert!(DownloadStatus::Cancelled.is_terminal());
        assert!(DownloadStatus::Failed.is_terminal());
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&DownloadStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"in_progress\"");
    }
}
