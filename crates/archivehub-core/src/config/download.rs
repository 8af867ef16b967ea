//! Download job configuration.

use serde::{Deserialize, Serialize};

/// Archive download job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Maximum number of archive jobs building concurrently. Additional
    /// accepted jobs stay `pending` until a slot frees up.
    #[serde(default = "default_max_active_jobs")]
    pub max_active_jobs: usize,
    /// Compression method for archive entries: `"deflated"` or `"stored"`.
    #[serde(default = "default_compression")]
    pub compression: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_active_jobs: default_max_active_jobs(),
            compression: default_compression(),
        }
    }
}

fn default_max_active_jobs() -> usize {
    4
}

fn default_compression() -> String {
    "deflated".to_string()
}
