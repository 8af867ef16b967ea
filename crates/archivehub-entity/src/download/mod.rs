//! Download job entities.

pub mod entry;
pub mod model;
pub mod status;

pub use entry::ArchiveEntry;
pub use model::{DownloadJob, DownloadProgress};
pub use status::DownloadStatus;
