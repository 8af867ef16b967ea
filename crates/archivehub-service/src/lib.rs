//! # archivehub-service
//!
//! Business logic for ArchiveHub — submission validation, tree resolution,
//! the in-memory job registry, per-job archive workers, and the
//! [`DownloadService`](download::DownloadService) facade.

pub mod download;

pub use download::{DownloadRegistry, DownloadService};
