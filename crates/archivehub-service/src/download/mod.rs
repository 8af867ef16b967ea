//! The download subsystem: archive jobs built in the background from
//! content-tree roots.

pub mod registry;
pub mod resolver;
pub mod service;
pub mod validate;
pub mod worker;

pub use registry::{DownloadRegistry, JobRecord};
pub use resolver::{ResolvedPlan, TreeResolver};
pub use service::{DownloadContent, DownloadService};
pub use worker::ArchiveWorker;
