//! Traits implemented by external collaborators.
//!
//! ArchiveHub does not own the content repository or the permission model;
//! it consumes both through the traits defined here.

pub mod access;
pub mod content;

pub use access::AccessGate;
pub use content::{ByteStream, ContentStore, NodeInfo, NodeKind};
