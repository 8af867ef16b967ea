//! # archivehub-entity
//!
//! Domain entity models for ArchiveHub: download job descriptors, status
//! enums, progress snapshots, and archive entries.

pub mod download;
