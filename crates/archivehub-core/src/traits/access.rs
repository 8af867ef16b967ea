//! Access gate trait for read-permission checks.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{NodeId, UserId};

/// Trait for the permission evaluator guarding content reads.
///
/// Implemented by the external authorization layer. ArchiveHub consults it
/// once per requested root at submission time; job-level ownership checks
/// are handled internally by the registry.
#[async_trait]
pub trait AccessGate: Send + Sync + std::fmt::Debug + 'static {
    /// Check whether `user` may read `node`.
    async fn can_read(&self, user: UserId, node: NodeId) -> AppResult<bool>;
}
