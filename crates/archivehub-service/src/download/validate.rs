//! Submission request validation.

use std::collections::HashSet;

use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::traits::{AccessGate, ContentStore};
use archivehub_core::types::{NodeId, UserId};

/// Validate a submission request. Nothing is created until every rule
/// passes.
///
/// Rules, in order:
/// 1. the root list must be non-empty;
/// 2. no two elements may be the exact same id (a literal-identity check,
///    not a containment check — a node requested directly and also nested
///    inside a requested folder is fine);
/// 3. the caller must have read access to every root (a single unreadable
///    root rejects the whole submission);
/// 4. every root must resolve to an existing node.
pub async fn validate_submission(
    store: &dyn ContentStore,
    gate: &dyn AccessGate,
    caller: UserId,
    node_ids: &[NodeId],
) -> AppResult<()> {
    if node_ids.is_empty() {
        return Err(AppError::validation("At least one node id is required"));
    }

    let mut seen = HashSet::with_capacity(node_ids.len());
    for id in node_ids {
        if !seen.insert(*id) {
            return Err(AppError::validation(format!(
                "Node id {id} is requested more than once"
            )));
        }
    }

    for &id in node_ids {
        if !gate.can_read(caller, id).await? {
            return Err(AppError::authorization(format!(
                "User {caller} may not read node {id}"
            )));
        }
    }

    for &id in node_ids {
        if store.node(id).await?.is_none() {
            return Err(AppError::not_found(format!("Node {id} not found")));
        }
    }

    Ok(())
}
