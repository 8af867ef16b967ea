//! Tree resolution: expanding requested roots into an ordered entry list.

use std::sync::Arc;

use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::traits::{ContentStore, NodeKind};
use archivehub_core::types::NodeId;
use archivehub_entity::download::ArchiveEntry;

/// The flattened build plan for one archive.
///
/// Entry order is the order entries are written to the archive and is
/// deterministic for a given tree: requested roots in request order, each
/// expanded depth-first pre-order.
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    /// Ordered archive entries.
    pub entries: Vec<ArchiveEntry>,
    /// Count of non-directory entries.
    pub total_files: u64,
    /// Sum of file entry sizes. Directories contribute nothing.
    pub total_bytes: u64,
}

/// Expands requested root ids into a [`ResolvedPlan`].
///
/// Resolution is intentionally **not** deduplicating: a node reachable
/// through two different requested roots (directly, or nested by primary or
/// secondary association) is emitted and counted once per occurrence. The
/// only duplicate check in the system is the literal-duplicate-root rule at
/// validation time.
#[derive(Debug, Clone)]
pub struct TreeResolver {
    /// Content tree gateway.
    store: Arc<dyn ContentStore>,
}

impl TreeResolver {
    /// Creates a new tree resolver.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Resolve the requested roots into the full ordered entry list with
    /// precomputed totals.
    pub async fn resolve(&self, root_ids: &[NodeId]) -> AppResult<ResolvedPlan> {
        let mut entries = Vec::new();
        for &root in root_ids {
            self.expand(root, &mut entries).await?;
        }

        let total_files = entries.iter().filter(|e| !e.is_directory).count() as u64;
        let total_bytes = entries
            .iter()
            .filter(|e| !e.is_directory)
            .map(|e| e.size_bytes)
            .sum();

        Ok(ResolvedPlan {
            entries,
            total_files,
            total_bytes,
        })
    }

    /// Expand one requested root depth-first, pre-order.
    ///
    /// Iterative with an explicit stack so deep trees cannot overflow the
    /// call stack. The stack holds `(node, parent path)` pairs; children
    /// are pushed in reverse so they pop in gateway order, primary children
    /// ahead of secondary associations.
    async fn expand(&self, root: NodeId, entries: &mut Vec<ArchiveEntry>) -> AppResult<()> {
        let mut stack: Vec<(NodeId, String)> = vec![(root, String::new())];

        while let Some((id, prefix)) = stack.pop() {
            let info = self
                .store
                .node(id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;

            match info.kind {
                NodeKind::File => {
                    entries.push(ArchiveEntry::file(
                        format!("{prefix}{}", info.name),
                        id,
                        info.size_bytes,
                    ));
                }
                NodeKind::Folder => {
                    let dir_path = format!("{prefix}{}/", info.name);
                    entries.push(ArchiveEntry::directory(dir_path.clone(), id));

                    let mut children = self.store.primary_children(id).await?;
                    children.extend(self.store.secondary_children(id).await?);
                    for child in children.into_iter().rev() {
                        stack.push((child, dir_path.clone()));
                    }
                }
            }
        }

        Ok(())
    }
}
