//! Download service facade — submission, polling, cancellation, and
//! finished-content retrieval with owner-only visibility.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Semaphore;
use tracing;
use zip::CompressionMethod;

use archivehub_core::config::download::DownloadConfig;
use archivehub_core::result::AppResult;
use archivehub_core::traits::{AccessGate, ContentStore};
use archivehub_core::types::{DownloadId, NodeId, UserId};
use archivehub_entity::download::{DownloadJob, DownloadProgress};

use crate::download::registry::{DownloadRegistry, JobRecord};
use crate::download::resolver::TreeResolver;
use crate::download::validate;
use crate::download::worker::ArchiveWorker;

/// Filename reported for finished archives.
const ARCHIVE_FILENAME: &str = "archive.zip";

/// Result containing the finished archive bytes for retrieval.
#[derive(Debug, Clone)]
pub struct DownloadContent {
    /// Suggested filename for Content-Disposition.
    pub filename: String,
    /// Archive bytes.
    pub data: Bytes,
    /// MIME type for Content-Type.
    pub content_type: String,
}

/// Orchestrates download jobs: validates submissions, resolves trees,
/// registers job records, and schedules archive workers.
#[derive(Clone)]
pub struct DownloadService {
    /// Content tree gateway.
    store: Arc<dyn ContentStore>,
    /// Read-permission evaluator.
    gate: Arc<dyn AccessGate>,
    /// Job registry shared with pollers.
    registry: Arc<DownloadRegistry>,
    /// Tree resolver.
    resolver: TreeResolver,
    /// Worker slots limiting concurrent builds.
    slots: Arc<Semaphore>,
    /// Compression method for archive entries.
    compression: CompressionMethod,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        store: Arc<dyn ContentStore>,
        gate: Arc<dyn AccessGate>,
        registry: Arc<DownloadRegistry>,
        config: &DownloadConfig,
    ) -> Self {
        let compression = match config.compression.as_str() {
            "stored" => CompressionMethod::Stored,
            "deflated" => CompressionMethod::Deflated,
            other => {
                tracing::warn!("Unknown compression method '{}', using deflated", other);
                CompressionMethod::Deflated
            }
        };

        Self {
            resolver: TreeResolver::new(Arc::clone(&store)),
            store,
            gate,
            registry,
            slots: Arc::new(Semaphore::new(config.max_active_jobs)),
            compression,
        }
    }

    /// Submit a new download request.
    ///
    /// Validates the request, resolves the full entry list synchronously
    /// (so totals are final before the record is visible), registers a
    /// `Pending` record, and schedules the archive worker. Returns
    /// immediately with the job descriptor; the build runs in the
    /// background.
    pub async fn submit(&self, caller: UserId, node_ids: Vec<NodeId>) -> AppResult<DownloadJob> {
        validate::validate_submission(self.store.as_ref(), self.gate.as_ref(), caller, &node_ids)
            .await?;

        let plan = self.resolver.resolve(&node_ids).await?;

        let job = DownloadJob {
            id: DownloadId::new(),
            owner_id: caller,
            requested_root_ids: node_ids,
            total_files: plan.total_files,
            total_bytes: plan.total_bytes,
            created_at: Utc::now(),
        };

        let record = Arc::new(JobRecord::new(job.clone()));
        self.registry.insert(Arc::clone(&record));

        tracing::info!(
            "Accepted download {} for user {}: {} roots, {} files, {} bytes",
            job.id,
            caller,
            job.requested_root_ids.len(),
            job.total_files,
            job.total_bytes
        );

        let worker = ArchiveWorker::new(
            Arc::clone(&self.store),
            record,
            plan.entries,
            self.compression,
        );
        let slots = Arc::clone(&self.slots);
        tokio::spawn(async move {
            // Acquire fails only if the semaphore is closed, which never
            // happens for the service's lifetime.
            if let Ok(_permit) = slots.acquire_owned().await {
                worker.run().await;
            }
        });

        Ok(job)
    }

    /// Return a progress snapshot for polling. Owner-only.
    pub fn status(&self, caller: UserId, id: DownloadId) -> AppResult<DownloadProgress> {
        Ok(self.registry.owned(caller, id)?.progress())
    }

    /// Request cancellation of a job. Owner-only.
    ///
    /// Fire-and-forget: the worker honors the flag at its next per-entry
    /// checkpoint. Idempotent on jobs already in a terminal state.
    pub fn cancel(&self, caller: UserId, id: DownloadId) -> AppResult<()> {
        let record = self.registry.owned(caller, id)?;
        record.request_cancel();
        tracing::info!("Cancellation requested for download {} by user {}", id, caller);
        Ok(())
    }

    /// Retrieve the finished archive. Owner-only.
    ///
    /// Never blocks: before the job reaches `Done` this returns a
    /// `NotReady` error, and callers are expected to poll
    /// [`status`](Self::status) first.
    pub fn content(&self, caller: UserId, id: DownloadId) -> AppResult<DownloadContent> {
        let record = self.registry.owned(caller, id)?;
        let data = record.finished_archive()?;
        Ok(DownloadContent {
            filename: ARCHIVE_FILENAME.to_string(),
            data,
            content_type: "application/zip".to_string(),
        })
    }

    /// Delete a job record, discarding any produced archive bytes.
    /// Owner-only. A still-running worker is asked to cancel.
    pub fn delete(&self, caller: UserId, id: DownloadId) -> AppResult<()> {
        let record = self.registry.owned(caller, id)?;
        record.request_cancel();
        self.registry.remove(id);
        tracing::info!("Download {} deleted by user {}", id, caller);
        Ok(())
    }
}
