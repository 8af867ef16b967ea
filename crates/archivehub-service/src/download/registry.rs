//! In-memory download job registry.
//!
//! The registry is the single source of truth for status polling. It is an
//! explicit object constructed once at process start and passed by handle
//! to whichever component needs it — never ambient global state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use dashmap::DashMap;

use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::types::{DownloadId, UserId};
use archivehub_entity::download::{DownloadJob, DownloadProgress, DownloadStatus};

/// Mutable state guarded by the record's lock.
///
/// Status, failure diagnostic, and finished archive bytes change together
/// at terminal transitions, so they live under a single lock and are
/// always observed consistently.
#[derive(Debug)]
struct JobState {
    status: DownloadStatus,
    error_message: Option<String>,
    archive: Option<Bytes>,
}

/// The live record of one download job.
///
/// The immutable descriptor (owner, roots, totals) is fixed at submission.
/// Counters are atomics written only by the job's single archive worker;
/// status transitions are lock-guarded and monotonic — once terminal, a
/// record never changes status again. Snapshot reads never block on the
/// worker.
#[derive(Debug)]
pub struct JobRecord {
    job: DownloadJob,
    bytes_added: AtomicU64,
    files_added: AtomicU64,
    cancel_requested: AtomicBool,
    state: RwLock<JobState>,
}

impl JobRecord {
    /// Create a new record in `Pending` state.
    pub fn new(job: DownloadJob) -> Self {
        Self {
            job,
            bytes_added: AtomicU64::new(0),
            files_added: AtomicU64::new(0),
            cancel_requested: AtomicBool::new(false),
            state: RwLock::new(JobState {
                status: DownloadStatus::Pending,
                error_message: None,
                archive: None,
            }),
        }
    }

    /// The immutable job descriptor.
    pub fn descriptor(&self) -> &DownloadJob {
        &self.job
    }

    /// The user who owns this job.
    pub fn owner_id(&self) -> UserId {
        self.job.owner_id
    }

    /// The current status.
    pub fn status(&self) -> DownloadStatus {
        self.read_state().status
    }

    /// Take a consistent progress snapshot for polling.
    pub fn progress(&self) -> DownloadProgress {
        let state = self.read_state();
        DownloadProgress {
            id: self.job.id,
            status: state.status,
            bytes_added: self.bytes_added.load(Ordering::SeqCst),
            total_bytes: self.job.total_bytes,
            files_added: self.files_added.load(Ordering::SeqCst),
            total_files: self.job.total_files,
            error_message: state.error_message.clone(),
        }
    }

    /// Record one entry's contribution to the counters.
    pub fn add_progress(&self, files: u64, bytes: u64) {
        self.files_added.fetch_add(files, Ordering::SeqCst);
        self.bytes_added.fetch_add(bytes, Ordering::SeqCst);
    }

    /// Ask the worker to stop at its next per-entry checkpoint.
    ///
    /// Fire-and-forget: the effect is observed asynchronously, and the
    /// request is a no-op on jobs already in a terminal state.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Transition `Pending → InProgress`.
    pub fn mark_in_progress(&self) {
        let mut state = self.write_state();
        if state.status == DownloadStatus::Pending {
            state.status = DownloadStatus::InProgress;
        }
    }

    /// Terminal transition to `Done`, stashing the finished archive bytes.
    pub fn mark_done(&self, archive: Bytes) {
        let mut state = self.write_state();
        if !state.status.is_terminal() {
            state.archive = Some(archive);
            state.status = DownloadStatus::Done;
        }
    }

    /// Terminal transition to `Cancelled`. Partial counters are retained.
    pub fn mark_cancelled(&self) {
        let mut state = self.write_state();
        if !state.status.is_terminal() {
            state.status = DownloadStatus::Cancelled;
        }
    }

    /// Terminal transition to `Failed` with a captured diagnostic.
    pub fn mark_failed(&self, message: impl Into<String>) {
        let mut state = self.write_state();
        if !state.status.is_terminal() {
            state.error_message = Some(message.into());
            state.status = DownloadStatus::Failed;
        }
    }

    /// Return the finished archive bytes.
    ///
    /// Fails with `NotReady` until the job reaches `Done`.
    pub fn finished_archive(&self) -> AppResult<Bytes> {
        let state = self.read_state();
        if state.status != DownloadStatus::Done {
            return Err(AppError::not_ready(format!(
                "Download {} is {}, archive not ready",
                self.job.id, state.status
            )));
        }
        state
            .archive
            .clone()
            .ok_or_else(|| AppError::internal(format!("Download {} has no archive", self.job.id)))
    }

    fn read_state(&self) -> RwLockReadGuard<'_, JobState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, JobState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Map of live download jobs, keyed by job id.
#[derive(Debug, Default)]
pub struct DownloadRegistry {
    jobs: DashMap<DownloadId, Arc<JobRecord>>,
}

impl DownloadRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    /// Register a new job record.
    pub fn insert(&self, record: Arc<JobRecord>) {
        self.jobs.insert(record.descriptor().id, record);
    }

    /// Look up a job record by id.
    pub fn get(&self, id: DownloadId) -> Option<Arc<JobRecord>> {
        self.jobs.get(&id).map(|entry| Arc::clone(&entry))
    }

    /// Remove a job record, returning it if present.
    pub fn remove(&self, id: DownloadId) -> Option<Arc<JobRecord>> {
        self.jobs.remove(&id).map(|(_, record)| record)
    }

    /// Look up a job record and enforce ownership.
    ///
    /// Returns `NotFound` when no such job exists and `Authorization` when
    /// it exists but belongs to another user.
    pub fn owned(&self, caller: UserId, id: DownloadId) -> AppResult<Arc<JobRecord>> {
        let record = self
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("Download {id} not found")))?;
        if record.owner_id() != caller {
            return Err(AppError::authorization(format!(
                "Download {id} belongs to another user"
            )));
        }
        Ok(record)
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the registry holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archivehub_core::error::ErrorKind;
    use archivehub_core::types::NodeId;
    use chrono::Utc;
    use std::sync::Arc;

    fn record(owner: UserId) -> JobRecord {
        JobRecord::new(DownloadJob {
            id: DownloadId::new(),
            owner_id: owner,
            requested_root_ids: vec![NodeId::new()],
            total_files: 3,
            total_bytes: 30,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn test_new_record_is_pending_with_zero_progress() {
        let record = record(UserId::new());
        let progress = record.progress();
        assert_eq!(progress.status, DownloadStatus::Pending);
        assert_eq!(progress.files_added, 0);
        assert_eq!(progress.bytes_added, 0);
        assert_eq!(progress.total_files, 3);
        assert_eq!(progress.total_bytes, 30);
    }

    #[test]
    fn test_terminal_status_is_sticky() {
        let record = record(UserId::new());
        record.mark_in_progress();
        record.mark_done(Bytes::from_static(b"zip"));
        record.mark_cancelled();
        record.mark_failed("too late");
        assert_eq!(record.status(), DownloadStatus::Done);
    }

    #[test]
    fn test_cancelled_before_done_stays_cancelled() {
        let record = record(UserId::new());
        record.mark_in_progress();
        record.mark_cancelled();
        record.mark_done(Bytes::from_static(b"zip"));
        assert_eq!(record.status(), DownloadStatus::Cancelled);
    }

    #[test]
    fn test_finished_archive_not_ready_until_done() {
        let record = record(UserId::new());
        let err = record.finished_archive().expect_err("should not be ready");
        assert_eq!(err.kind, ErrorKind::NotReady);
        record.mark_in_progress();
        record.mark_done(Bytes::from_static(b"zip"));
        assert_eq!(record.finished_archive().expect("ready"), Bytes::from_static(b"zip"));
    }

    #[test]
    fn test_owned_distinguishes_missing_from_foreign() {
        let owner = UserId::new();
        let other = UserId::new();
        let registry = DownloadRegistry::new();
        let record = Arc::new(record(owner));
        let id = record.descriptor().id;
        registry.insert(record);

        assert!(registry.owned(owner, id).is_ok());
        let err = registry.owned(other, id).expect_err("foreign job");
        assert_eq!(err.kind, ErrorKind::Authorization);
        let err = registry
            .owned(owner, DownloadId::new())
            .expect_err("missing job");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
