//! Archive worker — builds one job's ZIP archive in the background.

use std::io::{Cursor, Write};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tracing;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::traits::ContentStore;
use archivehub_entity::download::ArchiveEntry;

use crate::download::registry::JobRecord;

/// Builds the archive for a single download job.
///
/// Exactly one worker runs per job. It writes the resolved entries in
/// order, updating the record's counters after each one, and checks the
/// cancellation flag between entries — cancellation is cooperative and
/// entry-granular, never preemptive.
#[derive(Debug)]
pub struct ArchiveWorker {
    /// Content tree gateway.
    store: Arc<dyn ContentStore>,
    /// The job record this worker owns the mutable side of.
    record: Arc<JobRecord>,
    /// Ordered entries from the tree resolver.
    entries: Vec<ArchiveEntry>,
    /// Compression method for file entries.
    compression: CompressionMethod,
}

impl ArchiveWorker {
    /// Create a worker for one resolved job.
    pub fn new(
        store: Arc<dyn ContentStore>,
        record: Arc<JobRecord>,
        entries: Vec<ArchiveEntry>,
        compression: CompressionMethod,
    ) -> Self {
        Self {
            store,
            record,
            entries,
            compression,
        }
    }

    /// Run the build to a terminal state.
    pub async fn run(self) {
        let id = self.record.descriptor().id;

        if self.record.cancel_requested() {
            self.record.mark_cancelled();
            tracing::info!("Download {} cancelled before build started", id);
            return;
        }

        self.record.mark_in_progress();
        tracing::info!(
            "Building archive for download {}: {} entries, {} bytes expected",
            id,
            self.entries.len(),
            self.record.descriptor().total_bytes
        );

        match self.build().await {
            Ok(Some(archive)) => {
                let size = archive.len();
                self.record.mark_done(archive);
                tracing::info!("Download {} complete: archive is {} bytes", id, size);
            }
            Ok(None) => {
                self.record.mark_cancelled();
                tracing::info!("Download {} cancelled mid-build", id);
            }
            Err(e) => {
                tracing::error!("Download {} failed: {}", id, e);
                self.record.mark_failed(e.message.clone());
            }
        }
    }

    /// Write all entries in order. Returns `None` when a cancellation
    /// checkpoint fired; the partially written archive is discarded but
    /// counters retain the progress already made.
    async fn build(&self) -> AppResult<Option<Bytes>> {
        let options = SimpleFileOptions::default().compression_method(self.compression);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            if self.record.cancel_requested() {
                return Ok(None);
            }

            if entry.is_directory {
                writer
                    .add_directory(entry.zip_path.trim_end_matches('/'), options)
                    .map_err(|e| {
                        AppError::storage(format!(
                            "Failed to add directory entry '{}': {e}",
                            entry.zip_path
                        ))
                    })?;
            } else {
                writer.start_file(entry.zip_path.as_str(), options).map_err(|e| {
                    AppError::storage(format!(
                        "Failed to start file entry '{}': {e}",
                        entry.zip_path
                    ))
                })?;

                let mut stream = self.store.open_content(entry.source).await?;
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    writer.write_all(&chunk)?;
                }

                self.record.add_progress(1, entry.size_bytes);
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| AppError::storage(format!("Failed to finalize archive: {e}")))?;

        Ok(Some(Bytes::from(cursor.into_inner())))
    }
}
