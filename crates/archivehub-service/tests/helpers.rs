//! Shared test helpers for download integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use tokio::sync::Semaphore;

use archivehub_core::config::download::DownloadConfig;
use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::traits::{AccessGate, ByteStream, ContentStore, NodeInfo, NodeKind};
use archivehub_core::types::{DownloadId, NodeId, UserId};
use archivehub_entity::download::DownloadProgress;
use archivehub_service::download::{DownloadRegistry, DownloadService};

/// In-memory content tree implementing both collaborator traits.
///
/// Content reads can be gated behind a semaphore so tests control exactly
/// how far a build progresses before cancellation or polling.
#[derive(Debug, Default)]
pub struct MemoryTree {
    nodes: HashMap<NodeId, NodeInfo>,
    content: HashMap<NodeId, Bytes>,
    primary: HashMap<NodeId, Vec<NodeId>>,
    secondary: HashMap<NodeId, Vec<NodeId>>,
    denied: HashSet<(UserId, NodeId)>,
    broken: HashSet<NodeId>,
    read_gate: Option<Arc<Semaphore>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a folder node.
    pub fn folder(&mut self, name: &str) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(
            id,
            NodeInfo {
                id,
                name: name.to_string(),
                kind: NodeKind::Folder,
                size_bytes: 0,
            },
        );
        id
    }

    /// Add a file node with the given content.
    pub fn file(&mut self, name: &str, content: &[u8]) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(
            id,
            NodeInfo {
                id,
                name: name.to_string(),
                kind: NodeKind::File,
                size_bytes: content.len() as u64,
            },
        );
        self.content.insert(id, Bytes::copy_from_slice(content));
        id
    }

    /// Link a child under a folder as a primary child.
    pub fn add_primary(&mut self, parent: NodeId, child: NodeId) {
        self.primary.entry(parent).or_default().push(child);
    }

    /// Link a child under a folder as a secondary association.
    pub fn add_secondary(&mut self, parent: NodeId, child: NodeId) {
        self.secondary.entry(parent).or_default().push(child);
    }

    /// Deny `user` read access to `node`.
    pub fn deny(&mut self, user: UserId, node: NodeId) {
        self.denied.insert((user, node));
    }

    /// Make a file's content unreadable (reads fail with a storage error).
    pub fn break_content(&mut self, node: NodeId) {
        self.broken.insert(node);
    }

    /// Gate content reads behind a semaphore with `permits` initial
    /// permits. Each read consumes one permit; the returned handle lets the
    /// test release reads one at a time.
    pub fn gate_reads(&mut self, permits: usize) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(permits));
        self.read_gate = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl ContentStore for MemoryTree {
    async fn node(&self, id: NodeId) -> AppResult<Option<NodeInfo>> {
        Ok(self.nodes.get(&id).cloned())
    }

    async fn primary_children(&self, folder_id: NodeId) -> AppResult<Vec<NodeId>> {
        Ok(self.primary.get(&folder_id).cloned().unwrap_or_default())
    }

    async fn secondary_children(&self, folder_id: NodeId) -> AppResult<Vec<NodeId>> {
        Ok(self.secondary.get(&folder_id).cloned().unwrap_or_default())
    }

    async fn open_content(&self, file_id: NodeId) -> AppResult<ByteStream> {
        if let Some(gate) = &self.read_gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| AppError::storage("read gate closed"))?;
            permit.forget();
        }
        if self.broken.contains(&file_id) {
            return Err(AppError::storage(format!(
                "Content for node {file_id} is unreadable"
            )));
        }
        let data = self
            .content
            .get(&file_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("No content for node {file_id}")))?;
        Ok(Box::pin(stream::iter(vec![
            Ok::<Bytes, std::io::Error>(data),
        ])))
    }
}

#[async_trait]
impl AccessGate for MemoryTree {
    async fn can_read(&self, user: UserId, node: NodeId) -> AppResult<bool> {
        Ok(!self.denied.contains(&(user, node)))
    }
}

/// Wired-up service over a [`MemoryTree`], plus a default test user.
pub struct TestHub {
    pub service: DownloadService,
    pub registry: Arc<DownloadRegistry>,
    pub user: UserId,
}

impl TestHub {
    pub fn new(tree: MemoryTree) -> Self {
        Self::with_config(tree, DownloadConfig::default())
    }

    pub fn with_config(tree: MemoryTree, config: DownloadConfig) -> Self {
        init_tracing();
        let tree = Arc::new(tree);
        let registry = Arc::new(DownloadRegistry::new());
        let service = DownloadService::new(
            Arc::clone(&tree) as Arc<dyn ContentStore>,
            tree as Arc<dyn AccessGate>,
            Arc::clone(&registry),
            &config,
        );
        Self {
            service,
            registry,
            user: UserId::new(),
        }
    }

    /// Poll at a fixed interval until the job reaches a terminal state.
    pub async fn wait_for_terminal(&self, id: DownloadId) -> DownloadProgress {
        for _ in 0..1000 {
            let progress = self.service.status(self.user, id).expect("status poll");
            if progress.is_terminal() {
                return progress;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("download {id} did not reach a terminal state");
    }

    /// Poll until at least `files` file entries have been written.
    pub async fn wait_for_files_added(&self, id: DownloadId, files: u64) -> DownloadProgress {
        for _ in 0..1000 {
            let progress = self.service.status(self.user, id).expect("status poll");
            if progress.files_added >= files {
                return progress;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("download {id} never reached {files} files added");
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
