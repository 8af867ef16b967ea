//! Content tree gateway trait for the backing content repository.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::NodeId;

/// The kind of a content node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A leaf node carrying content bytes.
    File,
    /// A container node with primary children and, possibly, secondary
    /// child associations.
    Folder,
}

/// Metadata about a content node.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeInfo {
    /// The node's identifier.
    pub id: NodeId,
    /// The node's name, used as its archive path segment.
    pub name: String,
    /// Whether the node is a file or a folder.
    pub kind: NodeKind,
    /// Content size in bytes. Zero for folders.
    pub size_bytes: u64,
}

impl NodeInfo {
    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }
}

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for the content tree gateway.
///
/// Implemented by the backing content repository. Child lists are ordered;
/// the order they are returned in is the order entries appear in produced
/// archives.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Look up a node's metadata. Returns `None` for unknown ids.
    async fn node(&self, id: NodeId) -> AppResult<Option<NodeInfo>>;

    /// Return the ordered primary children of a folder.
    async fn primary_children(&self, folder_id: NodeId) -> AppResult<Vec<NodeId>>;

    /// Return the ordered secondary child associations of a folder.
    ///
    /// These are non-primary parent-child links pointing at nodes whose
    /// primary parent is elsewhere in the tree.
    async fn secondary_children(&self, folder_id: NodeId) -> AppResult<Vec<NodeId>>;

    /// Open a file node's content as a byte stream.
    async fn open_content(&self, file_id: NodeId) -> AppResult<ByteStream>;
}
