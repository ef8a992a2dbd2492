//! The path-addressed store that owns story graphs durably.
//!
//! A store is a JSON document tree addressed by slash-separated paths
//! (`stories/{user}/graph/nodes/0`). Every call is atomic at the path it
//! names; there are no cross-path transactions.

use async_trait::async_trait;
use serde_json::{Map, Value};
use storymap_core::error::Result;
use storymap_core::types::Graph;

/// Asynchronous get/set/update/remove over a path-addressed JSON tree.
///
/// Implementations must treat `set` as a full replace of the subtree at
/// `path`, and a `null` value (in `set` or inside an `update`) as removal.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Value at `path`, or `None` when nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Replace the subtree at `path`.
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Write each field of `partial` beneath `path`, leaving other fields alone.
    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<()>;

    /// Delete the subtree at `path`.
    async fn remove(&self, path: &str) -> Result<()>;
}

/// Reads and decodes the graph stored at `path`.
pub async fn read_graph(store: &dyn GraphStore, path: &str) -> Result<Option<Graph>> {
    match store.get(path).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Writes `graph` at `path`, replacing whatever was there.
pub async fn write_graph(store: &dyn GraphStore, path: &str, graph: &Graph) -> Result<()> {
    store.set(path, serde_json::to_value(graph)?).await
}
