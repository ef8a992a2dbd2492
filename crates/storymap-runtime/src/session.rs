//! Snapshot files: save/load a story graph outside the store.
//!
//! A snapshot is pretty-printed JSON holding the graph and a small metadata
//! block. Import also accepts a bare `{nodes, links}` document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use storymap_core::error::Result;
use storymap_core::types::Graph;

/// Serializable story graph plus where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub graph: Graph,
    pub metadata: SnapshotMetadata,
}

/// Snapshot metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub snapshot_id: String,
    pub user: String,
    pub node_count: usize,
    pub link_count: usize,
    #[serde(default)]
    pub hidden_count: usize,
}

/// Save `graph` to a JSON snapshot at `path`, creating parent directories.
pub fn save_snapshot(graph: &Graph, user: &str, path: &Path) -> Result<SnapshotMetadata> {
    let metadata = SnapshotMetadata {
        snapshot_id: uuid::Uuid::new_v4().to_string(),
        user: user.to_string(),
        node_count: graph.nodes.len(),
        link_count: graph.links.len(),
        hidden_count: graph.nodes.iter().filter(|n| n.hidden).count(),
    };
    let snapshot = Snapshot {
        graph: graph.clone(),
        metadata: metadata.clone(),
    };

    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(metadata)
}

/// Load a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Load a graph from either a snapshot or a bare graph document.
pub fn load_graph_file(path: &Path) -> Result<Graph> {
    let json = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&json)?;
    if value.get("graph").is_some() && value.get("metadata").is_some() {
        let snapshot: Snapshot = serde_json::from_value(value)?;
        return Ok(snapshot.graph);
    }
    Ok(serde_json::from_value(value)?)
}
