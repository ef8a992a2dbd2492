//! StoryMap: one user's story graph, leveled and focused.
//!
//! The controller owns the only mutable view of the graph. Each refresh:
//! 1. Reads the stored graph at `stories/{user}/graph`
//! 2. Runs level assignment over that snapshot
//! 3. Writes the full result back (hidden nodes included)
//! 4. Replaces the display graph and drops any selection
//!
//! Focusing a node swaps the display graph for its one-hop neighborhood
//! without touching the store.

use crate::links::LinkTable;
use crate::store::{read_graph, write_graph, GraphStore};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use storymap_core::error::{GraphError, Result, StoryMapError};
use storymap_core::levels::{assign_levels_with, LevelAssignment};
use storymap_core::neighborhood::reduce_to_neighborhood;
use storymap_core::path::graph_path;
use storymap_core::roots::RootPolicy;
use storymap_core::types::{node_size, Graph, DEFAULT_BASE_NODE_SIZE};
use tracing::{debug, info, warn};

/// What a refresh found.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Nothing stored for this user yet.
    NoData,
    /// The stored graph was leveled and written back.
    Leveled(LevelSummary),
}

/// Counts from one leveling pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelSummary {
    pub nodes: usize,
    pub links: usize,
    pub hidden: usize,
    pub roots: Vec<String>,
    pub max_level: u32,
    pub dropped_links: usize,
    pub collapsed_pairs: usize,
}

impl From<&LevelAssignment> for LevelSummary {
    fn from(a: &LevelAssignment) -> Self {
        Self {
            nodes: a.graph.nodes.len(),
            links: a.graph.links.len(),
            hidden: a.hidden.len(),
            roots: a.roots.clone(),
            max_level: a.max_level(),
            dropped_links: a.dropped_links,
            collapsed_pairs: a.collapsed_pairs,
        }
    }
}

#[derive(Debug, Clone)]
struct Focus {
    selected: String,
    view: Graph,
}

/// Story graph controller scoped to one user.
pub struct StoryMap {
    store: Arc<dyn GraphStore>,
    user: String,
    policy: RootPolicy,
    base_node_size: f64,
    placeholder: Graph,
    leveled: Option<LevelAssignment>,
    focus: Option<Focus>,
    generation: u64,
}

impl StoryMap {
    pub fn new(store: Arc<dyn GraphStore>, user: impl Into<String>) -> Self {
        Self {
            store,
            user: user.into(),
            policy: RootPolicy::default(),
            base_node_size: DEFAULT_BASE_NODE_SIZE,
            placeholder: Graph::placeholder(),
            leveled: None,
            focus: None,
            generation: 0,
        }
    }

    pub fn with_policy(mut self, policy: RootPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_base_node_size(mut self, base: f64) -> Self {
        self.base_node_size = base;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn policy(&self) -> RootPolicy {
        self.policy
    }

    /// Store path of this user's graph.
    pub fn graph_path(&self) -> String {
        graph_path(&self.user)
    }

    /// Number of completed refreshes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Result of the latest refresh, if any.
    pub fn leveled(&self) -> Option<&LevelAssignment> {
        self.leveled.as_ref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.focus.as_ref().map(|f| f.selected.as_str())
    }

    /// Link editor for this user's stored links.
    pub fn links(&self) -> LinkTable {
        LinkTable::new(Arc::clone(&self.store), &self.graph_path())
    }

    /// Re-level the stored graph and write the result back.
    ///
    /// Taking `&mut self` keeps passes on one map strictly sequential; the
    /// last completed pass is what gets displayed.
    pub async fn refresh(&mut self) -> Result<RefreshOutcome> {
        let path = self.graph_path();
        let Some(graph) = read_graph(self.store.as_ref(), &path).await? else {
            warn!("No graph stored at {}", path);
            return Ok(RefreshOutcome::NoData);
        };

        let assignment = assign_levels_with(&graph, self.policy);
        debug!(
            "Leveled {} nodes from {} roots ({} hidden, {} links dropped, {} pairs collapsed)",
            assignment.graph.nodes.len(),
            assignment.roots.len(),
            assignment.hidden.len(),
            assignment.dropped_links,
            assignment.collapsed_pairs,
        );
        if assignment.is_empty() {
            warn!("No reachable nodes in {}", path);
        }

        write_graph(self.store.as_ref(), &path, &assignment.persisted()).await?;
        info!(
            "Persisted leveled graph to {} ({} nodes, {} hidden)",
            path,
            assignment.graph.nodes.len(),
            assignment.hidden.len()
        );

        let summary = LevelSummary::from(&assignment);
        self.leveled = Some(assignment);
        self.focus = None;
        self.generation += 1;
        Ok(RefreshOutcome::Leveled(summary))
    }

    /// Narrow the display to `id` and its direct neighbors.
    pub fn focus(&mut self, id: &str) -> Result<&Graph> {
        let leveled = self
            .leveled
            .as_ref()
            .filter(|a| a.graph.contains_node(id))
            .ok_or_else(|| StoryMapError::node_not_found(id))?;
        let view = reduce_to_neighborhood(&leveled.graph, id);
        debug!("Focused {} ({} neighbors)", id, view.nodes.len().saturating_sub(1));

        let focus = self.focus.insert(Focus {
            selected: id.to_string(),
            view,
        });
        Ok(&focus.view)
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// The graph to render right now.
    pub fn display(&self) -> &Graph {
        if let Some(focus) = &self.focus {
            return &focus.view;
        }
        match &self.leveled {
            Some(assignment) => &assignment.graph,
            None => &self.placeholder,
        }
    }

    /// Rendered size for a node at `level`.
    pub fn node_size(&self, level: u32) -> f64 {
        node_size(level, self.base_node_size)
    }

    /// Set the notes of the stored node whose id is `id`.
    ///
    /// Only the `text` field of that node is written; the in-memory graphs
    /// pick up the new text without a refresh.
    pub async fn annotate(&mut self, id: &str, text: &str) -> Result<()> {
        let nodes_path = format!("{}/nodes", self.graph_path());
        let nodes = self
            .store
            .get(&nodes_path)
            .await?
            .ok_or_else(|| StoryMapError::Graph(GraphError::NoData(nodes_path.clone())))?;
        let key = stored_key(&nodes, id).ok_or_else(|| StoryMapError::node_not_found(id))?;

        let mut partial = Map::new();
        partial.insert("text".to_string(), Value::String(text.to_string()));
        self.store
            .update(&format!("{}/{}", nodes_path, key), partial)
            .await?;
        info!("Annotated {} at {}/{}", id, nodes_path, key);

        if let Some(assignment) = &mut self.leveled {
            if let Some(node) = assignment.graph.node_mut(id) {
                node.text = text.to_string();
            }
            if let Some(node) = assignment.hidden.iter_mut().find(|n| n.id == id) {
                node.text = text.to_string();
            }
        }
        if let Some(node) = self.focus.as_mut().and_then(|f| f.view.node_mut(id)) {
            node.text = text.to_string();
        }
        Ok(())
    }
}

/// Collection key of the stored node with `id`, for lists and keyed maps.
fn stored_key(nodes: &Value, id: &str) -> Option<String> {
    let has_id = |v: &Value| v.get("id").and_then(Value::as_str) == Some(id);
    match nodes {
        Value::Array(items) => items.iter().position(has_id).map(|i| i.to_string()),
        Value::Object(map) => map
            .iter()
            .find(|(_, v)| has_id(v))
            .map(|(k, _)| k.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use serde_json::json;

    fn map_with(document: Value) -> (Arc<MemoryStore>, StoryMap) {
        let store = Arc::new(MemoryStore::with_document(document));
        let map = StoryMap::new(store.clone(), "u1");
        (store, map)
    }

    fn chain() -> Value {
        json!({"stories": {"u1": {"graph": {
            "nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
            "links": [
                {"source": "A", "target": "B", "link": "knows"},
                {"source": "B", "target": "C", "link": "knows"},
            ],
        }}}})
    }

    #[test]
    fn placeholder_before_first_refresh() {
        let (_, map) = map_with(Value::Null);
        let display = map.display();
        assert_eq!(display.nodes.len(), 2);
        assert_eq!(display.links[0].link, "Unknown");
        assert_eq!(map.generation(), 0);
    }

    #[tokio::test]
    async fn refresh_without_data_reports_no_data() {
        let (_, mut map) = map_with(Value::Null);
        assert_eq!(map.refresh().await.unwrap(), RefreshOutcome::NoData);
        assert_eq!(map.generation(), 0);
        assert_eq!(map.display(), &Graph::placeholder());
    }

    #[tokio::test]
    async fn refresh_levels_and_persists() {
        let (store, mut map) = map_with(chain());
        let RefreshOutcome::Leveled(summary) = map.refresh().await.unwrap() else {
            panic!("expected a leveled graph");
        };
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.max_level, 3);
        assert_eq!(summary.roots, vec!["A".to_string()]);
        assert_eq!(
            store.get("stories/u1/graph/nodes/2/level").await.unwrap(),
            Some(json!(3))
        );
        assert_eq!(map.generation(), 1);
    }

    #[tokio::test]
    async fn focus_validates_and_refresh_clears_it() {
        let (_, mut map) = map_with(chain());
        assert!(map.focus("A").unwrap_err().is_not_found());

        map.refresh().await.unwrap();
        let view = map.focus("A").unwrap();
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(map.selected(), Some("A"));
        assert!(map.focus("Z").is_err());
        assert_eq!(map.selected(), Some("A"));

        map.refresh().await.unwrap();
        assert_eq!(map.selected(), None);
        assert_eq!(map.display().nodes.len(), 3);
    }

    #[tokio::test]
    async fn clear_focus_restores_full_graph() {
        let (_, mut map) = map_with(chain());
        map.refresh().await.unwrap();
        map.focus("C").unwrap();
        assert_eq!(map.display().nodes.len(), 2);
        map.clear_focus();
        assert_eq!(map.display().nodes.len(), 3);
    }

    #[tokio::test]
    async fn annotate_writes_only_text() {
        let (store, mut map) = map_with(chain());
        map.refresh().await.unwrap();
        map.focus("B").unwrap();
        map.annotate("B", "the traitor").await.unwrap();

        assert_eq!(
            store.get("stories/u1/graph/nodes/1").await.unwrap(),
            Some(json!({"id": "B", "level": 2, "text": "the traitor", "hidden": false}))
        );
        assert_eq!(map.display().node("B").unwrap().text, "the traitor");
        map.clear_focus();
        assert_eq!(map.display().node("B").unwrap().text, "the traitor");
    }

    #[tokio::test]
    async fn annotate_finds_keyed_nodes() {
        let (store, mut map) = map_with(json!({"stories": {"u1": {"graph": {
            "nodes": {"-Nx1": {"id": "A"}, "-Nx2": {"id": "B"}},
        }}}}));
        map.annotate("B", "sidekick").await.unwrap();
        assert_eq!(
            store.get("stories/u1/graph/nodes/-Nx2/text").await.unwrap(),
            Some(json!("sidekick"))
        );
        assert!(map.annotate("Z", "nobody").await.unwrap_err().is_not_found());
    }

    #[test]
    fn node_size_uses_configured_base() {
        let (_, map) = map_with(Value::Null);
        let map = map.with_base_node_size(12.0);
        assert_eq!(map.node_size(1), 12.0);
        assert_eq!(map.node_size(3), 4.0);
    }

    #[test]
    fn stored_key_handles_both_shapes() {
        assert_eq!(stored_key(&json!([null, {"id": "B"}]), "B"), Some("1".into()));
        assert_eq!(stored_key(&json!({"k": {"id": "B"}}), "B"), Some("k".into()));
        assert_eq!(stored_key(&json!("B"), "B"), None);
    }
}
