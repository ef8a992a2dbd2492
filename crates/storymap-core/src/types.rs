//! Shared types for story graphs: nodes, relationship links, and endpoints.
//!
//! Graphs arrive from the store in whatever shape was last written there, so
//! deserialization is deliberately lenient: collections may be lists with
//! `null` holes or keyed maps, link endpoints may be bare ids or embedded
//! node objects, and missing or `null` annotation text becomes `""`. Entries
//! that still fail to decode are skipped one at a time; the rest of the graph
//! loads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Node size used for rendering when no base size is configured.
pub const DEFAULT_BASE_NODE_SIZE: f64 = 10.0;

/// A story entity in the relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Breadth-first depth from the nearest root, starting at 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Free-form notes the author attached to this entity.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hidden: bool,
    /// Fields written by other tools, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: None,
            text: String::new(),
            hidden: false,
            extra: Map::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }
}

/// A node object embedded in a link endpoint instead of a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedNode {
    pub id: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One end of a link, as stored.
///
/// Renderers denormalize links by replacing ids with the node objects
/// themselves, and those objects sometimes get written back. Both forms
/// refer to the same node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Id(String),
    Embedded(EmbeddedNode),
}

impl Endpoint {
    pub fn id(&self) -> &str {
        normalize_endpoint(self)
    }

    /// Returns the bare-id form of this endpoint.
    pub fn normalized(&self) -> Endpoint {
        Endpoint::Id(self.id().to_string())
    }
}

impl From<&str> for Endpoint {
    fn from(id: &str) -> Self {
        Endpoint::Id(id.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(id: String) -> Self {
        Endpoint::Id(id)
    }
}

/// Resolves either endpoint representation to the referenced node id.
pub fn normalize_endpoint(endpoint: &Endpoint) -> &str {
    match endpoint {
        Endpoint::Id(id) => id,
        Endpoint::Embedded(node) => &node.id,
    }
}

/// A labeled, directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: Endpoint,
    pub target: Endpoint,
    /// Relationship label, e.g. "ally of". May be empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            source: Endpoint::Id(source.into()),
            target: Endpoint::Id(target.into()),
            link: link.into(),
        }
    }

    pub fn source_id(&self) -> &str {
        self.source.id()
    }

    pub fn target_id(&self) -> &str {
        self.target.id()
    }

    /// Copy of this link with both endpoints reduced to bare ids.
    pub fn normalized(&self) -> Link {
        Link {
            source: self.source.normalized(),
            target: self.target.normalized(),
            link: self.link.clone(),
        }
    }

    /// True when `self` and `other` connect the same two nodes in opposite directions.
    pub fn reverses(&self, other: &Link) -> bool {
        self.source_id() == other.target_id() && self.target_id() == other.source_id()
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source_id() == id || self.target_id() == id
    }
}

/// A snapshot of a story graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredGraph")]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    /// Stored link entries that were not links at all (no endpoint, a
    /// non-string id). Never serialized.
    #[serde(skip)]
    pub undecodable_links: usize,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self {
            nodes,
            links,
            undecodable_links: 0,
        }
    }

    /// The two-node graph shown before any story data has been loaded.
    pub fn placeholder() -> Self {
        Self {
            nodes: vec![
                Node::new("Unknown1").with_level(1),
                Node::new("Unknown2").with_level(1),
            ],
            links: vec![Link::new("Unknown1", "Unknown2", "Unknown")],
            undecodable_links: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Rendered radius for a node at `level`: deeper nodes draw smaller.
pub fn node_size(level: u32, base: f64) -> f64 {
    base / f64::from(level.max(1))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Graph as it sits in the store, before each entry is decoded.
#[derive(Deserialize)]
struct StoredGraph {
    #[serde(default)]
    nodes: Value,
    #[serde(default)]
    links: Value,
}

impl From<StoredGraph> for Graph {
    fn from(stored: StoredGraph) -> Self {
        let (nodes, _) = collection(stored.nodes);
        let (links, undecodable_links) = collection(stored.links);
        Self {
            nodes,
            links,
            undecodable_links,
        }
    }
}

/// Decodes a list (with `null` holes) or a keyed map entry by entry. Keyed
/// entries come out in numeric key order when the keys are numbers, lexical
/// order otherwise. Returns the decoded items and how many non-null entries
/// failed to decode.
fn collection<T: DeserializeOwned>(value: Value) -> (Vec<T>, usize) {
    let entries: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            let mut keyed: Vec<(String, Value)> = map.into_iter().collect();
            keyed.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                (Err(_), Err(_)) => a.cmp(b),
            });
            keyed.into_iter().map(|(_, item)| item).collect()
        }
        _ => Vec::new(),
    };

    let mut items = Vec::with_capacity(entries.len());
    let mut failed = 0;
    for entry in entries {
        if entry.is_null() {
            continue;
        }
        match serde_json::from_value(entry) {
            Ok(item) => items.push(item),
            Err(_) => failed += 1,
        }
    }
    (items, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_accepts_both_shapes() {
        let link: Link = serde_json::from_value(json!({
            "source": {"id": "A", "level": 1, "x": 12.5},
            "target": "B",
            "link": "ally of"
        }))
        .unwrap();
        assert_eq!(link.source_id(), "A");
        assert_eq!(link.target_id(), "B");
        assert_eq!(link.normalized().source, Endpoint::Id("A".into()));
    }

    #[test]
    fn node_defaults_missing_and_null_text() {
        let graph: Graph = serde_json::from_value(json!({
            "nodes": [{"id": "A"}, {"id": "B", "text": null, "hidden": null}],
        }))
        .unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.nodes.iter().all(|n| n.text.is_empty() && !n.hidden));
        assert!(graph.links.is_empty());
    }

    #[test]
    fn node_keeps_unknown_fields() {
        let node: Node = serde_json::from_value(json!({"id": "A", "color": "red"})).unwrap();
        assert_eq!(node.extra.get("color"), Some(&json!("red")));
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["color"], json!("red"));
    }

    #[test]
    fn keyed_and_sparse_collections() {
        let graph: Graph = serde_json::from_value(json!({
            "nodes": {"10": {"id": "K"}, "2": {"id": "B"}, "0": {"id": "A"}},
            "links": [null, {"source": "A", "target": "B"}],
        }))
        .unwrap();
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "K"]);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].link, "");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let graph: Graph = serde_json::from_value(json!({
            "nodes": [{"id": "A"}, {"id": 7}, {"id": "B"}],
            "links": [
                {"source": "A", "target": "B"},
                {"target": "B", "link": "half-edited"},
                {"source": {"name": "no id"}, "target": "A"},
            ],
        }))
        .unwrap();
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.undecodable_links, 2);
    }

    #[test]
    fn undecodable_count_is_not_serialized() {
        let graph: Graph = serde_json::from_value(json!({"links": [{"link": "x"}]})).unwrap();
        assert_eq!(graph.undecodable_links, 1);
        assert_eq!(serde_json::to_value(&graph).unwrap(), json!({"nodes": [], "links": []}));
    }

    #[test]
    fn node_size_shrinks_with_depth() {
        assert_eq!(node_size(1, DEFAULT_BASE_NODE_SIZE), 10.0);
        assert_eq!(node_size(4, DEFAULT_BASE_NODE_SIZE), 2.5);
        assert_eq!(node_size(0, DEFAULT_BASE_NODE_SIZE), 10.0);
    }
}
