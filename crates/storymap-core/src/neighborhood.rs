//! One-hop neighborhood view around a selected node.
//!
//! The view is display-only: it is derived from the current leveled graph
//! on selection and thrown away when the selection changes.

use crate::types::{Graph, Link};
use std::collections::HashSet;

/// Induced subgraph on `selected` and every node one link away from it,
/// in either direction.
///
/// `selected` should be a node of `graph`; for an unknown id the result has
/// no nodes.
pub fn reduce_to_neighborhood(graph: &Graph, selected: &str) -> Graph {
    let mut connected: HashSet<&str> = HashSet::new();
    connected.insert(selected);
    for link in &graph.links {
        if link.source_id() == selected {
            connected.insert(link.target_id());
        }
        if link.target_id() == selected {
            connected.insert(link.source_id());
        }
    }

    let nodes = graph
        .nodes
        .iter()
        .filter(|n| connected.contains(n.id.as_str()))
        .cloned()
        .collect();

    let links = graph
        .links
        .iter()
        .filter(|l| connected.contains(l.source_id()) && connected.contains(l.target_id()))
        .map(Link::normalized)
        .collect();

    Graph::new(nodes, links)
}
