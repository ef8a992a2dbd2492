//! Root selection for level assignment.
//!
//! The basic rule seeds BFS from every node that is never the target of a
//! link. A cycle that nothing outside it points into has no such node, so
//! under that rule alone the whole cycle is unreachable. The condensation
//! policy fixes that by giving each such cycle one deterministic entry.

use crate::error::{Result, StoryMapError};
use crate::types::Link;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// How roots are chosen beyond the "never a target" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// Every strongly connected component with no incoming link from outside
    /// itself and no root yet gets its lexicographically smallest id as root.
    #[default]
    Condensation,
    /// Only never-targeted nodes and bidirectional-pair sources are roots.
    /// Isolated cycles stay unreachable and end up hidden.
    SourcesOnly,
}

impl fmt::Display for RootPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootPolicy::Condensation => write!(f, "condensation"),
            RootPolicy::SourcesOnly => write!(f, "sources-only"),
        }
    }
}

impl FromStr for RootPolicy {
    type Err = StoryMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "condensation" | "scc" => Ok(RootPolicy::Condensation),
            "sources-only" | "sources" => Ok(RootPolicy::SourcesOnly),
            other => Err(StoryMapError::invalid_config(
                "levels.policy",
                other,
                "expected 'condensation' or 'sources-only'",
            )),
        }
    }
}

/// Entry nodes for cycles that no existing candidate can reach into.
///
/// `node_ids` fixes the node order of the result; `links` must already be
/// sanitized (both endpoints present in `node_ids`).
pub(crate) fn cycle_entries(
    node_ids: &[&str],
    links: &[Link],
    candidates: &HashSet<String>,
) -> Vec<String> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for &id in node_ids {
        index.entry(id).or_insert_with(|| graph.add_node(id));
    }
    for link in links {
        if let (Some(&from), Some(&to)) = (index.get(link.source_id()), index.get(link.target_id())) {
            graph.add_edge(from, to, ());
        }
    }

    let components = tarjan_scc(&graph);
    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    for (c, members) in components.iter().enumerate() {
        for &member in members {
            component_of.insert(member, c);
        }
    }

    let mut entered = vec![false; components.len()];
    for edge in graph.raw_edges() {
        let from = component_of[&edge.source()];
        let to = component_of[&edge.target()];
        if from != to {
            entered[to] = true;
        }
    }

    let mut entries: HashSet<&str> = HashSet::new();
    for (c, members) in components.iter().enumerate() {
        if entered[c] || members.iter().any(|m| candidates.contains(graph[*m])) {
            continue;
        }
        if let Some(min) = members.iter().map(|m| graph[*m]).min() {
            entries.insert(min);
        }
    }

    node_ids
        .iter()
        .filter(|id| entries.remove(*id))
        .map(|id| id.to_string())
        .collect()
}
