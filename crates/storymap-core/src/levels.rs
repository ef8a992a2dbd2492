//! Level assignment: breadth-first depth for every node of a story graph.
//!
//! A pass runs in four steps over an immutable input snapshot:
//!
//! 1. **Sanitize**: drop links whose endpoints are not nodes.
//! 2. **Collapse**: for each A→B whose reverse B→A is still present, keep the
//!    earlier link, drop the reverse, and promote A to a root candidate.
//! 3. **Seed**: roots are nodes never targeted by a surviving link, the
//!    promoted pair sources, and whatever the [`RootPolicy`] adds.
//! 4. **BFS**: levels start at 1 on the roots; the links followed into
//!    not-yet-visited nodes form the leveled link set.
//!
//! Nodes no root reaches are reported separately as hidden.

use crate::roots::{cycle_entries, RootPolicy};
use crate::types::{Graph, Link, Node};
use std::collections::{HashMap, HashSet, VecDeque};

/// Result of a level-assignment pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelAssignment {
    /// Reachable nodes with their levels, and the links BFS followed.
    pub graph: Graph,
    /// Unreachable nodes, stored data plus `hidden: true`.
    pub hidden: Vec<Node>,
    /// Sanitized links with at least one hidden endpoint.
    pub hidden_links: Vec<Link>,
    /// Root ids in seeding order.
    pub roots: Vec<String>,
    /// Links discarded because an endpoint was missing or undecodable.
    pub dropped_links: usize,
    /// Bidirectional pairs collapsed to one link.
    pub collapsed_pairs: usize,
}

impl LevelAssignment {
    /// True when nothing was reachable; callers show a "no data" state.
    pub fn is_empty(&self) -> bool {
        self.graph.nodes.is_empty()
    }

    pub fn level_of(&self, id: &str) -> Option<u32> {
        self.graph.node(id).and_then(|n| n.level)
    }

    pub fn max_level(&self) -> u32 {
        self.graph.nodes.iter().filter_map(|n| n.level).max().unwrap_or(0)
    }

    /// The snapshot written back to the store: every node (hidden ones
    /// flagged) and the leveled links plus the links around hidden nodes,
    /// so unreachable relationships survive until something reaches them.
    pub fn persisted(&self) -> Graph {
        let mut nodes = self.graph.nodes.clone();
        nodes.extend(self.hidden.iter().cloned());
        let mut links = self.graph.links.clone();
        links.extend(self.hidden_links.iter().cloned());
        Graph::new(nodes, links)
    }
}

/// Assigns levels using the default [`RootPolicy`].
pub fn assign_levels(graph: &Graph) -> LevelAssignment {
    assign_levels_with(graph, RootPolicy::default())
}

pub fn assign_levels_with(graph: &Graph, policy: RootPolicy) -> LevelAssignment {
    let mut node_ids: Vec<&str> = Vec::with_capacity(graph.nodes.len());
    let mut known: HashSet<&str> = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if known.insert(node.id.as_str()) {
            node_ids.push(node.id.as_str());
        }
    }

    let sanitized: Vec<Link> = graph
        .links
        .iter()
        .filter(|l| known.contains(l.source_id()) && known.contains(l.target_id()))
        .map(Link::normalized)
        .collect();
    let dropped_links = graph.links.len() - sanitized.len() + graph.undecodable_links;

    let (working, promoted, collapsed_pairs) = collapse_pairs(sanitized);

    let targets: HashSet<&str> = working.iter().map(Link::target_id).collect();
    let mut candidates: HashSet<String> = promoted;
    for id in &node_ids {
        if !targets.contains(id) {
            candidates.insert(id.to_string());
        }
    }
    if policy == RootPolicy::Condensation {
        let entries = cycle_entries(&node_ids, &working, &candidates);
        candidates.extend(entries);
    }
    let roots: Vec<String> = node_ids
        .iter()
        .filter(|id| candidates.contains(**id))
        .map(|id| id.to_string())
        .collect();

    let mut outgoing: HashMap<&str, Vec<&Link>> = HashMap::new();
    for link in &working {
        outgoing.entry(link.source_id()).or_default().push(link);
    }

    let mut levels: HashMap<&str, u32> = HashMap::new();
    let mut queue: VecDeque<(&str, u32)> = roots.iter().map(|id| (id.as_str(), 1)).collect();
    let mut seen_links: HashSet<(&str, &str)> = HashSet::new();
    let mut links: Vec<Link> = Vec::new();

    while let Some((id, level)) = queue.pop_front() {
        // FIFO order: the first dequeue of a node carries its smallest level,
        // and a later expansion could only find links already collected.
        if levels.contains_key(id) {
            continue;
        }
        levels.insert(id, level);

        let children: Vec<&Link> = outgoing
            .get(id)
            .map(|out| {
                out.iter()
                    .copied()
                    .filter(|l| !levels.contains_key(l.target_id()))
                    .collect()
            })
            .unwrap_or_default();

        for child in children {
            queue.push_back((child.target_id(), level + 1));
            if seen_links.insert((child.source_id(), child.target_id())) {
                links.push(child.clone());
            }
        }
    }

    let mut nodes = Vec::with_capacity(levels.len());
    let mut hidden = Vec::new();
    let mut emitted: HashSet<&str> = HashSet::new();
    for node in &graph.nodes {
        if !emitted.insert(node.id.as_str()) {
            continue;
        }
        match levels.get(node.id.as_str()) {
            Some(&level) => nodes.push(Node {
                level: Some(level),
                hidden: false,
                ..node.clone()
            }),
            None => hidden.push(Node {
                hidden: true,
                ..node.clone()
            }),
        }
    }

    let hidden_ids: HashSet<&str> = hidden.iter().map(|n| n.id.as_str()).collect();
    let hidden_links: Vec<Link> = working
        .iter()
        .filter(|l| hidden_ids.contains(l.source_id()) || hidden_ids.contains(l.target_id()))
        .cloned()
        .collect();

    LevelAssignment {
        graph: Graph::new(nodes, links),
        hidden,
        hidden_links,
        roots,
        dropped_links,
        collapsed_pairs,
    }
}

/// Collapses A→B / B→A pairs, keeping the earlier link.
///
/// Returns the surviving links in input order, the promoted pair sources,
/// and the number of pairs collapsed. A self-loop is its own reverse: its
/// node is promoted and the link survives.
fn collapse_pairs(links: Vec<Link>) -> (Vec<Link>, HashSet<String>, usize) {
    let mut removed = vec![false; links.len()];
    let mut promoted = HashSet::new();
    let mut collapsed = 0;

    for i in 0..links.len() {
        if removed[i] {
            continue;
        }
        let link = &links[i];
        if link.source_id() == link.target_id() {
            promoted.insert(link.source_id().to_string());
            continue;
        }
        let reverse = (i + 1..links.len()).find(|&j| !removed[j] && links[j].reverses(link));
        if let Some(j) = reverse {
            removed[j] = true;
            promoted.insert(link.source_id().to_string());
            collapsed += 1;
        }
    }

    let surviving = links
        .into_iter()
        .zip(removed)
        .filter_map(|(link, gone)| (!gone).then_some(link))
        .collect();
    (surviving, promoted, collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(ids: &[&str], links: &[(&str, &str)]) -> Graph {
        Graph::new(
            ids.iter().map(|id| Node::new(*id)).collect(),
            links.iter().map(|(s, t)| Link::new(*s, *t, "knows")).collect(),
        )
    }

    fn pairs(links: &[Link]) -> Vec<(String, String)> {
        links
            .iter()
            .map(|l| (l.source_id().to_string(), l.target_id().to_string()))
            .collect()
    }

    #[test]
    fn chain_levels() {
        let result = assign_levels(&graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]));
        assert_eq!(result.level_of("A"), Some(1));
        assert_eq!(result.level_of("B"), Some(2));
        assert_eq!(result.level_of("C"), Some(3));
        assert!(result.hidden.is_empty());
        assert_eq!(result.graph.links.len(), 2);
        assert!(result.graph.nodes.iter().all(|n| n.text.is_empty() && !n.hidden));
    }

    #[test]
    fn isolated_node_is_its_own_root() {
        let result = assign_levels(&graph(&["A", "B", "D"], &[("A", "B")]));
        assert_eq!(result.level_of("D"), Some(1));
        assert_eq!(result.roots, vec!["A".to_string(), "D".to_string()]);
    }

    #[test]
    fn dangling_link_is_dropped() {
        let result = assign_levels(&graph(&["A", "B"], &[("A", "Z"), ("A", "B")]));
        assert_eq!(result.dropped_links, 1);
        assert!(result.graph.node("Z").is_none());
        assert_eq!(pairs(&result.graph.links), vec![("A".into(), "B".into())]);
    }

    #[test]
    fn undecodable_link_counts_as_dropped() {
        let stored: Graph = serde_json::from_value(serde_json::json!({
            "nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
            "links": [
                {"source": "A", "target": "B"},
                {"target": "C", "link": "half-edited"},
            ],
        }))
        .unwrap();
        let result = assign_levels(&stored);
        assert_eq!(result.dropped_links, 1);
        assert_eq!(result.level_of("B"), Some(2));
        assert_eq!(result.level_of("C"), Some(1));
        assert_eq!(pairs(&result.graph.links), vec![("A".into(), "B".into())]);
    }

    #[test]
    fn bidirectional_pair_collapses() {
        let result = assign_levels(&graph(&["A", "B"], &[("A", "B"), ("B", "A")]));
        assert_eq!(result.collapsed_pairs, 1);
        assert_eq!(pairs(&result.graph.links), vec![("A".into(), "B".into())]);
        assert_eq!(result.level_of("A"), Some(1));
        assert_eq!(result.level_of("B"), Some(2));
        assert!(result.roots.contains(&"A".to_string()));
    }

    #[test]
    fn pure_cycle_is_hidden_under_sources_only() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let result = assign_levels_with(&g, RootPolicy::SourcesOnly);
        assert!(result.is_empty());
        assert_eq!(result.hidden.len(), 3);
        assert!(result.hidden.iter().all(|n| n.hidden));
        assert_eq!(result.hidden_links.len(), 3);
    }

    #[test]
    fn pure_cycle_gets_entry_under_condensation() {
        let g = graph(&["B", "C", "A"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let result = assign_levels(&g);
        assert_eq!(result.roots, vec!["A".to_string()]);
        assert_eq!(result.level_of("A"), Some(1));
        assert_eq!(result.level_of("B"), Some(2));
        assert_eq!(result.level_of("C"), Some(3));
        assert!(result.hidden.is_empty());
        // C→A points back at an already-visited node and is not followed.
        assert_eq!(result.graph.links.len(), 2);
    }

    #[test]
    fn shortest_path_wins_over_discovery_order() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")],
        );
        let result = assign_levels(&g);
        assert_eq!(result.level_of("D"), Some(2));
    }

    #[test]
    fn parallel_links_are_deduplicated() {
        let result = assign_levels(&graph(&["A", "B"], &[("A", "B"), ("A", "B")]));
        assert_eq!(result.graph.links.len(), 1);
    }

    #[test]
    fn self_loop_promotes_its_node() {
        let result = assign_levels(&graph(&["A", "B"], &[("A", "A"), ("A", "B")]));
        assert_eq!(result.level_of("A"), Some(1));
        assert_eq!(result.level_of("B"), Some(2));
        assert_eq!(pairs(&result.graph.links), vec![("A".into(), "B".into())]);
    }

    #[test]
    fn text_and_extra_fields_are_kept() {
        let mut g = graph(&["A"], &[]);
        g.nodes[0].text = "the hero".into();
        g.nodes[0].extra.insert("color".into(), serde_json::json!("gold"));
        let result = assign_levels(&g);
        let a = result.graph.node("A").unwrap();
        assert_eq!(a.text, "the hero");
        assert_eq!(a.extra.get("color"), Some(&serde_json::json!("gold")));
    }

    #[test]
    fn persisted_snapshot_keeps_hidden_nodes() {
        let g = graph(&["R", "X", "Y"], &[("X", "Y"), ("Y", "X")]);
        // Under sources-only the pair still promotes X, so everything is reachable.
        let result = assign_levels_with(&g, RootPolicy::SourcesOnly);
        assert!(result.hidden.is_empty());

        let g = graph(&["R", "X", "Y", "Z"], &[("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        let result = assign_levels_with(&g, RootPolicy::SourcesOnly);
        let persisted = result.persisted();
        assert_eq!(persisted.nodes.len(), 4);
        assert_eq!(persisted.nodes.iter().filter(|n| n.hidden).count(), 3);
        assert_eq!(persisted.links.len(), 3);
    }

    #[test]
    fn rerun_on_persisted_output_is_stable() {
        let g = graph(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "C"), ("A", "C"), ("D", "E"), ("E", "D"), ("C", "A")],
        );
        for policy in [RootPolicy::Condensation, RootPolicy::SourcesOnly] {
            let first = assign_levels_with(&g, policy);
            let second = assign_levels_with(&first.persisted(), policy);
            assert_eq!(first.graph, second.graph, "policy {}", policy);
            assert_eq!(first.hidden.len(), second.hidden.len());
        }
    }

    #[test]
    fn embedded_endpoints_are_normalized() {
        let g: Graph = serde_json::from_value(serde_json::json!({
            "nodes": [{"id": "A"}, {"id": "B"}],
            "links": [{"source": {"id": "A", "x": 1.0}, "target": {"id": "B"}, "link": "knows"}],
        }))
        .unwrap();
        let result = assign_levels(&g);
        assert_eq!(result.graph.links, vec![Link::new("A", "B", "knows")]);
    }
}
