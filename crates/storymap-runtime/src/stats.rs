//! Summary numbers for a leveled story graph.

use serde::Serialize;
use std::collections::BTreeMap;
use storymap_core::levels::LevelAssignment;

/// Shape of one leveling pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub link_count: usize,
    pub hidden_count: usize,
    pub root_count: usize,
    pub max_depth: u32,
    /// Number of nodes at each level.
    pub per_level: BTreeMap<u32, usize>,
    pub dropped_links: usize,
    pub collapsed_pairs: usize,
}

pub fn compute(assignment: &LevelAssignment) -> GraphStats {
    let mut per_level = BTreeMap::new();
    for level in assignment.graph.nodes.iter().filter_map(|n| n.level) {
        *per_level.entry(level).or_insert(0) += 1;
    }

    GraphStats {
        node_count: assignment.graph.nodes.len(),
        link_count: assignment.graph.links.len(),
        hidden_count: assignment.hidden.len(),
        root_count: assignment.roots.len(),
        max_depth: assignment.max_level(),
        per_level,
        dropped_links: assignment.dropped_links,
        collapsed_pairs: assignment.collapsed_pairs,
    }
}

/// Mean out-degree over leveled nodes, counting only followed links.
pub fn branching_factor(stats: &GraphStats) -> f64 {
    if stats.node_count == 0 {
        return 0.0;
    }
    stats.link_count as f64 / stats.node_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use storymap_core::levels::assign_levels_with;
    use storymap_core::roots::RootPolicy;
    use storymap_core::types::{Graph, Link, Node};

    #[test]
    fn stats_on_empty_graph() {
        let stats = compute(&LevelAssignment::default());
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.max_depth, 0);
        assert!(stats.per_level.is_empty());
        assert_eq!(branching_factor(&stats), 0.0);
    }

    #[test]
    fn histogram_counts_each_level() {
        let g = Graph::new(
            ["A", "B", "C", "D", "X", "Y"].iter().map(|id| Node::new(*id)).collect(),
            vec![
                Link::new("A", "B", "knows"),
                Link::new("A", "C", "knows"),
                Link::new("C", "D", "knows"),
                Link::new("X", "Y", "knows"),
                Link::new("Y", "X", "knows"),
                Link::new("D", "Q", "knows"),
            ],
        );
        let stats = compute(&assign_levels_with(&g, RootPolicy::SourcesOnly));
        assert_eq!(stats.node_count, 6);
        assert_eq!(stats.root_count, 2);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.per_level.get(&1), Some(&2));
        assert_eq!(stats.per_level.get(&2), Some(&3));
        assert_eq!(stats.per_level.get(&3), Some(&1));
        assert_eq!(stats.dropped_links, 1);
        assert_eq!(stats.collapsed_pairs, 1);
    }
}
