//! Exporters: Graphviz DOT and plain relationship triples.
//!
//! DOT output groups nodes of equal level into one rank so the drawing reads
//! top-down from the roots. Hidden nodes are drawn dashed.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use storymap_core::types::Graph;

/// A `(source, link, target)` relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub source: String,
    pub link: String,
    pub target: String,
}

/// Every link as a triple, in graph order.
pub fn export_triples(graph: &Graph) -> Vec<Triple> {
    graph
        .links
        .iter()
        .map(|l| Triple {
            source: l.source_id().to_string(),
            link: l.link.clone(),
            target: l.target_id().to_string(),
        })
        .collect()
}

/// One tab-separated triple per line.
pub fn triples_to_tsv(triples: &[Triple]) -> String {
    let mut out = String::new();
    for t in triples {
        let _ = writeln!(out, "{}\t{}\t{}", t.source, t.link, t.target);
    }
    out
}

/// Renders `graph` as a Graphviz digraph.
pub fn export_dot(graph: &Graph, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", quote(name));
    let _ = writeln!(out, "    rankdir=TB;");
    let _ = writeln!(out, "    node [shape=ellipse];");

    let mut ranks: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for node in &graph.nodes {
        let mut attrs = Vec::new();
        if let Some(level) = node.level {
            attrs.push(format!("level={}", level));
            if !node.hidden {
                ranks.entry(level).or_default().push(&node.id);
            }
        }
        if node.hidden {
            attrs.push("style=dashed".to_string());
        }
        if !node.text.is_empty() {
            attrs.push(format!("tooltip={}", quote(&node.text)));
        }
        if attrs.is_empty() {
            let _ = writeln!(out, "    {};", quote(&node.id));
        } else {
            let _ = writeln!(out, "    {} [{}];", quote(&node.id), attrs.join(", "));
        }
    }

    for ids in ranks.values() {
        let members: Vec<String> = ids.iter().map(|id| quote(id)).collect();
        let _ = writeln!(out, "    {{ rank=same; {}; }}", members.join("; "));
    }

    for link in &graph.links {
        let _ = write!(out, "    {} -> {}", quote(link.source_id()), quote(link.target_id()));
        if link.link.is_empty() {
            let _ = writeln!(out, ";");
        } else {
            let _ = writeln!(out, " [label={}];", quote(&link.link));
        }
    }

    out.push_str("}\n");
    out
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storymap_core::levels::assign_levels;
    use storymap_core::types::{Link, Node};

    fn story() -> Graph {
        Graph::new(
            vec![
                Node::new("Ada").with_text("the hero"),
                Node::new("Bram"),
                Node::new("Cato"),
            ],
            vec![
                Link::new("Ada", "Bram", "mentor of"),
                Link::new("Ada", "Cato", ""),
            ],
        )
    }

    #[test]
    fn triples_follow_link_order() {
        let triples = export_triples(&story());
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].link, "mentor of");
        assert_eq!(triples_to_tsv(&triples), "Ada\tmentor of\tBram\nAda\t\tCato\n");
    }

    #[test]
    fn dot_ranks_by_level() {
        let leveled = assign_levels(&story()).graph;
        let dot = export_dot(&leveled, "story");
        assert!(dot.starts_with("digraph \"story\" {"));
        assert!(dot.contains("{ rank=same; \"Bram\"; \"Cato\"; }"));
        assert!(dot.contains("\"Ada\" -> \"Bram\" [label=\"mentor of\"];"));
        assert!(dot.contains("\"Ada\" -> \"Cato\";"));
        assert!(dot.contains("tooltip=\"the hero\""));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn hidden_nodes_are_dashed() {
        let mut g = story();
        g.nodes[2].hidden = true;
        let dot = export_dot(&g, "story");
        assert!(dot.contains("\"Cato\" [style=dashed];"));
    }

    #[test]
    fn quotes_are_escaped() {
        let g = Graph::new(vec![Node::new("The \"Boss\"")], vec![]);
        assert!(export_dot(&g, "s").contains("\"The \\\"Boss\\\"\";"));
    }
}
