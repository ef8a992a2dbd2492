//! Assign levels and print the story graph by depth.

use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;

use crate::config::Config;

pub async fn run(config: &Config, user: Option<&str>) -> Result<()> {
    let mut map = super::open_map(config, user)?;
    println!("{} Leveling {}...", "→".blue(), map.graph_path());
    let summary = super::refresh(&mut map).await?;

    let graph = map.display();
    let mut by_level: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for node in &graph.nodes {
        by_level.entry(node.level.unwrap_or(1)).or_default().push(&node.id);
    }

    println!();
    for (level, ids) in &by_level {
        println!(
            "{} {} {}",
            format!("Level {}", level).blue().bold(),
            format!("(size {:.1})", map.node_size(*level)).dimmed(),
            ids.join(", ")
        );
    }
    if by_level.is_empty() {
        println!("  {} No reachable nodes", "•".yellow());
    }

    println!();
    println!(
        "  Nodes: {}  Links: {}  Roots: {}",
        summary.nodes.to_string().cyan(),
        summary.links.to_string().cyan(),
        summary.roots.join(", ").cyan()
    );
    if summary.dropped_links > 0 {
        println!(
            "  {} Dropped {} links with missing endpoints",
            "•".yellow(),
            summary.dropped_links
        );
    }
    if summary.collapsed_pairs > 0 {
        println!(
            "  {} Collapsed {} bidirectional pairs",
            "•".yellow(),
            summary.collapsed_pairs
        );
    }
    if let Some(leveled) = map.leveled() {
        if !leveled.hidden.is_empty() {
            let hidden: Vec<&str> = leveled.hidden.iter().map(|n| n.id.as_str()).collect();
            println!(
                "  {} Hidden (unreachable): {}",
                "•".yellow(),
                hidden.join(", ").dimmed()
            );
        }
    }

    println!();
    println!("{} Levels saved", "✓".green());
    Ok(())
}
