//! Export the leveled story graph.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use storymap_runtime::export::{export_dot, export_triples, triples_to_tsv};
use storymap_runtime::session::save_snapshot;

use crate::config::Config;

pub async fn run(config: &Config, user: Option<&str>, output: &str, format: &str) -> Result<()> {
    let mut map = super::open_map(config, user)?;
    println!("{} Leveling {}...", "→".blue(), map.graph_path());
    super::refresh(&mut map).await?;

    let Some(leveled) = map.leveled() else {
        bail!("Nothing to export");
    };
    let graph = leveled.persisted();
    let path = Path::new(output);

    match format {
        "json" => {
            let meta = save_snapshot(&graph, map.user(), path)?;
            println!(
                "{} Exported snapshot {} ({} nodes, {} links) to {}",
                "✓".green(),
                meta.snapshot_id.dimmed(),
                meta.node_count,
                meta.link_count,
                output.cyan()
            );
        }
        "dot" => {
            let dot = export_dot(&graph, map.user());
            std::fs::write(path, dot)
                .with_context(|| format!("Failed to write {}", output))?;
            println!("{} Exported DOT graph to {}", "✓".green(), output.cyan());
        }
        "triples" => {
            let triples = export_triples(&graph);
            std::fs::write(path, triples_to_tsv(&triples))
                .with_context(|| format!("Failed to write {}", output))?;
            println!(
                "{} Exported {} triples to {}",
                "✓".green(),
                triples.len(),
                output.cyan()
            );
        }
        other => bail!("Unknown format '{}'. Use json, dot, or triples.", other),
    }
    Ok(())
}
