//! Load a story graph file into the store.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use storymap_core::path::graph_path;
use storymap_runtime::session::load_graph_file;
use storymap_runtime::store::write_graph;

use crate::config::Config;

pub async fn run(config: &Config, user: Option<&str>, file: &str) -> Result<()> {
    let graph = load_graph_file(Path::new(file))
        .with_context(|| format!("Failed to load {}", file))?;

    let path = graph_path(config.user(user)?);
    let store = config.open_store()?;
    write_graph(store.as_ref(), &path, &graph).await?;

    println!(
        "{} Imported {} nodes and {} links into {}",
        "✓".green(),
        graph.nodes.len().to_string().cyan(),
        graph.links.len().to_string().cyan(),
        path
    );
    println!("  Run {} to assign levels.", "storymap levels".cyan());
    Ok(())
}
