//! Show the neighborhood of one node.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;

pub async fn run(config: &Config, user: Option<&str>, id: &str) -> Result<()> {
    let mut map = super::open_map(config, user)?;
    super::refresh(&mut map).await?;
    let view = map.focus(id)?;

    println!("{} {}", "Neighborhood of".white().bold(), id.cyan().bold());
    println!("{}", "═".repeat(40).dimmed());

    for link in &view.links {
        let label = if link.link.is_empty() { "-" } else { link.link.as_str() };
        if link.source_id() == id {
            println!("  {} {} {}", "→".blue(), label.dimmed(), link.target_id());
        } else if link.target_id() == id {
            println!("  {} {} {}", "←".blue(), label.dimmed(), link.source_id());
        } else {
            println!(
                "  {} {} {} {}",
                "·".dimmed(),
                link.source_id(),
                label.dimmed(),
                link.target_id()
            );
        }
    }

    let neighbors = view.nodes.len().saturating_sub(1);
    println!();
    println!("  {} neighbors", neighbors.to_string().cyan());
    if let Some(node) = view.node(id) {
        if !node.text.is_empty() {
            println!("  Notes: {}", node.text);
        }
    }
    Ok(())
}
