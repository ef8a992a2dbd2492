//! Edit the stored relationship list.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use storymap_runtime::links::LinkRow;

use crate::config::Config;

pub async fn list(config: &Config, user: Option<&str>) -> Result<()> {
    let map = super::open_map(config, user)?;
    let rows = map.links().list_links().await?;
    if rows.is_empty() {
        println!("  {} No links stored", "•".yellow());
        return Ok(());
    }
    for (index, row) in rows.iter().enumerate() {
        println!(
            "  {} {} {} {}",
            format!("{:>3}.", index).dimmed(),
            row.source,
            format!("--{}-->", row.link).blue(),
            row.target
        );
    }
    Ok(())
}

pub async fn add(
    config: &Config,
    user: Option<&str>,
    source: &str,
    link: &str,
    target: &str,
) -> Result<()> {
    let map = super::open_map(config, user)?;
    let index = map.links().add_link(LinkRow::new(source, link, target)).await?;
    println!("{} Added link {} at index {}", "✓".green(), link.cyan(), index);
    Ok(())
}

pub async fn remove(config: &Config, user: Option<&str>, index: usize) -> Result<()> {
    let map = super::open_map(config, user)?;
    let row = map.links().remove_link(index).await?;
    println!(
        "{} Removed {} {} {}",
        "✓".green(),
        row.source,
        row.link.cyan(),
        row.target
    );
    Ok(())
}

/// Replace every link with the rows in a JSON file (`[{source, link, target}, ...]`).
pub async fn set(config: &Config, user: Option<&str>, file: &str) -> Result<()> {
    let content = std::fs::read_to_string(Path::new(file))
        .with_context(|| format!("Failed to read {}", file))?;
    let rows: Vec<LinkRow> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse link rows in {}", file))?;

    let map = super::open_map(config, user)?;
    map.links().save_links(&rows).await?;
    println!("{} Saved {} links", "✓".green(), rows.len().to_string().cyan());
    Ok(())
}
