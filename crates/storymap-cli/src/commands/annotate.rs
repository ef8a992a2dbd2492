//! Attach notes to a node.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;

pub async fn run(config: &Config, user: Option<&str>, id: &str, text: &str) -> Result<()> {
    let mut map = super::open_map(config, user)?;
    map.annotate(id, text).await?;
    println!("{} Annotated {}", "✓".green(), id.cyan());
    Ok(())
}
