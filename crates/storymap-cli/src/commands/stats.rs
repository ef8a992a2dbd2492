//! Show story graph statistics.

use anyhow::Result;
use colored::Colorize;
use storymap_runtime::stats::{branching_factor, compute};

use crate::config::Config;

pub async fn run(config: &Config, user: Option<&str>) -> Result<()> {
    let mut map = super::open_map(config, user)?;
    super::refresh(&mut map).await?;
    let Some(leveled) = map.leveled() else {
        return Ok(());
    };
    let stats = compute(leveled);

    println!("{}", "Storymap Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Graph Structure".blue().bold());
    println!("  Leveled nodes:     {}", stats.node_count.to_string().cyan());
    println!("  Followed links:    {}", stats.link_count.to_string().cyan());
    println!("  Hidden nodes:      {}", stats.hidden_count.to_string().cyan());
    println!("  Roots:             {}", stats.root_count.to_string().cyan());
    println!("  Branching factor:  {:.2}", branching_factor(&stats));
    println!();

    println!("{}", "Depth".blue().bold());
    println!("  Max depth:         {}", stats.max_depth.to_string().cyan());
    for (level, count) in &stats.per_level {
        println!(
            "  Level {:<3}         {} {}",
            level,
            count.to_string().cyan(),
            "▪".repeat(*count).dimmed()
        );
    }
    println!();

    println!("{}", "Cleanup".blue().bold());
    println!("  Dropped links:     {}", stats.dropped_links);
    println!("  Collapsed pairs:   {}", stats.collapsed_pairs);

    println!();
    println!("{}", "═".repeat(40).dimmed());
    Ok(())
}
