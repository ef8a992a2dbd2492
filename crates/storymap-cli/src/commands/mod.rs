//! CLI command implementations.

pub mod init;
pub mod import;
pub mod levels;
pub mod focus;
pub mod annotate;
pub mod links;
pub mod export;
pub mod stats;

use anyhow::{bail, Result};
use colored::Colorize;
use storymap_runtime::story_map::{LevelSummary, RefreshOutcome, StoryMap};

use crate::config::Config;

/// Story map for the configured (or overridden) user.
pub fn open_map(config: &Config, user: Option<&str>) -> Result<StoryMap> {
    let user = config.user(user)?;
    let store = config.open_store()?;
    Ok(StoryMap::new(store, user)
        .with_policy(config.levels.policy)
        .with_base_node_size(config.display.base_node_size))
}

/// Refresh `map`, failing when the user has no stored graph.
pub async fn refresh(map: &mut StoryMap) -> Result<LevelSummary> {
    match map.refresh().await? {
        RefreshOutcome::Leveled(summary) => Ok(summary),
        RefreshOutcome::NoData => bail!(
            "No story graph for user '{}'. Run {} first.",
            map.user(),
            "storymap import <file>".cyan()
        ),
    }
}
