//! Storymap CLI - level and explore story relationship graphs.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "storymap")]
#[command(author, version, about = "Storymap - leveled story relationship graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Story owner (overrides story.user from storymap.toml)
    #[arg(short, long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Storymap project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Replace the story graph with a JSON graph or snapshot file
    Import {
        /// Graph file ({"nodes": [...], "links": [...]}) or exported snapshot
        file: String,
    },

    /// Assign levels and print nodes by depth
    Levels,

    /// Show the one-hop neighborhood of a node
    Focus {
        /// Node id
        id: String,
    },

    /// Set the notes attached to a node
    Annotate {
        /// Node id
        id: String,
        /// Notes text
        text: String,
    },

    /// Edit stored links
    Links {
        #[command(subcommand)]
        command: LinkCommands,
    },

    /// Export the leveled story graph
    Export {
        /// Output file path
        output: String,

        /// Export format: json, dot, or triples
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Show story graph statistics
    Stats,
}

#[derive(Subcommand)]
enum LinkCommands {
    /// List stored links with their indices
    List,

    /// Append a link
    Add {
        /// Source node id
        source: String,
        /// Relationship label
        link: String,
        /// Target node id
        target: String,
    },

    /// Remove the link at an index (as shown by `links list`)
    Remove {
        index: usize,
    },

    /// Replace all links with rows from a JSON file
    Set {
        /// File holding [{"source", "link", "target"}, ...]
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    if let Commands::Init { path } = cli.command {
        return commands::init::run(path);
    }

    let config = Config::load()?;
    let user = cli.user.as_deref();

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Import { file } => commands::import::run(&config, user, &file).await,
        Commands::Levels => commands::levels::run(&config, user).await,
        Commands::Focus { id } => commands::focus::run(&config, user, &id).await,
        Commands::Annotate { id, text } => {
            commands::annotate::run(&config, user, &id, &text).await
        }
        Commands::Links { command } => match command {
            LinkCommands::List => commands::links::list(&config, user).await,
            LinkCommands::Add { source, link, target } => {
                commands::links::add(&config, user, &source, &link, &target).await
            }
            LinkCommands::Remove { index } => commands::links::remove(&config, user, index).await,
            LinkCommands::Set { file } => commands::links::set(&config, user, &file).await,
        },
        Commands::Export { output, format } => {
            commands::export::run(&config, user, &output, &format).await
        }
        Commands::Stats => commands::stats::run(&config, user).await,
    }
}
