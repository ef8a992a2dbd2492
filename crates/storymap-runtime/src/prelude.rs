//! Storymap Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use storymap_runtime::prelude::*;
//! ```

// Re-export the core prelude
pub use storymap_core::prelude::*;

// Re-export store trait and backends
pub use crate::store::{GraphStore, read_graph, write_graph};
pub use crate::memory_store::MemoryStore;

#[cfg(feature = "sqlite")]
pub use crate::sqlite_store::SqliteStore;

// Re-export controller
pub use crate::story_map::{StoryMap, RefreshOutcome, LevelSummary};

// Re-export link editing
pub use crate::links::{LinkRow, LinkTable};

// Re-export snapshots, export and stats
pub use crate::session::{Snapshot, SnapshotMetadata, save_snapshot, load_snapshot, load_graph_file};
pub use crate::export::{Triple, export_dot, export_triples, triples_to_tsv};
pub use crate::stats::GraphStats;
