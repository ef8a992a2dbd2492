//! Storymap Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use storymap_core::prelude::*;
//! ```

pub use crate::types::{
    Node, Link, Endpoint, EmbeddedNode, Graph,
    normalize_endpoint, node_size, DEFAULT_BASE_NODE_SIZE,
};

pub use crate::levels::{assign_levels, assign_levels_with, LevelAssignment};
pub use crate::neighborhood::reduce_to_neighborhood;
pub use crate::roots::RootPolicy;
pub use crate::path::graph_path;

pub use crate::error::{StoryMapError, GraphError, StoreError, ConfigError, Result};
