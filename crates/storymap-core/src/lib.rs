//! # Storymap Core
//!
//! Types and graph algorithms for story maps: directed graphs of story
//! entities joined by labeled relationships.
//!
//! - **Level assignment** ([`levels`]): breadth-first depth per node,
//!   bidirectional pairs collapsed, dangling links dropped, unreachable
//!   nodes reported as hidden.
//! - **Neighborhood view** ([`neighborhood`]): the one-hop induced subgraph
//!   around a selected node, for focused display.
//!
//! Both are pure functions over an immutable snapshot.
//!
//! ## Quick Start
//!
//! ```rust
//! use storymap_core::prelude::*;
//!
//! let graph = Graph::new(
//!     vec![Node::new("A"), Node::new("B"), Node::new("C")],
//!     vec![Link::new("A", "B", "knows"), Link::new("B", "C", "knows")],
//! );
//!
//! let leveled = assign_levels(&graph);
//! assert_eq!(leveled.level_of("C"), Some(3));
//!
//! let view = reduce_to_neighborhood(&leveled.graph, "B");
//! assert_eq!(view.nodes.len(), 3);
//! ```

pub mod types;
pub mod error;
pub mod path;
pub mod roots;
pub mod levels;
pub mod neighborhood;
pub mod prelude;
