//! # Storymap Runtime
//!
//! Stores, the story map controller, and file formats.
//!
//! The runtime is where I/O happens: graphs are read from and written to a
//! path-addressed [`store::GraphStore`], leveled by the pure algorithms in
//! `storymap-core`, and handed to renderers through [`story_map::StoryMap`].

pub mod store;
pub mod memory_store;
pub mod sqlite_store;
pub mod story_map;
pub mod links;
pub mod session;
pub mod export;
pub mod stats;
pub mod prelude;
