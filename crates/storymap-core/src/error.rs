//! Error types for Storymap operations.
//!
//! The graph algorithms themselves never fail; these errors come from the
//! layers around them (store access, snapshot files, configuration, and
//! caller-supplied ids that do not exist).

use std::error::Error;
use std::fmt;

/// Result type for Storymap operations.
pub type Result<T> = std::result::Result<T, StoryMapError>;

/// Errors that can occur around a story graph.
#[derive(Debug, Clone)]
pub enum StoryMapError {
    /// Graph-related errors.
    Graph(GraphError),
    /// Store access errors.
    Store(StoreError),
    /// Configuration errors.
    Config(ConfigError),
    /// I/O errors (wrapped).
    Io(String),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for StoryMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryMapError::Graph(e) => write!(f, "Graph error: {}", e),
            StoryMapError::Store(e) => write!(f, "Store error: {}", e),
            StoryMapError::Config(e) => write!(f, "Config error: {}", e),
            StoryMapError::Io(msg) => write!(f, "I/O error: {}", msg),
            StoryMapError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for StoryMapError {}

impl From<std::io::Error> for StoryMapError {
    fn from(e: std::io::Error) -> Self {
        StoryMapError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoryMapError {
    fn from(e: serde_json::Error) -> Self {
        StoryMapError::Serialization(e.to_string())
    }
}

impl From<GraphError> for StoryMapError {
    fn from(e: GraphError) -> Self {
        StoryMapError::Graph(e)
    }
}

impl From<StoreError> for StoryMapError {
    fn from(e: StoreError) -> Self {
        StoryMapError::Store(e)
    }
}

/// Graph-related errors.
#[derive(Debug, Clone)]
pub enum GraphError {
    /// Node not found.
    NodeNotFound(String),
    /// Link row with a missing endpoint.
    InvalidLink(String),
    /// Link index out of range.
    LinkNotFound(usize),
    /// No graph stored at the path.
    NoData(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::NodeNotFound(id) => write!(f, "Node not found: {}", id),
            GraphError::InvalidLink(msg) => write!(f, "Invalid link: {}", msg),
            GraphError::LinkNotFound(index) => write!(f, "Link not found at index {}", index),
            GraphError::NoData(path) => write!(f, "No graph data at {}", path),
        }
    }
}

/// Store access errors.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// Path could not be addressed (empty segment, indexing into a scalar).
    InvalidPath(String),
    /// `update` needs an object at both ends.
    NotAnObject(String),
    /// Backend failure (database, file).
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidPath(path) => write!(f, "Invalid path: {}", path),
            StoreError::NotAnObject(path) => write!(f, "Value at {} is not an object", path),
            StoreError::Backend(msg) => write!(f, "Backend failure: {}", msg),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Invalid value.
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value for {}: {} ({})", field, value, reason)
            }
        }
    }
}

// Convenience constructors
impl StoryMapError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        StoryMapError::Graph(GraphError::NodeNotFound(id.into()))
    }

    pub fn invalid_link(msg: impl Into<String>) -> Self {
        StoryMapError::Graph(GraphError::InvalidLink(msg.into()))
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        StoryMapError::Store(StoreError::InvalidPath(path.into()))
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        StoryMapError::Store(StoreError::Backend(msg.into()))
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StoryMapError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    /// True for the "caller asked about something that is not there" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoryMapError::Graph(GraphError::NodeNotFound(_))
                | StoryMapError::Graph(GraphError::LinkNotFound(_))
                | StoryMapError::Graph(GraphError::NoData(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let err = StoryMapError::node_not_found("Z");
        assert_eq!(err.to_string(), "Graph error: Node not found: Z");
        assert!(err.is_not_found());

        let err = StoryMapError::invalid_config("levels.policy", "bogus", "unknown policy");
        assert!(err.to_string().contains("levels.policy"));
        assert!(!err.is_not_found());
    }
}
