//! In-memory store, optionally backed by a JSON file.
//!
//! The whole document tree lives in one `serde_json::Value` behind an async
//! `RwLock`. When opened from a file, every write rewrites the file so the
//! tree survives between runs; a write whose file update fails leaves the
//! in-memory tree unchanged.

use crate::store::GraphStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use storymap_core::error::{Result, StoryMapError};
use storymap_core::path::{get_at, remove_at, set_at, split_path, update_at};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory path-addressed store.
pub struct MemoryStore {
    root: RwLock<Value>,
    backing: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty store with no file backing.
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Null),
            backing: None,
        }
    }

    /// Create a store holding `document` as its root.
    pub fn with_document(document: Value) -> Self {
        Self {
            root: RwLock::new(document),
            backing: None,
        }
    }

    /// Open a file-backed store. A missing file starts an empty tree.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let root = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Value::Null
        };
        Ok(Self {
            root: RwLock::new(root),
            backing: Some(path),
        })
    }

    /// A copy of the whole document tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    /// Rewrite the backing file from the current tree. No-op without one.
    pub async fn flush(&self) -> Result<()> {
        let root = self.root.read().await;
        self.persist(&root)
    }

    /// Apply `change` to a copy of the tree, persist the copy, then swap it in.
    async fn commit<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Value) -> Result<()>,
    {
        let mut root = self.root.write().await;
        let mut next = root.clone();
        change(&mut next)?;
        self.persist(&next)?;
        *root = next;
        Ok(())
    }

    fn persist(&self, root: &Value) -> Result<()> {
        let Some(path) = &self.backing else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(root)?;
        std::fs::write(path, json)
            .map_err(|e| StoryMapError::backend(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "store flushed");
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let root = self.root.read().await;
        Ok(get_at(&root, &split_path(path)).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.commit(|root| set_at(root, &split_path(path), value)).await
    }

    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<()> {
        self.commit(|root| update_at(root, &split_path(path), partial)).await
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.commit(|root| {
            remove_at(root, &split_path(path));
            Ok(())
        })
        .await
    }
}
