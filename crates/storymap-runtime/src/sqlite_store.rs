//! SQLite-backed implementation of the GraphStore trait.
//!
//! The document tree is flattened into one row per scalar leaf, keyed by its
//! full path. A subtree is every row whose path equals the prefix or starts
//! with `prefix/`, which a range scan on the primary key answers directly.
//! Every write runs in a single transaction.

#![cfg(feature = "sqlite")]

use crate::store::GraphStore;
use async_trait::async_trait;
use rusqlite::{params, Connection, Transaction};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Mutex;
use storymap_core::error::{Result, StoreError, StoryMapError};
use storymap_core::path::{assemble, flatten_leaves, split_path};
use tracing::debug;

/// SQLite-backed path-addressed store.
///
/// Supports both in-memory and file-backed databases.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn backend(e: rusqlite::Error) -> StoryMapError {
    StoryMapError::backend(e.to_string())
}

impl SqliteStore {
    /// Create a new in-memory SQLite store.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::init_with_connection(conn)
    }

    /// Create or open a file-backed SQLite store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(backend)?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS entries (
                path TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(backend)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored leaves.
    pub fn leaf_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(count as usize)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoryMapError::backend("connection lock poisoned"))
    }
}

/// Rows of the subtree at `segments`, as (relative segments, value).
fn read_subtree(conn: &Connection, segments: &[&str]) -> Result<Vec<(Vec<String>, Value)>> {
    let prefix = segments.join("/");
    let rows: Vec<(String, String)> = if prefix.is_empty() {
        let mut stmt = conn.prepare("SELECT path, value FROM entries").map_err(backend)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(backend)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(backend)?;
        rows
    } else {
        let mut stmt = conn
            .prepare("SELECT path, value FROM entries WHERE path = ?1 OR (path >= ?2 AND path < ?3)")
            .map_err(backend)?;
        let rows = stmt
            .query_map(
                params![prefix, format!("{}/", prefix), format!("{}0", prefix)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(backend)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(backend)?;
        rows
    };

    rows.into_iter()
        .map(|(path, raw)| {
            let relative = split_path(&path)
                .into_iter()
                .skip(segments.len())
                .map(String::from)
                .collect();
            Ok((relative, serde_json::from_str(&raw)?))
        })
        .collect()
}

fn delete_subtree(tx: &Transaction<'_>, segments: &[&str]) -> Result<()> {
    let prefix = segments.join("/");
    if prefix.is_empty() {
        tx.execute("DELETE FROM entries", []).map_err(backend)?;
    } else {
        tx.execute(
            "DELETE FROM entries WHERE path = ?1 OR (path >= ?2 AND path < ?3)",
            params![prefix, format!("{}/", prefix), format!("{}0", prefix)],
        )
        .map_err(backend)?;
    }
    Ok(())
}

/// Replaces the subtree at `segments`. Scalar ancestors are dropped so the
/// new value can hang beneath them.
fn write_subtree(tx: &Transaction<'_>, segments: &[&str], value: &Value) -> Result<()> {
    delete_subtree(tx, segments)?;
    for depth in 1..segments.len() {
        tx.execute(
            "DELETE FROM entries WHERE path = ?1",
            params![segments[..depth].join("/")],
        )
        .map_err(backend)?;
    }
    for (path, leaf) in flatten_leaves(segments, value) {
        tx.execute(
            "INSERT OR REPLACE INTO entries (path, value) VALUES (?1, ?2)",
            params![path, serde_json::to_string(&leaf)?],
        )
        .map_err(backend)?;
    }
    Ok(())
}

#[async_trait]
impl GraphStore for SqliteStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let conn = self.lock()?;
        let leaves = read_subtree(&conn, &split_path(path))?;
        Ok(assemble(leaves))
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let segments = split_path(path);
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(backend)?;
        write_subtree(&tx, &segments, &value)?;
        tx.commit().map_err(backend)?;
        debug!(path, "sqlite set");
        Ok(())
    }

    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<()> {
        let segments = split_path(path);
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(backend)?;

        let scalar_here: bool = tx
            .query_row(
                "SELECT COUNT(*) > 0 FROM entries WHERE path = ?1",
                params![segments.join("/")],
                |row| row.get(0),
            )
            .map_err(backend)?;
        if scalar_here && !segments.is_empty() {
            return Err(StoryMapError::Store(StoreError::NotAnObject(segments.join("/"))));
        }

        for (key, value) in &partial {
            let mut child = segments.clone();
            child.extend(split_path(key));
            if child.len() == segments.len() {
                return Err(StoryMapError::invalid_path(key.as_str()));
            }
            write_subtree(&tx, &child, value)?;
        }
        tx.commit().map_err(backend)?;
        debug!(path, fields = partial.len(), "sqlite update");
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let segments = split_path(path);
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(backend)?;
        delete_subtree(&tx, &segments)?;
        tx.commit().map_err(backend)?;
        Ok(())
    }
}
