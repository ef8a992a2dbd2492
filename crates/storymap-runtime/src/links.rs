//! Row-oriented editing of a story's stored `links` collection.
//!
//! The link editor works on `(source, link, target)` rows. Rows are written
//! with bare-id endpoints and trimmed text; the leveling pass takes care of
//! rows that name nodes which do not exist.

use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use storymap_core::error::{GraphError, Result, StoryMapError};
use storymap_core::types::{Graph, Link};
use tracing::{debug, info};

/// One editable relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRow {
    pub source: String,
    pub link: String,
    pub target: String,
}

impl LinkRow {
    pub fn new(source: impl Into<String>, link: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            link: link.into(),
            target: target.into(),
        }
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            source: self.source.trim().to_string(),
            link: self.link.trim().to_string(),
            target: self.target.trim().to_string(),
        }
    }

    /// Rejects rows with an empty endpoint. The label may be empty.
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(StoryMapError::invalid_link("source is empty"));
        }
        if self.target.trim().is_empty() {
            return Err(StoryMapError::invalid_link("target is empty"));
        }
        Ok(())
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.trimmed())?)
    }
}

impl From<&Link> for LinkRow {
    fn from(link: &Link) -> Self {
        Self::new(link.source_id(), link.link.clone(), link.target_id())
    }
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link::new(row.source, row.target, row.link)
    }
}

/// Link editor bound to one story's `links` collection.
pub struct LinkTable {
    store: Arc<dyn GraphStore>,
    path: String,
}

impl LinkTable {
    /// `graph_path` is the story graph root; rows live under `{graph_path}/links`.
    pub fn new(store: Arc<dyn GraphStore>, graph_path: &str) -> Self {
        Self {
            store,
            path: format!("{}/links", graph_path.trim_end_matches('/')),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stored rows in collection order, skipping holes.
    pub async fn list_links(&self) -> Result<Vec<LinkRow>> {
        let Some(value) = self.store.get(&self.path).await? else {
            return Ok(Vec::new());
        };
        let graph: Graph = serde_json::from_value(json!({ "links": value }))?;
        Ok(graph.links.iter().map(LinkRow::from).collect())
    }

    /// Appends `row` after the highest stored index and returns that index.
    pub async fn add_link(&self, row: LinkRow) -> Result<usize> {
        row.validate()?;
        let index = match self.store.get(&self.path).await? {
            Some(Value::Array(items)) => items.len(),
            Some(Value::Object(map)) => map
                .keys()
                .filter_map(|k| k.parse::<usize>().ok())
                .max()
                .map_or(0, |m| m + 1),
            _ => 0,
        };
        self.store
            .set(&format!("{}/{}", self.path, index), row.to_value()?)
            .await?;
        debug!(index, source = %row.source, target = %row.target, "link added");
        Ok(index)
    }

    /// Replaces the whole collection with `rows`, in order.
    ///
    /// Every row is validated before anything is written.
    pub async fn save_links(&self, rows: &[LinkRow]) -> Result<()> {
        for row in rows {
            row.validate()?;
        }
        let values = rows
            .iter()
            .map(LinkRow::to_value)
            .collect::<Result<Vec<_>>>()?;
        let count = values.len();
        self.store.set(&self.path, Value::Array(values)).await?;
        info!(path = %self.path, count, "links saved");
        Ok(())
    }

    /// Removes the row at `index` (as listed by [`list_links`](Self::list_links))
    /// and rewrites the list without it.
    pub async fn remove_link(&self, index: usize) -> Result<LinkRow> {
        let mut rows = self.list_links().await?;
        if index >= rows.len() {
            return Err(StoryMapError::Graph(GraphError::LinkNotFound(index)));
        }
        let removed = rows.remove(index);
        self.save_links(&rows).await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;

    fn table(document: Value) -> LinkTable {
        LinkTable::new(Arc::new(MemoryStore::with_document(document)), "stories/u1/graph")
    }

    #[test]
    fn blank_endpoints_are_invalid() {
        assert!(LinkRow::new("A", "", "B").validate().is_ok());
        assert!(LinkRow::new("  ", "knows", "B").validate().is_err());
        assert!(LinkRow::new("A", "knows", "").validate().is_err());
    }

    #[tokio::test]
    async fn list_reads_embedded_endpoints_as_ids() {
        let table = table(json!({"stories": {"u1": {"graph": {"links": [
            {"source": {"id": "A", "level": 1}, "target": "B", "link": "ally of"},
            null,
            {"source": "B", "target": "C"},
        ]}}}}));
        let rows = table.list_links().await.unwrap();
        assert_eq!(
            rows,
            vec![LinkRow::new("A", "ally of", "B"), LinkRow::new("B", "", "C")]
        );
    }

    #[tokio::test]
    async fn add_appends_after_holes() {
        let table = table(json!({"stories": {"u1": {"graph": {"links": [
            {"source": "A", "target": "B"},
            null,
        ]}}}}));
        let index = table.add_link(LinkRow::new(" C ", " owes ", "D")).await.unwrap();
        assert_eq!(index, 2);
        let rows = table.list_links().await.unwrap();
        assert_eq!(rows[1], LinkRow::new("C", "owes", "D"));
    }

    #[tokio::test]
    async fn add_to_empty_story_starts_at_zero() {
        let table = table(Value::Null);
        assert_eq!(table.add_link(LinkRow::new("A", "knows", "B")).await.unwrap(), 0);
        assert_eq!(table.list_links().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_row_writes_nothing() {
        let table = table(Value::Null);
        let rows = vec![LinkRow::new("A", "knows", "B"), LinkRow::new("", "knows", "C")];
        let err = table.save_links(&rows).await.unwrap_err();
        assert!(matches!(err, StoryMapError::Graph(GraphError::InvalidLink(_))));
        assert!(table.list_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_compacts_the_list() {
        let table = table(Value::Null);
        table
            .save_links(&[
                LinkRow::new("A", "knows", "B"),
                LinkRow::new("B", "knows", "C"),
                LinkRow::new("C", "knows", "D"),
            ])
            .await
            .unwrap();
        let removed = table.remove_link(1).await.unwrap();
        assert_eq!(removed, LinkRow::new("B", "knows", "C"));
        let rows = table.list_links().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].source, "C");

        let err = table.remove_link(5).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
