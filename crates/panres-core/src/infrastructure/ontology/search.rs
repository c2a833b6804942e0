//! FTS5-backed search index

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::ontology::{SearchHit, SearchIndex};
use crate::error::{Error, Result};

/// Quote user input as a single FTS5 phrase with a trailing prefix marker
///
/// Embedded double quotes are doubled, so operators and column filters in the
/// input are matched literally.
pub fn prefix_phrase_query(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("\"{}\"*", trimmed.replace('"', "\"\"")))
}

/// SQLite FTS5 implementation of the search index
#[derive(Clone)]
pub struct SqliteSearchIndex {
    pool: SqlitePool,
}

impl SqliteSearchIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchIndex for SqliteSearchIndex {
    async fn search_prefix(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let Some(expression) = prefix_phrase_query(query) else {
            return Ok(Vec::new());
        };

        let rows: Vec<(String, String, f64)> = sqlx::query_as(
            r#"
            SELECT node_id, search_text, rank
            FROM search_index
            WHERE search_index MATCH ?
            ORDER BY rank, node_id
            LIMIT ?
            "#,
        )
        .bind(&expression)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::SearchIndexError(e.to_string()))?;

        debug!(query = %expression, hits = rows.len(), "Search index queried");

        Ok(rows
            .into_iter()
            .map(|(node_id, search_text, rank)| SearchHit {
                node_id,
                search_text,
                rank,
            })
            .collect())
    }

    async fn entry_count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search_index")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::SearchIndexError(e.to_string()))?;
        Ok(count as u64)
    }
}
