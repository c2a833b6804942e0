//! Full-text search index build
//!
//! The index holds one row per distinct subject, searchable by its first label
//! (or its id when unlabeled). It is rebuilt from scratch at process startup;
//! nothing keeps it in sync with later writes to `triples`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{Error, Result};

const CLEAR_INDEX_SQL: &str = "DELETE FROM search_index";

const POPULATE_INDEX_SQL: &str = r#"
    INSERT INTO search_index (node_id, search_text)
    SELECT s.subject,
           COALESCE(
               (SELECT l.object FROM triples l
                WHERE l.subject = s.subject AND l.predicate = ?
                ORDER BY l.rowid LIMIT 1),
               s.subject
           )
    FROM (SELECT DISTINCT subject FROM triples) s
"#;

/// Outcome of a search index build
#[derive(Debug, Clone, Serialize)]
pub struct IndexBuildReport {
    /// Rows written to the index
    pub entries: u64,
    pub built_at: DateTime<Utc>,
}

/// Drop and repopulate the search index in one transaction
pub async fn rebuild_search_index(
    pool: &SqlitePool,
    label_predicate: &str,
) -> Result<IndexBuildReport> {
    let started = std::time::Instant::now();
    let mut tx = pool.begin().await?;

    sqlx::query(CLEAR_INDEX_SQL)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::SearchIndexError(format!("Failed to clear index: {}", e)))?;

    sqlx::query(POPULATE_INDEX_SQL)
        .bind(label_predicate)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::SearchIndexError(format!("Failed to populate index: {}", e)))?;

    let (entries,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search_index")
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    let report = IndexBuildReport {
        entries: entries as u64,
        built_at: Utc::now(),
    };

    info!(
        entries = report.entries,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Search index rebuilt"
    );
    Ok(report)
}
