//! Ontology infrastructure implementations
//!
//! This module contains concrete implementations of the triple store and
//! search index traits using SQLite.

mod repository;
mod search;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::domain::ontology::OntologyService;

pub use repository::{SqliteTripleStore, BATCH_CHUNK_SIZE};
pub use search::{prefix_phrase_query, SqliteSearchIndex};

/// Service over SQLite-backed store and index
pub type SqliteOntologyService = OntologyService<SqliteTripleStore, SqliteSearchIndex>;

impl OntologyService<SqliteTripleStore, SqliteSearchIndex> {
    /// Build the service over a shared pool
    pub fn sqlite(pool: SqlitePool, config: Arc<Config>) -> Self {
        Self::new(
            Arc::new(SqliteTripleStore::new(pool.clone())),
            Arc::new(SqliteSearchIndex::new(pool)),
            config,
        )
    }
}
