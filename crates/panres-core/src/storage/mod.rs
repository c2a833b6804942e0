//! Storage layer - SQLite triple store, FTS index and JSONL import/export
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//! - `search_index`: Startup build of the full-text index
//! - `jsonl`: JSONL triple files for fixtures and local development
//!
//! # Usage
//!
//! ```ignore
//! use panres_core::storage::{rebuild_search_index, Database};
//!
//! let db = Database::open("ontology.db").await?;
//! rebuild_search_index(db.pool(), "rdfs:label").await?;
//! ```

pub mod database;
pub mod jsonl;
pub mod migrations;
pub mod search_index;

// Re-export commonly used types
pub use database::{default_database_path, Database, DatabaseConfig, DATABASE_ENV_VAR};
pub use jsonl::{export_triples, import_triples, ExportResult, ImportResult, TripleRecord};
pub use migrations::{migration_status, run_migrations, MigrationStatus, CURRENT_VERSION};
pub use search_index::{rebuild_search_index, IndexBuildReport};
