//! PanRes Explorer Core Library
//!
//! This crate provides the read-only query layer over the PanRes ontology,
//! including:
//! - Storage (SQLite triple store, FTS5 search index, JSONL import/export)
//! - Triple store and search index repositories
//! - Item details with view-type classification
//! - Category counts, listings, grouped gene listings and chart data
//! - Reverse relation lookup
//! - Ranked autocomplete suggestions

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::ontology::{
        ItemDetails, OntologyService, References, Suggestion, SuggestionKind, ViewType,
    };
    pub use crate::error::{Error, Result};
    pub use crate::infrastructure::ontology::SqliteOntologyService;
    pub use crate::storage::{Database, DatabaseConfig};
}
