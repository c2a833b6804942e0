//! Infrastructure layer
//!
//! Contains implementations for external systems, currently SQLite.

pub mod ontology;
