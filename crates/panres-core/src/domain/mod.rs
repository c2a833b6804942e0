//! Domain layer
//!
//! Contains the core query logic and view models.

pub mod ontology;
