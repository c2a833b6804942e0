//! Repository traits for the triple store and its search index
//!
//! These traits abstract over the storage backend. All reads are set-based:
//! an unknown id yields an empty collection or `false`, never an error.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::Result;

/// An outgoing edge of a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateObject {
    pub predicate: String,
    pub object: String,
}

/// An incoming edge of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPredicate {
    pub subject: String,
    pub predicate: String,
}

/// Restricts a subject set to subjects carrying a given type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConstraint<'a> {
    /// Predicate linking a subject to its type
    pub predicate: &'a str,
    /// Required type value
    pub type_id: &'a str,
}

impl<'a> TypeConstraint<'a> {
    pub fn new(predicate: &'a str, type_id: &'a str) -> Self {
        Self { predicate, type_id }
    }
}

/// Number of distinct subjects per object value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCount {
    pub object: String,
    pub count: u64,
}

/// Statistics about the triple store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub triples: u64,
    pub subjects: u64,
    pub predicates: u64,
}

/// Read access to the (subject, predicate, object) relation
///
/// Orderings of multi-row results follow insertion order, so "first value"
/// means the first triple the ingestion pipeline wrote.
#[async_trait]
pub trait TripleStore: Send + Sync {
    // ========== Node Operations ==========

    /// All (predicate, object) pairs of a subject
    async fn outgoing(&self, subject: &str) -> Result<Vec<PredicateObject>>;

    /// All (subject, predicate) pairs referencing an object
    async fn incoming(&self, object: &str) -> Result<Vec<SubjectPredicate>>;

    /// Whether the id occurs as a subject anywhere
    ///
    /// This is the only link-vs-literal test in the system.
    async fn exists_as_subject(&self, id: &str) -> Result<bool>;

    /// Whether the id occurs as an object, optionally of one predicate
    async fn exists_as_object(&self, id: &str, predicate: Option<&str>) -> Result<bool>;

    /// Whether the id occurs as a subject or as an object
    async fn node_exists(&self, id: &str) -> Result<bool> {
        if self.exists_as_subject(id).await? {
            return Ok(true);
        }
        self.exists_as_object(id, None).await
    }

    // ========== Set Operations ==========

    /// Distinct subjects of a predicate, optionally with a fixed object
    async fn distinct_subjects(
        &self,
        predicate: &str,
        object: Option<&str>,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<Vec<String>>;

    /// Count of [`TripleStore::distinct_subjects`]
    async fn count_distinct_subjects(
        &self,
        predicate: &str,
        object: Option<&str>,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<u64>;

    /// Distinct objects of a predicate
    async fn distinct_objects(
        &self,
        predicate: &str,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<Vec<String>>;

    /// Count of [`TripleStore::distinct_objects`]
    async fn count_distinct_objects(
        &self,
        predicate: &str,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<u64>;

    /// Distinct-subject counts per object value, largest first
    ///
    /// Ties are ordered by object value.
    async fn object_distribution(
        &self,
        predicate: &str,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<Vec<ObjectCount>>;

    // ========== Batch Operations ==========

    /// First value of `predicate` for each subject that has one
    async fn first_values(
        &self,
        subjects: &[String],
        predicate: &str,
    ) -> Result<HashMap<String, String>>;

    /// All (subject, value) pairs of `predicate` for the given subjects
    async fn values_of(&self, subjects: &[String], predicate: &str)
        -> Result<Vec<(String, String)>>;

    /// The ids that occur as a subject
    async fn existing_subjects(&self, ids: &[String]) -> Result<HashSet<String>>;

    /// The ids that occur as an object of `predicate`
    async fn objects_in(&self, ids: &[String], predicate: &str) -> Result<HashSet<String>>;

    // ========== Statistics ==========

    async fn stats(&self) -> Result<StoreStats>;
}

/// A full-text index hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub node_id: String,
    pub search_text: String,
    /// Backend relevance score; lower ranks first
    pub rank: f64,
}

/// Secondary full-text index over node labels
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Prefix-phrase search, most relevant first
    async fn search_prefix(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Number of indexed nodes
    async fn entry_count(&self) -> Result<u64>;
}
