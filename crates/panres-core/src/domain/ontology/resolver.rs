//! Label and link resolution
//!
//! Every place that renders a node goes through this resolver, so labels and
//! link/literal classification stay consistent across pages.

use std::collections::{HashMap, HashSet};

use crate::error::Result;

use super::repository::TripleStore;

/// Resolved labels with a fallback to the id itself
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    labels: HashMap<String, String>,
}

impl LabelMap {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }

    /// Label for an id; unlabeled ids render as themselves
    pub fn get<'a>(&'a self, id: &'a str) -> &'a str {
        self.labels.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Labels and link flags for a set of values
#[derive(Debug, Clone, Default)]
pub struct ResolvedValues {
    pub labels: LabelMap,
    pub links: HashSet<String>,
}

impl ResolvedValues {
    pub fn is_link(&self, value: &str) -> bool {
        self.links.contains(value)
    }
}

pub struct LabelResolver<'a, S: TripleStore + ?Sized> {
    store: &'a S,
    label_predicate: &'a str,
}

impl<'a, S: TripleStore + ?Sized> LabelResolver<'a, S> {
    pub fn new(store: &'a S, label_predicate: &'a str) -> Self {
        Self {
            store,
            label_predicate,
        }
    }

    /// First label of a node, or the node id unchanged
    pub async fn resolve_label(&self, id: &str) -> Result<String> {
        let labels = self.resolve_labels(&[id.to_string()]).await?;
        Ok(labels.get(id).to_string())
    }

    /// Batch label resolution in one round trip per chunk
    pub async fn resolve_labels(&self, ids: &[String]) -> Result<LabelMap> {
        let labels = self.store.first_values(ids, self.label_predicate).await?;
        Ok(LabelMap::new(labels))
    }

    /// Whether a value is a resource (occurs as a subject)
    pub async fn is_resource(&self, value: &str) -> Result<bool> {
        self.store.exists_as_subject(value).await
    }

    /// Labels and link flags for many values at once
    pub async fn resolve_values(&self, values: &[String]) -> Result<ResolvedValues> {
        let unique = dedup_preserving_order(values);
        let links = self.store.existing_subjects(&unique).await?;
        let labels = self.resolve_labels(&unique).await?;
        Ok(ResolvedValues { labels, links })
    }
}

/// Remove duplicates, keeping first occurrences in order
pub fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}
