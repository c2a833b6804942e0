//! Reverse lookup of subjects related to a (predicate, object) pair

use tracing::debug;

use crate::error::Result;

use super::repository::TripleStore;
use super::resolver::LabelResolver;
use super::view::RelatedSubject;

pub struct RelationLookup<'a, S: TripleStore + ?Sized> {
    store: &'a S,
    label_predicate: &'a str,
}

impl<'a, S: TripleStore + ?Sized> RelationLookup<'a, S> {
    pub fn new(store: &'a S, label_predicate: &'a str) -> Self {
        Self {
            store,
            label_predicate,
        }
    }

    /// Distinct subjects of `(s, predicate, object)`, sorted by label
    pub async fn related_subjects(
        &self,
        predicate: &str,
        object: &str,
    ) -> Result<Vec<RelatedSubject>> {
        let subjects = self
            .store
            .distinct_subjects(predicate, Some(object), None)
            .await?;
        let labels = LabelResolver::new(self.store, self.label_predicate)
            .resolve_labels(&subjects)
            .await?;

        let mut related: Vec<RelatedSubject> = subjects
            .into_iter()
            .map(|id| RelatedSubject {
                label: labels.get(&id).to_string(),
                id,
            })
            .collect();
        related.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));

        debug!(
            predicate = %predicate,
            object = %object,
            found = related.len(),
            "Related subjects resolved"
        );
        Ok(related)
    }
}
