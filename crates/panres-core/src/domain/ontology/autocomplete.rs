//! Autocomplete suggestions
//!
//! Candidates come from the full-text index in relevance order; the triple
//! store then supplies labels and the facts used to pick a display kind.
//! The index is rebuilt only at startup, so candidates that no longer exist
//! as subjects are dropped.

use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::Result;

use super::repository::{SearchIndex, TripleStore};
use super::resolver::dedup_preserving_order;
use super::view::{Suggestion, SuggestionKind};
use super::vocabulary::Vocabulary;

/// Facts about one candidate used for classification
struct CandidateFacts<'f> {
    first_type: Option<&'f str>,
    is_class: bool,
    is_phenotype: bool,
    is_database: bool,
}

/// Fixed-priority display kind
fn classify(facts: &CandidateFacts<'_>, vocab: &Vocabulary) -> SuggestionKind {
    if facts.first_type == Some(vocab.primary_gene_type.as_str()) {
        SuggestionKind::Gene
    } else if facts.is_class {
        SuggestionKind::Class
    } else if facts.is_phenotype {
        SuggestionKind::Phenotype
    } else if facts.is_database {
        SuggestionKind::Database
    } else if facts.first_type.is_some_and(|t| vocab.is_ontology_class_type(t)) {
        SuggestionKind::OntologyClass
    } else if facts.first_type.is_some_and(|t| vocab.is_resource_type(t)) {
        SuggestionKind::Resource
    } else {
        SuggestionKind::Other
    }
}

pub struct AutocompleteRanker<'a, S: TripleStore + ?Sized, I: SearchIndex + ?Sized> {
    store: &'a S,
    index: &'a I,
    vocabulary: &'a Vocabulary,
    settings: &'a SearchConfig,
}

impl<'a, S, I> AutocompleteRanker<'a, S, I>
where
    S: TripleStore + ?Sized,
    I: SearchIndex + ?Sized,
{
    pub fn new(
        store: &'a S,
        index: &'a I,
        vocabulary: &'a Vocabulary,
        settings: &'a SearchConfig,
    ) -> Self {
        Self {
            store,
            index,
            vocabulary,
            settings,
        }
    }

    /// Ranked suggestions; failures degrade to an empty list
    pub async fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        match self.try_suggest(query, limit).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!(query = %query, error = %e, "Autocomplete failed, returning no suggestions");
                Vec::new()
            }
        }
    }

    async fn try_suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let query = query.trim();
        if limit == 0 || query.chars().count() < self.settings.min_query_len {
            return Ok(Vec::new());
        }

        let fetch = limit.saturating_mul(self.settings.overfetch_factor);
        let hits = self.index.search_prefix(query, fetch).await?;
        let candidates: Vec<String> = hits.into_iter().map(|h| h.node_id).collect();
        let candidates = dedup_preserving_order(&candidates);

        let existing = self.store.existing_subjects(&candidates).await?;
        let ids: Vec<String> = candidates
            .into_iter()
            .filter(|id| existing.contains(id))
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let vocab = self.vocabulary;
        let labels = self.store.first_values(&ids, &vocab.label_predicate).await?;
        let types = self.store.first_values(&ids, &vocab.type_predicate).await?;
        let classes = self
            .store
            .objects_in(&ids, &vocab.resistance_class_predicate)
            .await?;
        let phenotypes = self
            .store
            .objects_in(&ids, &vocab.phenotype_predicate)
            .await?;
        let databases = self
            .store
            .objects_in(&ids, &vocab.source_database_predicate)
            .await?;

        let mut suggestions: Vec<Suggestion> = ids
            .iter()
            .map(|id| {
                let facts = CandidateFacts {
                    first_type: types.get(id).map(String::as_str),
                    is_class: classes.contains(id),
                    is_phenotype: phenotypes.contains(id),
                    is_database: databases.contains(id),
                };
                Suggestion {
                    id: id.clone(),
                    label: labels.get(id).cloned().unwrap_or_else(|| id.clone()),
                    kind: classify(&facts, vocab),
                }
            })
            .collect();
        suggestions.truncate(limit);

        debug!(
            query = %query,
            fetched = fetch,
            returned = suggestions.len(),
            "Autocomplete suggestions ranked"
        );
        Ok(suggestions)
    }
}
