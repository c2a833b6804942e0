//! Entry points for the presentation layer
//!
//! `OntologyService` owns the shared store handles and the startup
//! configuration; each call builds its components per request.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

use super::aggregator::CategoryAggregator;
use super::autocomplete::AutocompleteRanker;
use super::details::ItemDetailAssembler;
use super::relations::RelationLookup;
use super::repository::{SearchIndex, TripleStore};
use super::view::{
    CategoryCount, CategoryListing, ChartData, GroupedGeneListing, ItemDetails, RelatedSubject,
    Suggestion,
};

pub struct OntologyService<S: TripleStore + ?Sized, I: SearchIndex + ?Sized> {
    store: Arc<S>,
    index: Arc<I>,
    config: Arc<Config>,
}

impl<S: TripleStore + ?Sized, I: SearchIndex + ?Sized> Clone for OntologyService<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: TripleStore + ?Sized, I: SearchIndex + ?Sized> OntologyService<S, I> {
    pub fn new(store: Arc<S>, index: Arc<I>, config: Arc<Config>) -> Self {
        Self {
            store,
            index,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    fn aggregator(&self) -> CategoryAggregator<'_, S> {
        CategoryAggregator::new(
            &*self.store,
            &self.config.ontology,
            &self.config.categories,
            &self.config.charts.palette,
        )
    }

    /// Detail view of a node; `Ok(None)` if it occurs in no triple
    pub async fn get_item_details(&self, id: &str) -> Result<Option<ItemDetails>> {
        ItemDetailAssembler::new(&*self.store, &self.config.ontology, &self.config.categories)
            .assemble(id)
            .await
    }

    pub async fn get_category_counts(&self) -> Result<Vec<CategoryCount>> {
        self.aggregator().counts().await
    }

    /// Listing of one category; unknown keys are `Error::CategoryNotFound`
    pub async fn list_category_items(&self, key: &str) -> Result<CategoryListing> {
        self.aggregator().list_by_key(key).await
    }

    pub async fn get_grouped_gene_listing(&self) -> Result<GroupedGeneListing> {
        self.aggregator().grouped_gene_listing().await
    }

    /// Chart data for `predicate`; `top_n` defaults to `charts.top_n`
    pub async fn get_chart_data(
        &self,
        predicate: &str,
        subject_type: Option<&str>,
        top_n: Option<usize>,
        show_all: bool,
    ) -> Result<ChartData> {
        let top_n = top_n.unwrap_or(self.config.charts.top_n);
        self.aggregator()
            .chart_distribution(predicate, subject_type, top_n, show_all)
            .await
    }

    pub async fn get_related_subjects(
        &self,
        predicate: &str,
        object: &str,
    ) -> Result<Vec<RelatedSubject>> {
        RelationLookup::new(&*self.store, &self.config.ontology.label_predicate)
            .related_subjects(predicate, object)
            .await
    }

    /// Suggestions for a partial query; never fails
    ///
    /// `limit` defaults to `search.autocomplete_limit`.
    pub async fn get_autocomplete_suggestions(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Vec<Suggestion> {
        let limit = limit.unwrap_or(self.config.search.autocomplete_limit);
        AutocompleteRanker::new(
            &*self.store,
            &*self.index,
            &self.config.ontology,
            &self.config.search,
        )
        .suggest(query, limit)
        .await
    }
}
