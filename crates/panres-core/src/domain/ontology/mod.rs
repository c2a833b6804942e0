//! Ontology query domain
//!
//! Read-only views over a flattened ontology stored as (subject, predicate,
//! object) triples. Nodes are opaque strings; a value counts as a link only
//! when it also occurs as a subject somewhere in the store.
//!
//! ## Architecture
//!
//! ```text
//!   ItemDetailAssembler   CategoryAggregator   RelationLookup   AutocompleteRanker
//!            \                    |                  /                 |      \
//!             +------------ LabelResolver ----------+                  |   SearchIndex
//!                                 |                                    |
//!                            TripleStore <-----------------------------+
//! ```
//!
//! `OntologyService` wires these together for the presentation layer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use panres_core::domain::ontology::OntologyService;
//!
//! let service = OntologyService::sqlite(pool, Arc::new(config));
//! if let Some(item) = service.get_item_details("blaTEM-1").await? {
//!     println!("{} ({})", item.label, item.view_type.as_str());
//! }
//! let suggestions = service.get_autocomplete_suggestions("bla", None).await;
//! ```

mod aggregator;
mod autocomplete;
mod category;
mod details;
mod grouping;
mod relations;
mod repository;
mod resolver;
mod service;
mod view;
mod vocabulary;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::CategoryAggregator;
pub use autocomplete::AutocompleteRanker;
pub use category::{
    default_categories, find_category, validate_categories, Category, CategoryQuery,
};
pub use details::ItemDetailAssembler;
pub use grouping::{bucket_members, Buckets, Memberships};
pub use relations::RelationLookup;
pub use repository::{
    ObjectCount, PredicateObject, SearchHit, SearchIndex, StoreStats, SubjectPredicate,
    TripleStore, TypeConstraint,
};
pub use resolver::{dedup_preserving_order, LabelMap, LabelResolver, ResolvedValues};
pub use service::OntologyService;
pub use view::{
    CategoryCount, CategoryListing, ChartData, GroupedGeneListing, ItemDetails, ItemGroup,
    ListedItem, Reference, References, RelatedLink, RelatedSubject, Suggestion, SuggestionKind,
    ValueDescriptor, ViewType, NO_CLASS_ASSIGNED, NO_PHENOTYPE_ASSIGNED, OTHERS_LABEL,
};
pub use vocabulary::Vocabulary;
