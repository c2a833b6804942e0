//! View models handed to the presentation layer
//!
//! Every type here is plain data, rebuilt per request and ready for
//! templating or JSON encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bucket name for genes without a resistance class
pub const NO_CLASS_ASSIGNED: &str = "No Class Assigned";
/// Bucket name for genes without a predicted phenotype
pub const NO_PHENOTYPE_ASSIGNED: &str = "No Phenotype Assigned";
/// Label of the folded chart entry
pub const OTHERS_LABEL: &str = "Others";

/// Derived classification controlling how a detail page is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    PanGene,
    AntibioticClass,
    PredictedPhenotype,
    SourceDatabase,
    Default,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PanGene => "pan_gene",
            Self::AntibioticClass => "antibiotic_class",
            Self::PredictedPhenotype => "predicted_phenotype",
            Self::SourceDatabase => "source_database",
            Self::Default => "default",
        }
    }
}

/// "List related items" affordance attached to categorical values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub predicate: String,
    pub object: String,
}

/// One resolved value of an outgoing property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueDescriptor {
    /// Raw object value as stored
    pub value: String,
    /// Display label (the value itself for literals and unlabeled nodes)
    pub label: String,
    /// Whether the value is itself a subject in the store
    pub is_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedLink>,
}

/// A node referencing the current item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub id: String,
    pub label: String,
    pub predicate: String,
    pub predicate_label: String,
}

/// Incoming references, flat or bucketed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum References {
    Flat(Vec<Reference>),
    Grouped(BTreeMap<String, Vec<Reference>>),
}

impl References {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat(items) => items.is_empty(),
            Self::Grouped(groups) => groups.values().all(Vec::is_empty),
        }
    }
}

/// Full detail view of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDetails {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    /// First type value found on the node
    pub primary_type: Option<String>,
    /// Key of the by-type category the primary type matched
    pub category: Option<String>,
    pub is_pan_gene: bool,
    pub view_type: ViewType,
    /// Display predicate name -> values sorted by label
    pub properties: BTreeMap<String, Vec<ValueDescriptor>>,
    pub references: References,
}

/// Landing-page count for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub key: String,
    pub name: String,
    pub count: u64,
}

/// An entry of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedItem {
    pub id: String,
    pub label: String,
    /// Whether the entry has a detail page
    pub is_link: bool,
}

/// Flat listing of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryListing {
    pub key: String,
    pub name: String,
    pub items: Vec<ListedItem>,
}

/// One bucket of a grouped listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemGroup {
    pub key: String,
    pub items: Vec<ListedItem>,
}

/// Genes grouped by resistance class and by predicted phenotype
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedGeneListing {
    pub by_class: Vec<ItemGroup>,
    pub by_phenotype: Vec<ItemGroup>,
    pub total: usize,
}

/// Chart-ready distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<String>,
    /// Sum over the full, untruncated distribution
    pub total: u64,
}

/// A subject found by reverse lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedSubject {
    pub id: String,
    pub label: String,
}

/// Display indicator of an autocomplete suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuggestionKind {
    Gene,
    Class,
    Phenotype,
    Database,
    #[serde(rename = "Ontology Class")]
    OntologyClass,
    Resource,
    Other,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gene => "Gene",
            Self::Class => "Class",
            Self::Phenotype => "Phenotype",
            Self::Database => "Database",
            Self::OntologyClass => "Ontology Class",
            Self::Resource => "Resource",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    pub kind: SuggestionKind,
}
