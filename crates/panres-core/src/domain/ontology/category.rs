//! Category definitions
//!
//! Categories are the fixed top-level groupings the explorer shows on its
//! landing page. They come from configuration, never from the triple store.

use serde::{Deserialize, Serialize};

/// How a category's members are selected from the triple store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryQuery {
    /// Distinct subjects typed with `value`
    ByType,
    /// Distinct objects of predicate `value`
    DistinctObjectsOfPredicate,
    /// Distinct subjects of predicate `value`
    DistinctSubjectsOfPredicate,
}

impl CategoryQuery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByType => "by-type",
            Self::DistinctObjectsOfPredicate => "distinct-objects-of-predicate",
            Self::DistinctSubjectsOfPredicate => "distinct-subjects-of-predicate",
        }
    }
}

/// A configured category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable key used in URLs and CLI arguments
    pub key: String,
    /// Display name
    pub name: String,
    pub query_type: CategoryQuery,
    /// Type name or predicate, depending on `query_type`
    pub value: String,
    /// Only count subjects that also carry this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<String>,
}

impl Category {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        query_type: CategoryQuery,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            query_type,
            value: value.into(),
            subject_type: None,
        }
    }

    /// Restrict counted subjects to the given type
    pub fn with_subject_type(mut self, subject_type: impl Into<String>) -> Self {
        self.subject_type = Some(subject_type.into());
        self
    }
}

/// The categories shipped with the PanRes ontology
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("pan_genes", "Pan Genes", CategoryQuery::ByType, "PanGene"),
        Category::new(
            "original_genes",
            "Original Genes",
            CategoryQuery::ByType,
            "OriginalGene",
        ),
        Category::new(
            "gene_clusters",
            "Gene Clusters",
            CategoryQuery::ByType,
            "PanGeneCluster",
        ),
        Category::new(
            "antibiotic_classes",
            "Antibiotic Classes",
            CategoryQuery::DistinctObjectsOfPredicate,
            "has_resistance_class",
        )
        .with_subject_type("PanGene"),
        Category::new(
            "predicted_phenotypes",
            "Predicted Phenotypes",
            CategoryQuery::DistinctObjectsOfPredicate,
            "has_predicted_phenotype",
        )
        .with_subject_type("PanGene"),
        Category::new(
            "source_databases",
            "Source Databases",
            CategoryQuery::DistinctObjectsOfPredicate,
            "is_from_database",
        )
        .with_subject_type("OriginalGene"),
        Category::new(
            "translated_genes",
            "Translated Genes",
            CategoryQuery::DistinctSubjectsOfPredicate,
            "translates_to",
        ),
    ]
}

/// Look up a category by key
pub fn find_category<'a>(categories: &'a [Category], key: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.key == key)
}

/// Check keys are unique and every category has a value
pub fn validate_categories(categories: &[Category]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for category in categories {
        if category.key.trim().is_empty() {
            return Err("category key must not be empty".to_string());
        }
        if !seen.insert(category.key.as_str()) {
            return Err(format!("duplicate category key '{}'", category.key));
        }
        if category.value.trim().is_empty() {
            return Err(format!("category '{}' has an empty value", category.key));
        }
    }
    Ok(())
}
