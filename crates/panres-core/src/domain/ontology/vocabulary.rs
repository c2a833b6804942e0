//! Ontology vocabulary
//!
//! The predicate and type identifiers the query layer gives meaning to.
//! Identifiers follow the ingestion pipeline's cleaning rules: ontology terms
//! appear by fragment (`PanGene`, `has_resistance_class`), standard
//! vocabularies keep a short prefix (`rdf:type`, `owl:Class`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifiers with special meaning to the query layer
///
/// Built once at startup (usually from `config.toml`) and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Predicate linking a node to its type
    pub type_predicate: String,
    /// Predicate carrying a node's display label
    pub label_predicate: String,
    /// Predicates searched, in order, for a node's description
    pub description_predicates: Vec<String>,
    /// Gene -> antibiotic resistance class
    pub resistance_class_predicate: String,
    /// Gene -> predicted phenotype
    pub phenotype_predicate: String,
    /// Gene -> source database
    pub source_database_predicate: String,
    /// The type marking a pan gene
    pub primary_gene_type: String,
    /// The type of genes linked to source databases
    pub database_gene_type: String,
    /// Schema-level predicates hidden on class/phenotype/database pages
    pub technical_predicates: Vec<String>,
    /// Types marking a node as an ontology class
    pub ontology_class_types: Vec<String>,
    /// Types marking a node as a generic resource
    pub resource_types: Vec<String>,
    /// Human-readable names for predicates
    pub display_names: BTreeMap<String, String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let display_names = [
            ("rdf:type", "Type"),
            ("rdfs:label", "Label"),
            ("rdfs:comment", "Comment"),
            ("rdfs:subClassOf", "Subclass Of"),
            ("rdfs:subPropertyOf", "Subproperty Of"),
            ("rdfs:domain", "Domain"),
            ("rdfs:range", "Range"),
            ("has_resistance_class", "Resistance Class"),
            ("has_predicted_phenotype", "Predicted Phenotype"),
            ("is_from_database", "Source Database"),
            ("has_length", "Length"),
            ("accession", "Accession"),
            ("pubmed", "PubMed"),
            ("card_link", "CARD Link"),
            ("same_as", "Same As"),
            ("member_of", "Member Of"),
            ("translates_to", "Translates To"),
            ("gene_alt_name", "Alternative Name"),
            ("original_fasta_header", "Original FASTA Header"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            type_predicate: "rdf:type".to_string(),
            label_predicate: "rdfs:label".to_string(),
            description_predicates: vec![
                "rdfs:comment".to_string(),
                "description".to_string(),
                "metal_comment".to_string(),
            ],
            resistance_class_predicate: "has_resistance_class".to_string(),
            phenotype_predicate: "has_predicted_phenotype".to_string(),
            source_database_predicate: "is_from_database".to_string(),
            primary_gene_type: "PanGene".to_string(),
            database_gene_type: "OriginalGene".to_string(),
            technical_predicates: vec![
                "rdf:type".to_string(),
                "rdfs:domain".to_string(),
                "rdfs:range".to_string(),
                "rdfs:subClassOf".to_string(),
                "rdfs:subPropertyOf".to_string(),
            ],
            ontology_class_types: vec!["owl:Class".to_string(), "rdfs:Class".to_string()],
            resource_types: vec![
                "owl:NamedIndividual".to_string(),
                "rdfs:Resource".to_string(),
            ],
            display_names,
        }
    }
}

impl Vocabulary {
    /// Display name for a predicate, falling back to the predicate itself
    pub fn display_name<'a>(&'a self, predicate: &'a str) -> &'a str {
        self.display_names
            .get(predicate)
            .map(String::as_str)
            .unwrap_or(predicate)
    }

    /// Predicates whose values get a "list related items" affordance
    pub fn grouping_predicates(&self) -> [&str; 4] {
        [
            self.type_predicate.as_str(),
            self.resistance_class_predicate.as_str(),
            self.phenotype_predicate.as_str(),
            self.source_database_predicate.as_str(),
        ]
    }

    pub fn is_grouping_predicate(&self, predicate: &str) -> bool {
        self.grouping_predicates().contains(&predicate)
    }

    pub fn is_technical_predicate(&self, predicate: &str) -> bool {
        self.technical_predicates.iter().any(|p| p == predicate)
    }

    pub fn is_ontology_class_type(&self, type_id: &str) -> bool {
        self.ontology_class_types.iter().any(|t| t == type_id)
    }

    pub fn is_resource_type(&self, type_id: &str) -> bool {
        self.resource_types.iter().any(|t| t == type_id)
    }

    /// Check that every required identifier is set
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("type_predicate", &self.type_predicate),
            ("label_predicate", &self.label_predicate),
            ("resistance_class_predicate", &self.resistance_class_predicate),
            ("phenotype_predicate", &self.phenotype_predicate),
            ("source_database_predicate", &self.source_database_predicate),
            ("primary_gene_type", &self.primary_gene_type),
            ("database_gene_type", &self.database_gene_type),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("ontology.{} must not be empty", name));
            }
        }
        Ok(())
    }
}
