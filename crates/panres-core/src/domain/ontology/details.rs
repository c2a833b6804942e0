//! Item detail assembly
//!
//! Builds the detail view of one node: its outgoing properties, the nodes
//! referencing it, and a view type that decides how both are shaped.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::Result;

use super::category::{Category, CategoryQuery};
use super::grouping::{bucket_members, Memberships};
use super::repository::{PredicateObject, TripleStore, TypeConstraint};
use super::resolver::{dedup_preserving_order, LabelResolver};
use super::view::{
    ItemDetails, Reference, References, RelatedLink, ValueDescriptor, ViewType, NO_CLASS_ASSIGNED,
};
use super::vocabulary::Vocabulary;

/// Facts gathered from a node's outgoing triples
#[derive(Debug, Default)]
struct OutgoingSummary {
    label: Option<String>,
    primary_type: Option<String>,
    is_pan_gene: bool,
    description: Option<String>,
}

impl OutgoingSummary {
    fn from_pairs(pairs: &[PredicateObject], vocab: &Vocabulary) -> Self {
        let mut summary = Self::default();
        for pair in pairs {
            if pair.predicate == vocab.type_predicate {
                if summary.primary_type.is_none() {
                    summary.primary_type = Some(pair.object.clone());
                }
                if pair.object == vocab.primary_gene_type {
                    summary.is_pan_gene = true;
                }
            } else if pair.predicate == vocab.label_predicate && summary.label.is_none() {
                summary.label = Some(pair.object.clone());
            }
        }

        // Predicate order decides, not triple order
        summary.description = vocab.description_predicates.iter().find_map(|predicate| {
            pairs
                .iter()
                .find(|p| &p.predicate == predicate)
                .map(|p| p.object.clone())
        });
        summary
    }
}

/// Result of primary-type classification
#[derive(Debug, Clone, PartialEq, Eq)]
struct Classification {
    view_type: ViewType,
    category: Option<String>,
}

pub struct ItemDetailAssembler<'a, S: TripleStore + ?Sized> {
    store: &'a S,
    vocabulary: &'a Vocabulary,
    categories: &'a [Category],
}

impl<'a, S: TripleStore + ?Sized> ItemDetailAssembler<'a, S> {
    pub fn new(store: &'a S, vocabulary: &'a Vocabulary, categories: &'a [Category]) -> Self {
        Self {
            store,
            vocabulary,
            categories,
        }
    }

    fn resolver(&self) -> LabelResolver<'a, S> {
        LabelResolver::new(self.store, &self.vocabulary.label_predicate)
    }

    /// Assemble the detail view, or `None` if the node does not exist
    pub async fn assemble(&self, id: &str) -> Result<Option<ItemDetails>> {
        let vocab = self.vocabulary;

        // Step 1: outgoing facts
        let outgoing = self.store.outgoing(id).await?;
        let summary = OutgoingSummary::from_pairs(&outgoing, vocab);

        // Step 2: resolve values
        let mut properties = self.resolve_properties(&outgoing).await?;

        // Step 3: incoming references, sorted by label
        let references = self.resolve_references(id).await?;

        // Step 4: classification
        let classification = self
            .classify(id, summary.primary_type.as_deref(), summary.is_pan_gene)
            .await?;

        debug!(
            item_id = %id,
            view_type = classification.view_type.as_str(),
            outgoing = outgoing.len(),
            incoming = references.len(),
            "Item classified"
        );

        // Step 5: view-specific shaping
        let references = match classification.view_type {
            ViewType::AntibioticClass => {
                self.strip_technical(&mut properties);
                References::Flat(filter_by_predicate(
                    references,
                    &vocab.resistance_class_predicate,
                ))
            }
            ViewType::PredictedPhenotype => {
                self.strip_technical(&mut properties);
                References::Flat(filter_by_predicate(references, &vocab.phenotype_predicate))
            }
            ViewType::SourceDatabase => {
                self.strip_technical(&mut properties);
                References::Grouped(self.group_database_genes(id, &references).await?)
            }
            ViewType::PanGene | ViewType::Default => References::Flat(references),
        };

        // Step 6: empty result means "no properties" only if the node exists
        if properties.is_empty() && references.is_empty() && !self.store.node_exists(id).await? {
            debug!(item_id = %id, "Item not found");
            return Ok(None);
        }

        Ok(Some(ItemDetails {
            id: id.to_string(),
            label: summary.label.unwrap_or_else(|| id.to_string()),
            description: summary.description,
            primary_type: summary.primary_type,
            category: classification.category,
            is_pan_gene: summary.is_pan_gene,
            view_type: classification.view_type,
            properties: group_by_display_name(properties, vocab),
            references,
        }))
    }

    /// (raw predicate, descriptor) pairs, sorted by label within a predicate
    async fn resolve_properties(
        &self,
        outgoing: &[PredicateObject],
    ) -> Result<Vec<(String, ValueDescriptor)>> {
        let values: Vec<String> = outgoing.iter().map(|p| p.object.clone()).collect();
        let resolved = self.resolver().resolve_values(&values).await?;

        let mut properties: Vec<(String, ValueDescriptor)> = outgoing
            .iter()
            .map(|pair| {
                let related = self
                    .vocabulary
                    .is_grouping_predicate(&pair.predicate)
                    .then(|| RelatedLink {
                        predicate: pair.predicate.clone(),
                        object: pair.object.clone(),
                    });
                let descriptor = ValueDescriptor {
                    value: pair.object.clone(),
                    label: resolved.labels.get(&pair.object).to_string(),
                    is_link: resolved.is_link(&pair.object),
                    related,
                };
                (pair.predicate.clone(), descriptor)
            })
            .collect();

        properties.sort_by(|(pa, a), (pb, b)| {
            pa.cmp(pb)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.value.cmp(&b.value))
        });
        Ok(properties)
    }

    async fn resolve_references(&self, id: &str) -> Result<Vec<Reference>> {
        let incoming = self.store.incoming(id).await?;
        let subjects: Vec<String> = incoming.iter().map(|r| r.subject.clone()).collect();
        let labels = self
            .resolver()
            .resolve_labels(&dedup_preserving_order(&subjects))
            .await?;

        let mut references: Vec<Reference> = incoming
            .into_iter()
            .map(|r| Reference {
                label: labels.get(&r.subject).to_string(),
                predicate_label: self.vocabulary.display_name(&r.predicate).to_string(),
                id: r.subject,
                predicate: r.predicate,
            })
            .collect();

        references.sort_by(|a, b| {
            a.label
                .cmp(&b.label)
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a.predicate.cmp(&b.predicate))
        });
        Ok(references)
    }

    /// Fixed-priority classification; later probes are skipped on a match
    async fn classify(
        &self,
        id: &str,
        primary_type: Option<&str>,
        is_pan_gene: bool,
    ) -> Result<Classification> {
        let vocab = self.vocabulary;

        if let Some(primary_type) = primary_type {
            let category = self
                .categories
                .iter()
                .find(|c| c.query_type == CategoryQuery::ByType && c.value == primary_type);
            if let Some(category) = category {
                let view_type = if category.value == vocab.primary_gene_type || is_pan_gene {
                    ViewType::PanGene
                } else {
                    ViewType::Default
                };
                return Ok(Classification {
                    view_type,
                    category: Some(category.key.clone()),
                });
            }
        }

        if is_pan_gene {
            return Ok(Classification {
                view_type: ViewType::PanGene,
                category: None,
            });
        }

        let probes = [
            (&vocab.resistance_class_predicate, ViewType::AntibioticClass),
            (&vocab.phenotype_predicate, ViewType::PredictedPhenotype),
            (&vocab.source_database_predicate, ViewType::SourceDatabase),
        ];
        for (predicate, view_type) in probes {
            if self.store.exists_as_object(id, Some(predicate.as_str())).await? {
                return Ok(Classification {
                    view_type,
                    category: None,
                });
            }
        }

        Ok(Classification {
            view_type: ViewType::Default,
            category: None,
        })
    }

    fn strip_technical(&self, properties: &mut Vec<(String, ValueDescriptor)>) {
        properties.retain(|(predicate, _)| !self.vocabulary.is_technical_predicate(predicate));
    }

    /// Database genes bucketed by resistance class label
    async fn group_database_genes(
        &self,
        database_id: &str,
        references: &[Reference],
    ) -> Result<BTreeMap<String, Vec<Reference>>> {
        let vocab = self.vocabulary;
        let constraint = TypeConstraint::new(&vocab.type_predicate, &vocab.database_gene_type);

        let genes = self
            .store
            .distinct_subjects(
                &vocab.source_database_predicate,
                Some(database_id),
                Some(constraint),
            )
            .await?;
        let gene_set: HashSet<&str> = genes.iter().map(String::as_str).collect();

        let class_pairs = self
            .store
            .values_of(&genes, &vocab.resistance_class_predicate)
            .await?;
        let class_ids: Vec<String> = class_pairs.iter().map(|(_, c)| c.clone()).collect();
        let class_labels = self
            .resolver()
            .resolve_labels(&dedup_preserving_order(&class_ids))
            .await?;
        let memberships = Memberships::from_pairs(&class_pairs, &class_labels);

        // References are already label-sorted, so buckets inherit that order
        let members: Vec<Reference> = references
            .iter()
            .filter(|r| {
                r.predicate == vocab.source_database_predicate && gene_set.contains(r.id.as_str())
            })
            .cloned()
            .collect();

        let buckets = bucket_members(&members, |r| r.id.as_str(), &memberships);
        let mut grouped = buckets.named;
        if !buckets.unassigned.is_empty() {
            grouped.insert(NO_CLASS_ASSIGNED.to_string(), buckets.unassigned);
        }

        debug!(
            database_id = %database_id,
            genes = genes.len(),
            buckets = grouped.len(),
            "Database genes grouped"
        );
        Ok(grouped)
    }
}

fn filter_by_predicate(references: Vec<Reference>, predicate: &str) -> Vec<Reference> {
    references
        .into_iter()
        .filter(|r| r.predicate == predicate)
        .collect()
}

fn group_by_display_name(
    properties: Vec<(String, ValueDescriptor)>,
    vocab: &Vocabulary,
) -> BTreeMap<String, Vec<ValueDescriptor>> {
    let mut grouped: BTreeMap<String, Vec<ValueDescriptor>> = BTreeMap::new();
    for (predicate, descriptor) in properties {
        grouped
            .entry(vocab.display_name(&predicate).to_string())
            .or_default()
            .push(descriptor);
    }
    // Two predicates may share a display name
    for values in grouped.values_mut() {
        values.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.value.cmp(&b.value)));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ontology::category::default_categories;
    use crate::domain::ontology::testing::seeded_store;

    async fn assemble(triples: &[(&str, &str, &str)], id: &str) -> Option<ItemDetails> {
        let store = seeded_store(triples).await;
        let vocab = Vocabulary::default();
        let categories = default_categories();
        ItemDetailAssembler::new(&store, &vocab, &categories)
            .assemble(id)
            .await
            .expect("assemble failed")
    }

    #[tokio::test]
    async fn test_unknown_node_is_not_found() {
        let details = assemble(&[("g1", "rdfs:label", "gene")], "missing").await;
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn test_object_only_node_exists() {
        let details = assemble(&[("g1", "has_length", "861")], "861").await.unwrap();
        assert_eq!(details.label, "861");
        assert!(details.properties.is_empty());
        assert_eq!(details.view_type, ViewType::Default);
        match details.references {
            References::Flat(refs) => assert_eq!(refs.len(), 1),
            other => panic!("unexpected references: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pan_gene_details() {
        let triples = [
            ("g1", "rdf:type", "PanGene"),
            ("g1", "rdfs:label", "blaTEM-1"),
            ("g1", "rdfs:comment", "A beta-lactamase"),
            ("g1", "has_resistance_class", "beta_lactam"),
            ("g1", "has_length", "861"),
            ("beta_lactam", "rdfs:label", "beta-lactam"),
            ("c1", "member_of_cluster", "g1"),
        ];
        let details = assemble(&triples, "g1").await.unwrap();

        assert_eq!(details.label, "blaTEM-1");
        assert_eq!(details.description.as_deref(), Some("A beta-lactamase"));
        assert_eq!(details.primary_type.as_deref(), Some("PanGene"));
        assert_eq!(details.category.as_deref(), Some("pan_genes"));
        assert!(details.is_pan_gene);
        assert_eq!(details.view_type, ViewType::PanGene);

        let classes = &details.properties["Resistance Class"];
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].label, "beta-lactam");
        assert!(classes[0].is_link);
        assert_eq!(
            classes[0].related,
            Some(RelatedLink {
                predicate: "has_resistance_class".into(),
                object: "beta_lactam".into()
            })
        );

        let length = &details.properties["Length"];
        assert!(!length[0].is_link);
        assert!(length[0].related.is_none());

        // No filtering on gene pages
        assert!(details.properties.contains_key("Type"));
        assert!(matches!(details.references, References::Flat(ref r) if r.len() == 1));
    }

    #[tokio::test]
    async fn test_pan_gene_flag_without_category_match() {
        let triples = [
            ("g1", "rdf:type", "owl:NamedIndividual"),
            ("g1", "rdf:type", "PanGene"),
        ];
        let details = assemble(&triples, "g1").await.unwrap();
        assert_eq!(details.primary_type.as_deref(), Some("owl:NamedIndividual"));
        assert!(details.category.is_none());
        assert_eq!(details.view_type, ViewType::PanGene);
    }

    #[tokio::test]
    async fn test_antibiotic_class_view_filters() {
        let triples = [
            ("beta_lactam", "rdf:type", "owl:Class"),
            ("beta_lactam", "rdfs:subClassOf", "AntibioticResistanceClass"),
            ("beta_lactam", "rdfs:label", "beta-lactam"),
            ("beta_lactam", "rdfs:comment", "Penicillins and relatives"),
            ("g1", "has_resistance_class", "beta_lactam"),
            ("g1", "rdfs:label", "blaTEM-1"),
            ("g2", "mentions", "beta_lactam"),
        ];
        let details = assemble(&triples, "beta_lactam").await.unwrap();

        assert_eq!(details.view_type, ViewType::AntibioticClass);
        assert!(!details.properties.contains_key("Type"));
        assert!(!details.properties.contains_key("Subclass Of"));
        assert!(details.properties.contains_key("Comment"));
        assert_eq!(details.description.as_deref(), Some("Penicillins and relatives"));
        match details.references {
            References::Flat(refs) => {
                assert_eq!(refs.len(), 1);
                assert_eq!(refs[0].id, "g1");
                assert_eq!(refs[0].label, "blaTEM-1");
            }
            other => panic!("unexpected references: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_phenotype_view() {
        let triples = [
            ("g1", "has_predicted_phenotype", "ampicillin"),
            ("g2", "has_predicted_phenotype", "ampicillin"),
            ("g3", "is_from_database", "ampicillin"),
        ];
        let details = assemble(&triples, "ampicillin").await.unwrap();
        assert_eq!(details.view_type, ViewType::PredictedPhenotype);
        match details.references {
            References::Flat(refs) => {
                let ids: Vec<&str> = refs.iter().map(|r| r.id.as_str()).collect();
                assert_eq!(ids, vec!["g1", "g2"]);
            }
            other => panic!("unexpected references: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resistance_class_probe_wins_over_database() {
        let triples = [
            ("g1", "is_from_database", "X"),
            ("g2", "has_resistance_class", "X"),
        ];
        let details = assemble(&triples, "X").await.unwrap();
        assert_eq!(details.view_type, ViewType::AntibioticClass);
    }

    #[tokio::test]
    async fn test_source_database_groups_genes_by_class() {
        let triples = [
            ("CARD", "rdf:type", "Database"),
            ("CARD", "rdfs:label", "CARD"),
            ("o1", "rdf:type", "OriginalGene"),
            ("o1", "rdfs:label", "b-gene"),
            ("o1", "is_from_database", "CARD"),
            ("o1", "has_resistance_class", "beta_lactam"),
            ("o1", "has_resistance_class", "aminoglycoside"),
            ("o2", "rdf:type", "OriginalGene"),
            ("o2", "rdfs:label", "a-gene"),
            ("o2", "is_from_database", "CARD"),
            ("o2", "has_resistance_class", "beta_lactam"),
            ("o3", "rdf:type", "OriginalGene"),
            ("o3", "rdfs:label", "c-gene"),
            ("o3", "is_from_database", "CARD"),
            ("beta_lactam", "rdfs:label", "Beta-lactam"),
            ("aminoglycoside", "rdfs:label", "Aminoglycoside"),
            // Not an OriginalGene, so never bucketed
            ("p1", "is_from_database", "CARD"),
        ];
        let details = assemble(&triples, "CARD").await.unwrap();

        assert_eq!(details.view_type, ViewType::SourceDatabase);
        assert!(!details.properties.contains_key("Type"));
        let groups = match details.references {
            References::Grouped(groups) => groups,
            other => panic!("unexpected references: {:?}", other),
        };
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Aminoglycoside", "Beta-lactam", NO_CLASS_ASSIGNED]);

        let ids = |key: &str| -> Vec<String> { groups[key].iter().map(|r| r.id.clone()).collect() };
        assert_eq!(ids("Beta-lactam"), vec!["o2", "o1"]);
        assert_eq!(ids("Aminoglycoside"), vec!["o1"]);
        assert_eq!(ids(NO_CLASS_ASSIGNED), vec!["o3"]);
    }

    #[tokio::test]
    async fn test_description_follows_predicate_priority() {
        let triples = [
            ("m1", "metal_comment", "toxic"),
            ("m1", "rdfs:comment", "a metal"),
        ];
        let details = assemble(&triples, "m1").await.unwrap();
        assert_eq!(details.description.as_deref(), Some("a metal"));
    }

    #[tokio::test]
    async fn test_values_sorted_by_label() {
        let triples = [
            ("g1", "has_predicted_phenotype", "p_z"),
            ("g1", "has_predicted_phenotype", "p_a"),
            ("p_z", "rdfs:label", "amikacin"),
            ("p_a", "rdfs:label", "tobramycin"),
        ];
        let details = assemble(&triples, "g1").await.unwrap();
        let labels: Vec<&str> = details.properties["Predicted Phenotype"]
            .iter()
            .map(|v| v.label.as_str())
            .collect();
        assert_eq!(labels, vec!["amikacin", "tobramycin"]);
    }
}
