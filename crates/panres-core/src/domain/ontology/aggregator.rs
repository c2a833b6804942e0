//! Category counts, listings and chart distributions

use tracing::debug;

use crate::error::{Error, Result};

use super::category::{find_category, Category, CategoryQuery};
use super::grouping::{bucket_members, Buckets, Memberships};
use super::repository::{TripleStore, TypeConstraint};
use super::resolver::{dedup_preserving_order, LabelMap, LabelResolver};
use super::view::{
    CategoryCount, CategoryListing, ChartData, GroupedGeneListing, ItemGroup, ListedItem,
    NO_CLASS_ASSIGNED, NO_PHENOTYPE_ASSIGNED, OTHERS_LABEL,
};
use super::vocabulary::Vocabulary;

pub struct CategoryAggregator<'a, S: TripleStore + ?Sized> {
    store: &'a S,
    vocabulary: &'a Vocabulary,
    categories: &'a [Category],
    palette: &'a [String],
}

impl<'a, S: TripleStore + ?Sized> CategoryAggregator<'a, S> {
    pub fn new(
        store: &'a S,
        vocabulary: &'a Vocabulary,
        categories: &'a [Category],
        palette: &'a [String],
    ) -> Self {
        Self {
            store,
            vocabulary,
            categories,
            palette,
        }
    }

    fn resolver(&self) -> LabelResolver<'a, S> {
        LabelResolver::new(self.store, &self.vocabulary.label_predicate)
    }

    fn type_constraint<'c>(&'c self, type_id: Option<&'c str>) -> Option<TypeConstraint<'c>> {
        type_id.map(|t| TypeConstraint::new(&self.vocabulary.type_predicate, t))
    }

    /// Number of members of a category
    pub async fn count(&self, category: &Category) -> Result<u64> {
        let constraint = self.type_constraint(category.subject_type.as_deref());
        match category.query_type {
            CategoryQuery::ByType => {
                self.store
                    .count_distinct_subjects(
                        &self.vocabulary.type_predicate,
                        Some(category.value.as_str()),
                        constraint,
                    )
                    .await
            }
            CategoryQuery::DistinctObjectsOfPredicate => {
                self.store
                    .count_distinct_objects(&category.value, constraint)
                    .await
            }
            CategoryQuery::DistinctSubjectsOfPredicate => {
                self.store
                    .count_distinct_subjects(&category.value, None, constraint)
                    .await
            }
        }
    }

    /// Counts for every configured category, in configuration order
    pub async fn counts(&self) -> Result<Vec<CategoryCount>> {
        let mut counts = Vec::with_capacity(self.categories.len());
        for category in self.categories {
            counts.push(CategoryCount {
                key: category.key.clone(),
                name: category.name.clone(),
                count: self.count(category).await?,
            });
        }
        Ok(counts)
    }

    /// Members of a category, sorted by label
    pub async fn list(&self, category: &Category) -> Result<CategoryListing> {
        let constraint = self.type_constraint(category.subject_type.as_deref());

        let (ids, links) = match category.query_type {
            CategoryQuery::ByType => {
                let ids = self
                    .store
                    .distinct_subjects(
                        &self.vocabulary.type_predicate,
                        Some(category.value.as_str()),
                        constraint,
                    )
                    .await?;
                (ids, None)
            }
            CategoryQuery::DistinctObjectsOfPredicate => {
                let ids = self
                    .store
                    .distinct_objects(&category.value, constraint)
                    .await?;
                // Object values may be literals without a page of their own
                let links = self.store.existing_subjects(&ids).await?;
                (ids, Some(links))
            }
            CategoryQuery::DistinctSubjectsOfPredicate => {
                let ids = self
                    .store
                    .distinct_subjects(&category.value, None, constraint)
                    .await?;
                (ids, None)
            }
        };

        let labels = self.resolver().resolve_labels(&ids).await?;
        let items: Vec<ListedItem> = ids
            .iter()
            .map(|id| ListedItem {
                id: id.clone(),
                label: labels.get(id).to_string(),
                is_link: links.as_ref().is_none_or(|l| l.contains(id)),
            })
            .collect();

        debug!(category = %category.key, items = items.len(), "Category listed");
        Ok(CategoryListing {
            key: category.key.clone(),
            name: category.name.clone(),
            items: sort_by_label(items),
        })
    }

    /// Look up a category by key and list it
    pub async fn list_by_key(&self, key: &str) -> Result<CategoryListing> {
        let category = find_category(self.categories, key)
            .ok_or_else(|| Error::CategoryNotFound(key.to_string()))?;
        self.list(category).await
    }

    /// Primary-type genes bucketed by resistance class and by phenotype
    pub async fn grouped_gene_listing(&self) -> Result<GroupedGeneListing> {
        let vocab = self.vocabulary;
        let resolver = self.resolver();

        let genes = self
            .store
            .distinct_subjects(
                &vocab.type_predicate,
                Some(vocab.primary_gene_type.as_str()),
                None,
            )
            .await?;
        let labels = resolver.resolve_labels(&genes).await?;
        let items = sort_by_label(
            genes
                .iter()
                .map(|id| ListedItem {
                    id: id.clone(),
                    label: labels.get(id).to_string(),
                    is_link: true,
                })
                .collect(),
        );

        let by_class = self
            .memberships(&genes, &vocab.resistance_class_predicate)
            .await?;
        let by_phenotype = self.memberships(&genes, &vocab.phenotype_predicate).await?;

        let listing = GroupedGeneListing {
            by_class: into_groups(
                bucket_members(&items, |i| i.id.as_str(), &by_class),
                NO_CLASS_ASSIGNED,
            ),
            by_phenotype: into_groups(
                bucket_members(&items, |i| i.id.as_str(), &by_phenotype),
                NO_PHENOTYPE_ASSIGNED,
            ),
            total: genes.len(),
        };

        debug!(
            genes = listing.total,
            class_buckets = listing.by_class.len(),
            phenotype_buckets = listing.by_phenotype.len(),
            "Gene listing grouped"
        );
        Ok(listing)
    }

    async fn memberships(&self, genes: &[String], predicate: &str) -> Result<Memberships> {
        let pairs = self.store.values_of(genes, predicate).await?;
        let values: Vec<String> = pairs.iter().map(|(_, v)| v.clone()).collect();
        let labels = self
            .resolver()
            .resolve_labels(&dedup_preserving_order(&values))
            .await?;
        Ok(Memberships::from_pairs(&pairs, &labels))
    }

    /// Distinct subjects per object of `predicate`, folded to top-N + "Others"
    pub async fn chart_distribution(
        &self,
        predicate: &str,
        subject_type: Option<&str>,
        top_n: usize,
        show_all: bool,
    ) -> Result<ChartData> {
        let constraint = self.type_constraint(subject_type);
        let rows = self.store.object_distribution(predicate, constraint).await?;

        let total: u64 = rows.iter().map(|r| r.count).sum();
        let truncated = !show_all && rows.len() > top_n;
        let kept = if truncated { &rows[..top_n] } else { &rows[..] };

        let objects: Vec<String> = kept.iter().map(|r| r.object.clone()).collect();
        let labels: LabelMap = self.resolver().resolve_labels(&objects).await?;

        let mut chart_labels: Vec<String> =
            objects.iter().map(|o| labels.get(o).to_string()).collect();
        let mut values: Vec<u64> = kept.iter().map(|r| r.count).collect();

        if truncated {
            let others = total - values.iter().sum::<u64>();
            if others > 0 {
                chart_labels.push(OTHERS_LABEL.to_string());
                values.push(others);
            }
        }

        let colors = self
            .palette
            .iter()
            .cycle()
            .take(chart_labels.len())
            .cloned()
            .collect();

        debug!(
            predicate = %predicate,
            buckets = rows.len(),
            shown = chart_labels.len(),
            total = total,
            "Chart distribution built"
        );
        Ok(ChartData {
            labels: chart_labels,
            values,
            colors,
            total,
        })
    }
}

fn sort_by_label(mut items: Vec<ListedItem>) -> Vec<ListedItem> {
    items.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    items
}

/// Named buckets in key order, then the unassigned bucket if non-empty
fn into_groups(buckets: Buckets<ListedItem>, unassigned_key: &str) -> Vec<ItemGroup> {
    let mut groups: Vec<ItemGroup> = buckets
        .named
        .into_iter()
        .map(|(key, items)| ItemGroup { key, items })
        .collect();
    if !buckets.unassigned.is_empty() {
        groups.push(ItemGroup {
            key: unassigned_key.to_string(),
            items: buckets.unassigned,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ontology::category::default_categories;
    use crate::domain::ontology::testing::seeded_store;
    use crate::infrastructure::ontology::SqliteTripleStore;

    fn palette() -> Vec<String> {
        vec!["#111".to_string(), "#222".to_string(), "#333".to_string()]
    }

    struct Fixture {
        store: SqliteTripleStore,
        vocabulary: Vocabulary,
        categories: Vec<Category>,
        palette: Vec<String>,
    }

    impl Fixture {
        async fn new(triples: &[(&str, &str, &str)]) -> Self {
            Self {
                store: seeded_store(triples).await,
                vocabulary: Vocabulary::default(),
                categories: default_categories(),
                palette: palette(),
            }
        }

        fn aggregator(&self) -> CategoryAggregator<'_, SqliteTripleStore> {
            CategoryAggregator::new(
                &self.store,
                &self.vocabulary,
                &self.categories,
                &self.palette,
            )
        }
    }

    fn database_fixture() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("o1", "rdf:type", "OriginalGene"),
            ("o1", "is_from_database", "DB1"),
            ("o2", "rdf:type", "OriginalGene"),
            ("o2", "is_from_database", "DB1"),
            ("o3", "rdf:type", "OriginalGene"),
            ("o3", "is_from_database", "DB1"),
            ("o4", "rdf:type", "OriginalGene"),
            ("o4", "is_from_database", "DB2"),
            // Not an OriginalGene
            ("x1", "is_from_database", "DB3"),
            ("DB1", "rdfs:label", "DB1"),
        ]
    }

    #[tokio::test]
    async fn test_source_database_count_and_list() {
        let fixture = Fixture::new(&database_fixture()).await;
        let aggregator = fixture.aggregator();
        let category = find_category(&fixture.categories, "source_databases").unwrap();

        assert_eq!(aggregator.count(category).await.unwrap(), 2);

        let listing = aggregator.list(category).await.unwrap();
        let ids: Vec<&str> = listing.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["DB1", "DB2"]);
        // DB1 is a subject, DB2 only a literal object
        assert!(listing.items[0].is_link);
        assert!(!listing.items[1].is_link);
    }

    #[tokio::test]
    async fn test_count_matches_list_length() {
        let fixture = Fixture::new(&[
            ("g1", "rdf:type", "PanGene"),
            ("g2", "rdf:type", "PanGene"),
            ("g1", "translates_to", "prot1"),
            ("g2", "translates_to", "prot2"),
            ("g2", "translates_to", "prot3"),
        ])
        .await;
        let aggregator = fixture.aggregator();

        for key in ["pan_genes", "translated_genes", "gene_clusters"] {
            let category = find_category(&fixture.categories, key).unwrap();
            let count = aggregator.count(category).await.unwrap();
            let listing = aggregator.list(category).await.unwrap();
            assert_eq!(count as usize, listing.items.len(), "category {}", key);
        }
    }

    #[tokio::test]
    async fn test_counts_follow_configuration_order() {
        let fixture = Fixture::new(&[("g1", "rdf:type", "PanGene")]).await;
        let counts = fixture.aggregator().counts().await.unwrap();

        let keys: Vec<&str> = counts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys[0], "pan_genes");
        assert_eq!(counts.len(), fixture.categories.len());
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 0);
    }

    #[tokio::test]
    async fn test_list_by_unknown_key() {
        let fixture = Fixture::new(&[]).await;
        let err = fixture.aggregator().list_by_key("nope").await.unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound(ref k) if k == "nope"));
    }

    #[tokio::test]
    async fn test_list_sorted_by_label() {
        let fixture = Fixture::new(&[
            ("g1", "rdf:type", "PanGene"),
            ("g1", "rdfs:label", "zeta"),
            ("g2", "rdf:type", "PanGene"),
            ("g2", "rdfs:label", "alpha"),
        ])
        .await;
        let listing = fixture.aggregator().list_by_key("pan_genes").await.unwrap();
        let labels: Vec<&str> = listing.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["alpha", "zeta"]);
        assert!(listing.items.iter().all(|i| i.is_link));
    }

    #[tokio::test]
    async fn test_grouped_gene_listing() {
        let fixture = Fixture::new(&[
            ("g1", "rdf:type", "PanGene"),
            ("g1", "rdfs:label", "gene b"),
            ("g1", "has_resistance_class", "beta_lactam"),
            ("g1", "has_predicted_phenotype", "ampicillin"),
            ("g2", "rdf:type", "PanGene"),
            ("g2", "rdfs:label", "gene a"),
            ("g2", "has_resistance_class", "beta_lactam"),
            ("g2", "has_resistance_class", "aminoglycoside"),
            ("g3", "rdf:type", "PanGene"),
            ("g3", "rdfs:label", "gene c"),
            ("beta_lactam", "rdfs:label", "beta-lactam"),
        ])
        .await;
        let listing = fixture.aggregator().grouped_gene_listing().await.unwrap();

        assert_eq!(listing.total, 3);

        let class_keys: Vec<&str> = listing.by_class.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(class_keys, vec!["aminoglycoside", "beta-lactam", NO_CLASS_ASSIGNED]);
        let beta: Vec<&str> = listing.by_class[1]
            .items
            .iter()
            .map(|i| i.label.as_str())
            .collect();
        assert_eq!(beta, vec!["gene a", "gene b"]);

        let phenotype_keys: Vec<&str> = listing
            .by_phenotype
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(phenotype_keys, vec!["ampicillin", NO_PHENOTYPE_ASSIGNED]);
        assert_eq!(listing.by_phenotype[1].items.len(), 2);
    }

    #[tokio::test]
    async fn test_grouped_listing_without_unassigned_genes() {
        let fixture = Fixture::new(&[
            ("g1", "rdf:type", "PanGene"),
            ("g1", "has_resistance_class", "c1"),
            ("g1", "has_predicted_phenotype", "p1"),
        ])
        .await;
        let listing = fixture.aggregator().grouped_gene_listing().await.unwrap();
        assert_eq!(listing.by_class.len(), 1);
        assert_eq!(listing.by_phenotype.len(), 1);
    }

    async fn chart_fixture() -> Fixture {
        // Object v{i} is used by i+1 distinct genes
        let mut triples = Vec::new();
        for i in 0..9 {
            for g in 0..=i {
                triples.push((
                    format!("g{}", g),
                    "has_resistance_class".to_string(),
                    format!("v{}", i),
                ));
            }
        }
        let borrowed: Vec<(&str, &str, &str)> = triples
            .iter()
            .map(|(s, p, o)| (s.as_str(), p.as_str(), o.as_str()))
            .collect();
        Fixture::new(&borrowed).await
    }

    #[tokio::test]
    async fn test_chart_top_n_with_others() {
        let fixture = chart_fixture().await;
        let chart = fixture
            .aggregator()
            .chart_distribution("has_resistance_class", None, 7, false)
            .await
            .unwrap();

        assert_eq!(chart.labels.len(), 8);
        assert_eq!(chart.labels[0], "v8");
        assert_eq!(chart.labels[7], OTHERS_LABEL);
        // The two smallest counts are 1 and 2
        assert_eq!(chart.values[7], 3);
        assert_eq!(chart.total, 45);
        assert_eq!(chart.values.iter().sum::<u64>(), chart.total);
        assert_eq!(chart.colors.len(), 8);
        assert_eq!(chart.colors[3], "#111");
    }

    #[tokio::test]
    async fn test_chart_show_all() {
        let fixture = chart_fixture().await;
        let chart = fixture
            .aggregator()
            .chart_distribution("has_resistance_class", None, 7, true)
            .await
            .unwrap();

        assert_eq!(chart.labels.len(), 9);
        assert!(!chart.labels.contains(&OTHERS_LABEL.to_string()));
        assert_eq!(chart.values.iter().sum::<u64>(), chart.total);
    }

    #[tokio::test]
    async fn test_chart_with_subject_type_and_labels() {
        let fixture = Fixture::new(&[
            ("g1", "rdf:type", "PanGene"),
            ("g1", "has_resistance_class", "beta_lactam"),
            ("g2", "has_resistance_class", "beta_lactam"),
            ("beta_lactam", "rdfs:label", "beta-lactam"),
        ])
        .await;
        let chart = fixture
            .aggregator()
            .chart_distribution("has_resistance_class", Some("PanGene"), 7, false)
            .await
            .unwrap();

        assert_eq!(chart.labels, vec!["beta-lactam"]);
        assert_eq!(chart.values, vec![1]);
        assert_eq!(chart.total, 1);
    }

    #[tokio::test]
    async fn test_chart_empty_distribution() {
        let fixture = Fixture::new(&[]).await;
        let chart = fixture
            .aggregator()
            .chart_distribution("has_resistance_class", None, 7, false)
            .await
            .unwrap();
        assert!(chart.labels.is_empty());
        assert_eq!(chart.total, 0);
    }
}
