//! SQLite implementation of the TripleStore
//!
//! Batch lookups bind their id sets in chunks so a single statement never
//! exceeds SQLite's host parameter limit.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::domain::ontology::{
    ObjectCount, PredicateObject, StoreStats, SubjectPredicate, TripleStore, TypeConstraint,
};
use crate::error::Result;

/// Ids bound per statement in batch lookups
pub const BATCH_CHUNK_SIZE: usize = 500;

/// Filter restricting `t.subject` to subjects with a given type
const TYPE_CONSTRAINT_SQL: &str = " AND EXISTS (SELECT 1 FROM triples ty \
     WHERE ty.subject = t.subject AND ty.predicate = ? AND ty.object = ?)";

fn constraint_sql(constraint: Option<TypeConstraint<'_>>) -> &'static str {
    if constraint.is_some() {
        TYPE_CONSTRAINT_SQL
    } else {
        ""
    }
}

/// Append ` IN (?, ?, ...)` for the given ids
fn push_in_list<'args>(builder: &mut QueryBuilder<'args, Sqlite>, ids: &'args [String]) {
    builder.push(" IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");
}

/// SQLite implementation of the triple store
#[derive(Clone)]
pub struct SqliteTripleStore {
    pool: SqlitePool,
}

impl SqliteTripleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TripleStore for SqliteTripleStore {
    // ========== Node Operations ==========

    async fn outgoing(&self, subject: &str) -> Result<Vec<PredicateObject>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT predicate, object FROM triples WHERE subject = ? ORDER BY rowid",
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(predicate, object)| PredicateObject { predicate, object })
            .collect())
    }

    async fn incoming(&self, object: &str) -> Result<Vec<SubjectPredicate>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT subject, predicate FROM triples WHERE object = ? ORDER BY rowid",
        )
        .bind(object)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(subject, predicate)| SubjectPredicate { subject, predicate })
            .collect())
    }

    async fn exists_as_subject(&self, id: &str) -> Result<bool> {
        let (exists,): (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM triples WHERE subject = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists != 0)
    }

    async fn exists_as_object(&self, id: &str, predicate: Option<&str>) -> Result<bool> {
        let (exists,): (i64,) = match predicate {
            Some(predicate) => {
                sqlx::query_as(
                    "SELECT EXISTS(SELECT 1 FROM triples WHERE predicate = ? AND object = ?)",
                )
                .bind(predicate)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM triples WHERE object = ?)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(exists != 0)
    }

    // ========== Set Operations ==========

    async fn distinct_subjects(
        &self,
        predicate: &str,
        object: Option<&str>,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT t.subject FROM triples t WHERE t.predicate = ?{}{} ORDER BY t.subject",
            if object.is_some() { " AND t.object = ?" } else { "" },
            constraint_sql(constraint),
        );

        let mut query = sqlx::query_as::<_, (String,)>(&sql).bind(predicate);
        if let Some(object) = object {
            query = query.bind(object);
        }
        if let Some(c) = constraint {
            query = query.bind(c.predicate).bind(c.type_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(subject,)| subject).collect())
    }

    async fn count_distinct_subjects(
        &self,
        predicate: &str,
        object: Option<&str>,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(DISTINCT t.subject) FROM triples t WHERE t.predicate = ?{}{}",
            if object.is_some() { " AND t.object = ?" } else { "" },
            constraint_sql(constraint),
        );

        let mut query = sqlx::query_as::<_, (i64,)>(&sql).bind(predicate);
        if let Some(object) = object {
            query = query.bind(object);
        }
        if let Some(c) = constraint {
            query = query.bind(c.predicate).bind(c.type_id);
        }

        let (count,) = query.fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn distinct_objects(
        &self,
        predicate: &str,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT t.object FROM triples t WHERE t.predicate = ?{} ORDER BY t.object",
            constraint_sql(constraint),
        );

        let mut query = sqlx::query_as::<_, (String,)>(&sql).bind(predicate);
        if let Some(c) = constraint {
            query = query.bind(c.predicate).bind(c.type_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(object,)| object).collect())
    }

    async fn count_distinct_objects(
        &self,
        predicate: &str,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(DISTINCT t.object) FROM triples t WHERE t.predicate = ?{}",
            constraint_sql(constraint),
        );

        let mut query = sqlx::query_as::<_, (i64,)>(&sql).bind(predicate);
        if let Some(c) = constraint {
            query = query.bind(c.predicate).bind(c.type_id);
        }

        let (count,) = query.fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn object_distribution(
        &self,
        predicate: &str,
        constraint: Option<TypeConstraint<'_>>,
    ) -> Result<Vec<ObjectCount>> {
        let sql = format!(
            r#"
            SELECT t.object, COUNT(DISTINCT t.subject) AS subject_count
            FROM triples t
            WHERE t.predicate = ?{}
            GROUP BY t.object
            ORDER BY subject_count DESC, t.object
            "#,
            constraint_sql(constraint),
        );

        let mut query = sqlx::query_as::<_, (String, i64)>(&sql).bind(predicate);
        if let Some(c) = constraint {
            query = query.bind(c.predicate).bind(c.type_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!(predicate = %predicate, buckets = rows.len(), "Object distribution computed");

        Ok(rows
            .into_iter()
            .map(|(object, count)| ObjectCount {
                object,
                count: count as u64,
            })
            .collect())
    }

    // ========== Batch Operations ==========

    async fn first_values(
        &self,
        subjects: &[String],
        predicate: &str,
    ) -> Result<HashMap<String, String>> {
        let mut values = HashMap::with_capacity(subjects.len());
        for pair in self.values_of(subjects, predicate).await? {
            // Rows arrive in insertion order, so the first one wins
            values.entry(pair.0).or_insert(pair.1);
        }
        Ok(values)
    }

    async fn values_of(
        &self,
        subjects: &[String],
        predicate: &str,
    ) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        for chunk in subjects.chunks(BATCH_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT subject, object FROM triples WHERE predicate = ");
            builder.push_bind(predicate);
            builder.push(" AND subject");
            push_in_list(&mut builder, chunk);
            builder.push(" ORDER BY rowid");

            let rows: Vec<(String, String)> =
                builder.build_query_as().fetch_all(&self.pool).await?;
            pairs.extend(rows);
        }
        Ok(pairs)
    }

    async fn existing_subjects(&self, ids: &[String]) -> Result<HashSet<String>> {
        let mut found = HashSet::new();
        for chunk in ids.chunks(BATCH_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT DISTINCT subject FROM triples WHERE subject");
            push_in_list(&mut builder, chunk);

            let rows: Vec<(String,)> = builder.build_query_as().fetch_all(&self.pool).await?;
            found.extend(rows.into_iter().map(|(subject,)| subject));
        }
        Ok(found)
    }

    async fn objects_in(&self, ids: &[String], predicate: &str) -> Result<HashSet<String>> {
        let mut found = HashSet::new();
        for chunk in ids.chunks(BATCH_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT DISTINCT object FROM triples WHERE predicate = ");
            builder.push_bind(predicate);
            builder.push(" AND object");
            push_in_list(&mut builder, chunk);

            let rows: Vec<(String,)> = builder.build_query_as().fetch_all(&self.pool).await?;
            found.extend(rows.into_iter().map(|(object,)| object));
        }
        Ok(found)
    }

    // ========== Statistics ==========

    async fn stats(&self) -> Result<StoreStats> {
        let (triples, subjects, predicates): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(DISTINCT subject), COUNT(DISTINCT predicate) FROM triples",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            triples: triples as u64,
            subjects: subjects as u64,
            predicates: predicates as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ontology::testing::seeded_store;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_outgoing_and_incoming_keep_insertion_order() {
        let store = seeded_store(&[
            ("g1", "rdf:type", "PanGene"),
            ("g1", "rdfs:label", "gene one"),
            ("g2", "member_of", "g1"),
            ("g3", "member_of", "g1"),
        ])
        .await;

        let outgoing = store.outgoing("g1").await.unwrap();
        assert_eq!(outgoing.len(), 2);
        assert_eq!(outgoing[0].predicate, "rdf:type");

        let incoming = store.incoming("g1").await.unwrap();
        let subjects: Vec<&str> = incoming.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["g2", "g3"]);

        assert!(store.outgoing("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existence_probes() {
        let store = seeded_store(&[("g1", "has_resistance_class", "beta_lactam")]).await;

        assert!(store.exists_as_subject("g1").await.unwrap());
        assert!(!store.exists_as_subject("beta_lactam").await.unwrap());
        assert!(store.exists_as_object("beta_lactam", None).await.unwrap());
        assert!(store
            .exists_as_object("beta_lactam", Some("has_resistance_class"))
            .await
            .unwrap());
        assert!(!store
            .exists_as_object("beta_lactam", Some("has_predicted_phenotype"))
            .await
            .unwrap());
        assert!(store.node_exists("beta_lactam").await.unwrap());
        assert!(!store.node_exists("nothing").await.unwrap());
    }

    #[tokio::test]
    async fn test_distinct_sets_with_type_constraint() {
        let store = seeded_store(&[
            ("o1", "rdf:type", "OriginalGene"),
            ("o1", "is_from_database", "DB1"),
            ("o2", "rdf:type", "OriginalGene"),
            ("o2", "is_from_database", "DB2"),
            ("p1", "is_from_database", "DB3"),
        ])
        .await;
        let constraint = TypeConstraint::new("rdf:type", "OriginalGene");

        let objects = store
            .distinct_objects("is_from_database", Some(constraint))
            .await
            .unwrap();
        assert_eq!(objects, vec!["DB1", "DB2"]);
        assert_eq!(
            store
                .count_distinct_objects("is_from_database", Some(constraint))
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .count_distinct_objects("is_from_database", None)
                .await
                .unwrap(),
            3
        );

        let subjects = store
            .distinct_subjects("is_from_database", Some("DB1"), Some(constraint))
            .await
            .unwrap();
        assert_eq!(subjects, vec!["o1"]);
        assert_eq!(
            store
                .count_distinct_subjects("rdf:type", Some("OriginalGene"), None)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_object_distribution_orders_by_count_then_object() {
        let store = seeded_store(&[
            ("g1", "has_resistance_class", "b"),
            ("g2", "has_resistance_class", "b"),
            ("g1", "has_resistance_class", "a"),
            ("g3", "has_resistance_class", "c"),
        ])
        .await;

        let rows = store
            .object_distribution("has_resistance_class", None)
            .await
            .unwrap();
        let flat: Vec<(&str, u64)> = rows.iter().map(|r| (r.object.as_str(), r.count)).collect();
        assert_eq!(flat, vec![("b", 2), ("a", 1), ("c", 1)]);
    }

    #[tokio::test]
    async fn test_batch_lookups_span_multiple_chunks() {
        let names: Vec<String> = (0..(BATCH_CHUNK_SIZE + 20))
            .map(|i| format!("n{:04}", i))
            .collect();
        let triples: Vec<(String, String, String)> = names
            .iter()
            .map(|n| (n.clone(), "rdfs:label".to_string(), format!("label {}", n)))
            .collect();
        let borrowed: Vec<(&str, &str, &str)> = triples
            .iter()
            .map(|(s, p, o)| (s.as_str(), p.as_str(), o.as_str()))
            .collect();
        let store = seeded_store(&borrowed).await;

        let labels = store.first_values(&names, "rdfs:label").await.unwrap();
        assert_eq!(labels.len(), names.len());
        assert_eq!(labels["n0510"], "label n0510");

        let existing = store.existing_subjects(&names).await.unwrap();
        assert_eq!(existing.len(), names.len());
    }

    #[tokio::test]
    async fn test_batch_lookups_tolerate_empty_input() {
        let store = seeded_store(&[("g1", "rdfs:label", "x")]).await;
        assert!(store.first_values(&[], "rdfs:label").await.unwrap().is_empty());
        assert!(store.existing_subjects(&[]).await.unwrap().is_empty());
        assert!(store.objects_in(&[], "p").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_objects_in_and_values_of() {
        let store = seeded_store(&[
            ("g1", "has_resistance_class", "c1"),
            ("g1", "has_resistance_class", "c2"),
            ("g2", "has_predicted_phenotype", "c1"),
        ])
        .await;

        let classes = store
            .objects_in(&ids(&["c1", "c2", "c3"]), "has_resistance_class")
            .await
            .unwrap();
        assert_eq!(classes.len(), 2);

        let pairs = store
            .values_of(&ids(&["g1", "g2"]), "has_resistance_class")
            .await
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("g1".to_string(), "c1".to_string()),
                ("g1".to_string(), "c2".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_stats() {
        let store = seeded_store(&[
            ("g1", "rdf:type", "PanGene"),
            ("g1", "rdfs:label", "x"),
            ("g2", "rdf:type", "PanGene"),
        ])
        .await;

        let stats = store.stats().await.unwrap();
        assert_eq!(
            stats,
            StoreStats {
                triples: 3,
                subjects: 2,
                predicates: 2
            }
        );
    }
}
