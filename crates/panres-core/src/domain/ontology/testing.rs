//! Test fixtures: in-memory stores seeded with triples

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::infrastructure::ontology::SqliteTripleStore;
use crate::storage::migrations::run_migrations;

/// In-memory pool with migrations applied and `triples` inserted in order
pub async fn seeded_pool(triples: &[(&str, &str, &str)]) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    for (subject, predicate, object) in triples {
        sqlx::query("INSERT OR IGNORE INTO triples (subject, predicate, object) VALUES (?, ?, ?)")
            .bind(*subject)
            .bind(*predicate)
            .bind(*object)
            .execute(&pool)
            .await
            .expect("Failed to insert triple");
    }

    pool
}

pub async fn seeded_store(triples: &[(&str, &str, &str)]) -> SqliteTripleStore {
    SqliteTripleStore::new(seeded_pool(triples).await)
}
