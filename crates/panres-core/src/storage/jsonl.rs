//! JSONL import/export of the triple relation
//!
//! One triple per line:
//!
//! ```text
//! {"subject":"g1","predicate":"rdf:type","object":"PanGene"}
//! {"subject":"g1","predicate":"rdfs:label","object":"blaTEM-1"}
//! ```
//!
//! Import is a load-time tool standing in for the ingestion pipeline; the
//! query layer never writes. Exports are sorted so two dumps of the same
//! store diff cleanly.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Warnings kept in an import report; further malformed lines are only counted
pub const MAX_REPORTED_WARNINGS: usize = 50;

/// One line of a triple file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TripleRecord {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// Result of an import operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    /// Triples written
    pub inserted: usize,
    /// Triples already present
    pub duplicates: usize,
    /// Lines that could not be parsed
    pub malformed: usize,
    pub warnings: Vec<String>,
}

/// Result of an export operation
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub path: PathBuf,
    pub triples: usize,
}

/// Import triples from a JSONL file in a single transaction
///
/// Blank lines are skipped; malformed lines are reported as warnings and do
/// not abort the import.
pub async fn import_triples(pool: &SqlitePool, path: &Path) -> Result<ImportResult> {
    if !path.exists() {
        return Err(Error::InvalidInput(format!(
            "Triple file not found: {}",
            path.display()
        )));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut result = ImportResult::default();
    let mut tx = pool.begin().await?;

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                result.malformed += 1;
                if result.warnings.len() < MAX_REPORTED_WARNINGS {
                    result.warnings.push(format!("line {}: invalid UTF-8: {}", index + 1, e));
                }
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let record = match parse_line(line.trim_end_matches('\r')) {
            Ok(record) => record,
            Err(e) => {
                result.malformed += 1;
                if result.warnings.len() < MAX_REPORTED_WARNINGS {
                    result.warnings.push(format!("line {}: {}", index + 1, e));
                }
                continue;
            }
        };

        let outcome = sqlx::query(
            "INSERT OR IGNORE INTO triples (subject, predicate, object) VALUES (?, ?, ?)",
        )
        .bind(&record.subject)
        .bind(&record.predicate)
        .bind(&record.object)
        .execute(&mut *tx)
        .await?;

        if outcome.rows_affected() > 0 {
            result.inserted += 1;
        } else {
            result.duplicates += 1;
        }
    }

    tx.commit().await?;

    if result.malformed > 0 {
        warn!(
            path = %path.display(),
            malformed = result.malformed,
            "Skipped malformed triple lines"
        );
    }
    info!(
        path = %path.display(),
        inserted = result.inserted,
        duplicates = result.duplicates,
        "Triples imported"
    );
    Ok(result)
}

fn parse_line(line: &str) -> Result<TripleRecord> {
    let record: TripleRecord =
        serde_json::from_str(line).map_err(|e| Error::Parse(format!("Invalid JSON: {}", e)))?;

    if record.subject.is_empty() || record.predicate.is_empty() {
        return Err(Error::Parse(
            "subject and predicate must not be empty".to_string(),
        ));
    }
    Ok(record)
}

/// Export all triples to a JSONL file, sorted by (subject, predicate, object)
pub async fn export_triples(pool: &SqlitePool, path: &Path) -> Result<ExportResult> {
    let records: Vec<TripleRecord> = sqlx::query_as(
        "SELECT subject, predicate, object FROM triples ORDER BY subject, predicate, object",
    )
    .fetch_all(pool)
    .await?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for record in &records {
        let line = serde_json::to_string(record)
            .map_err(|e| Error::Other(format!("Failed to serialize triple: {}", e)))?;
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    info!(path = %path.display(), triples = records.len(), "Triples exported");
    Ok(ExportResult {
        path: path.to_path_buf(),
        triples: records.len(),
    })
}
