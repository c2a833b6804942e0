//! Error types for PanRes Explorer

use thiserror::Error;

/// Result type alias using PanRes Explorer's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Error types with helpful messages and suggestions
///
/// A node that does not exist is not an error: lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    // Lookup errors (E001-E099)
    #[error("Category '{0}' not found. Run `panres categories` to see all categories.")]
    CategoryNotFound(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Search index error: {0}")]
    SearchIndexError(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::CategoryNotFound(_) => "E001",
            Self::DatabaseError(_) => "E400",
            Self::SearchIndexError(_) => "E401",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Parse(_) => "E801",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::CategoryNotFound(_) => Some("panres categories".to_string()),
            Self::DatabaseError(_) => Some("panres doctor".to_string()),
            Self::SearchIndexError(_) => Some("panres index rebuild".to_string()),
            Self::ConfigError(_) => Some("panres config reset".to_string()),
            _ => None,
        }
    }
}
