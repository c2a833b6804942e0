//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ontology::{Category, Vocabulary, default_categories, validate_categories};
use crate::error::{Error, Result};
use crate::storage::{DATABASE_ENV_VAR, DatabaseConfig, default_database_path};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV_VAR: &str = "PANRES_CONFIG_DIR";

/// PanRes Explorer configuration
///
/// Built once at startup and shared read-only by every query component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: StoreConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub ontology: Vocabulary,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; falls back to the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Suggestions returned when the caller gives no limit
    pub autocomplete_limit: usize,
    /// Shorter queries return no suggestions
    pub min_query_len: usize,
    /// Index hits fetched per requested suggestion
    pub overfetch_factor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Entries kept before folding the rest into "Others"
    pub top_n: usize,
    /// Colors assigned to chart entries in order, cycled
    pub palette: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: StoreConfig::default(),
            search: SearchConfig::default(),
            charts: ChartConfig::default(),
            ontology: Vocabulary::default(),
            categories: default_categories(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            autocomplete_limit: 10,
            min_query_len: 2,
            overfetch_factor: 2,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_n: 7,
            palette: [
                "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1",
                "#ff9da7", "#9c755f", "#bab0ac",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("panres")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or use defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            // Return default config without creating file
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return invalid("database.max_connections must be at least 1");
        }
        if self.search.autocomplete_limit == 0 {
            return invalid("search.autocomplete_limit must be at least 1");
        }
        if self.search.min_query_len == 0 {
            return invalid("search.min_query_len must be at least 1");
        }
        if self.search.overfetch_factor == 0 {
            return invalid("search.overfetch_factor must be at least 1");
        }
        if self.charts.top_n == 0 {
            return invalid("charts.top_n must be at least 1");
        }
        if self.charts.palette.is_empty() {
            return invalid("charts.palette must contain at least one color");
        }
        self.ontology.validate().map_err(Error::ConfigError)?;
        validate_categories(&self.categories).map_err(Error::ConfigError)?;
        Ok(())
    }

    /// Resolve the database path
    ///
    /// Order: explicit override, `PANRES_DATABASE`, `database.path`, platform
    /// data directory.
    pub fn database_path(&self, override_path: Option<&Path>) -> PathBuf {
        if let Some(path) = override_path {
            return path.to_path_buf();
        }
        if let Ok(path) = env::var(DATABASE_ENV_VAR) {
            return PathBuf::from(path);
        }
        self.database
            .path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Pool settings for the resolved database path
    pub fn database_config(&self, override_path: Option<&Path>) -> DatabaseConfig {
        DatabaseConfig::with_path(self.database_path(override_path))
            .max_connections(self.database.max_connections)
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "database.path" => Ok(self
                .database
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string())),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),
            "search.autocomplete_limit" => Ok(self.search.autocomplete_limit.to_string()),
            "search.min_query_len" => Ok(self.search.min_query_len.to_string()),
            "search.overfetch_factor" => Ok(self.search.overfetch_factor.to_string()),
            "charts.top_n" => Ok(self.charts.top_n.to_string()),
            "charts.palette" => Ok(self.charts.palette.join(", ")),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `panres config show` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "database.path" => {
                self.database.path = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "database.max_connections" => {
                self.database.max_connections = parse_positive(key, value)? as u32;
            }
            "search.autocomplete_limit" => {
                self.search.autocomplete_limit = parse_positive(key, value)?;
            }
            "search.min_query_len" => {
                self.search.min_query_len = parse_positive(key, value)?;
            }
            "search.overfetch_factor" => {
                self.search.overfetch_factor = parse_positive(key, value)?;
            }
            "charts.top_n" => {
                self.charts.top_n = parse_positive(key, value)?;
            }
            "charts.palette" => {
                let palette: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if palette.is_empty() {
                    return Err(anyhow!("charts.palette must contain at least one color"));
                }
                self.charts.palette = palette;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `panres config show` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all scalar configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "database.path",
            "database.max_connections",
            "search.autocomplete_limit",
            "search.min_query_len",
            "search.overfetch_factor",
            "charts.top_n",
            "charts.palette",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Result<()> {
    Err(Error::ConfigError(message.to_string()))
}

fn parse_positive(key: &str, value: &str) -> anyhow::Result<usize> {
    let parsed: usize = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value: {}", key, value))?;
    if parsed == 0 {
        return Err(anyhow!("{} must be at least 1", key));
    }
    Ok(parsed)
}
