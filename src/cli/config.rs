//! Configuration file
//!
//! ```json
//! { "data_dir": "./campus-data", "initial_capacity": 100, "log_level": "warn" }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::catalog::CatalogOptions;
use crate::observability::Severity;
use crate::store::StoreConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the entity files (required)
    pub data_dir: String,

    /// Hash table slots per store before the first growth
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Entries each secondary index may hold
    #[serde(default = "default_secondary_index_capacity")]
    pub secondary_index_capacity: usize,

    /// Phone numbers allowed per instructor
    #[serde(default = "default_max_phone_numbers")]
    pub max_phone_numbers: usize,

    /// Minimum log severity: trace, info, warn, error or off
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_initial_capacity() -> usize {
    100
}
fn default_secondary_index_capacity() -> usize {
    100
}
fn default_max_phone_numbers() -> usize {
    3
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        if self.initial_capacity == 0 {
            return Err(CliError::config_error("initial_capacity must be > 0"));
        }
        if self.max_phone_numbers == 0 {
            return Err(CliError::config_error("max_phone_numbers must be > 0"));
        }
        self.severity()?;
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            store: StoreConfig {
                initial_capacity: self.initial_capacity,
                secondary_capacity: self.secondary_index_capacity,
            },
            max_phone_numbers: self.max_phone_numbers,
        }
    }
}
