//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod reconcile;
mod storage;

pub use reconcile::ReconcileConfig;
pub use storage::{SqliteConfig, StorageConfig, StorageType};

use serde::Deserialize;

use crate::error::RollupError;

/// Default configuration file name (extension resolved by the loader).
pub const DEFAULT_CONFIG_FILE: &str = "menu-rollup";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "MENU_ROLLUP_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "MENU_ROLLUP";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "MENU_ROLLUP_LOG";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Preference reconciliation configuration.
    pub reconcile: ReconcileConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `menu-rollup.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix, `__` separated
    ///    (e.g. `MENU_ROLLUP__STORAGE__PAGE_SIZE=500`)
    pub fn load(path: Option<&str>) -> Result<Self, RollupError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config: Config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| RollupError::InvalidInput(format!("configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), RollupError> {
        if self.storage.page_size == 0 {
            return Err(RollupError::InvalidInput(
                "storage.page_size must be greater than zero".to_string(),
            ));
        }
        if self.storage.timeout_ms == 0 {
            return Err(RollupError::InvalidInput(
                "storage.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.reconcile.workers == 0 {
            return Err(RollupError::InvalidInput(
                "reconcile.workers must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Create config for testing: in-memory storage, small pages.
    pub fn for_test() -> Self {
        let mut config = Self::default();
        config.storage.storage_type = StorageType::Memory;
        config.storage.page_size = 2;
        config.storage.timeout_ms = 1_000;
        config
    }
}
