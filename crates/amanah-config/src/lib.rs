//! # amanah-config
//!
//! Layered configuration loading for Amanah using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`AMANAH_*` prefix, `__` as separator)
//! 2. Project-level `.amanah/config.toml`
//! 3. User-level `~/.config/amanah/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `AMANAH_DATABASE__PATH` -> `database.path`,
//! `AMANAH_LEDGER__RECONCILIATION_TOLERANCE` -> `ledger.reconciliation_tolerance`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use amanah_config::AmanahConfig;
//!
//! let config = AmanahConfig::load_with_dotenv().expect("config");
//! println!("ledger database: {}", config.database.path);
//! ```

mod audit;
mod database;
mod error;
mod ledger;
mod migration;
mod retry;

pub use audit::AuditConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use ledger::LedgerConfig;
pub use migration::{BackfillConfig, DEFAULT_LIABILITY_MAP, MigrationConfig};
pub use retry::RetrySettings;

use amanah_core::money::MAX_MINOR_UNIT_DIGITS;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AmanahConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
    #[serde(default)]
    pub backfill: BackfillConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl AmanahConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".amanah/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("AMANAH_").split("__"))
    }

    /// Reject values the ledger cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.minor_unit_digits > MAX_MINOR_UNIT_DIGITS {
            return Err(invalid(
                "ledger.minor_unit_digits",
                format!("must be at most {MAX_MINOR_UNIT_DIGITS}"),
            ));
        }
        if self.ledger.reconciliation_tolerance < Decimal::ZERO {
            return Err(invalid(
                "ledger.reconciliation_tolerance",
                "must not be negative".into(),
            ));
        }
        if self.ledger.entry_number_prefix.trim().is_empty() {
            return Err(invalid(
                "ledger.entry_number_prefix",
                "must not be empty".into(),
            ));
        }
        if self.audit.max_per_page == 0 || self.audit.default_per_page == 0 {
            return Err(invalid("audit", "page sizes must be positive".into()));
        }
        if self.audit.default_per_page > self.audit.max_per_page {
            return Err(invalid(
                "audit.default_per_page",
                "must not exceed audit.max_per_page".into(),
            ));
        }
        if self.migration.batch_size == 0 {
            return Err(invalid("migration.batch_size", "must be positive".into()));
        }
        for (from, to) in &self.migration.liability_map {
            if from == to || to.trim().is_empty() {
                return Err(invalid(
                    "migration.liability_map",
                    format!("'{from}' must map to a different, non-empty code"),
                ));
            }
        }
        if let Some(code) = self.migration.chained_code() {
            return Err(invalid(
                "migration.liability_map",
                format!("'{code}' is both a source and a target"),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1".into()));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("amanah").join("config.toml"))
    }
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason,
    }
}
