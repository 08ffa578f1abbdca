//! Service layer orchestrating ledger reads, postings, and batch jobs.
//!
//! `LedgerService` wraps `LedgerDb` (raw database access), the loaded
//! configuration, `TrailWriter` (JSONL run trail), and `SchemaRegistry`
//! (validation of imported JSON). All repo and job methods are implemented
//! as `impl LedgerService`.

use std::path::PathBuf;

use amanah_config::AmanahConfig;
use amanah_core::money::MinorUnits;
use amanah_schema::SchemaRegistry;
use libsql::{Connection, Transaction, TransactionBehavior};

use crate::LedgerDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;
use crate::trail::writer::TrailWriter;

/// Ledger operations over one database.
///
/// Every mutation follows this protocol:
/// 1. Validate everything that needs no store access
/// 2. Acquire the write gate and `BEGIN IMMEDIATE`
/// 3. Execute SQL, re-checking rules that need the store
/// 4. Commit, or roll back on the first error
pub struct LedgerService {
    db: LedgerDb,
    config: AmanahConfig,
    retry: RetryConfig,
    trail: TrailWriter,
    schema: SchemaRegistry,
}

impl LedgerService {
    /// Open the database named by `config.database` and build the service.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the configuration is invalid, the database
    /// cannot be opened, or the trail directory cannot be created.
    pub async fn new_local(config: &AmanahConfig) -> Result<Self, DatabaseError> {
        config
            .validate()
            .map_err(|e| DatabaseError::Other(e.into()))?;
        let units = MinorUnits::new(config.ledger.minor_unit_digits)?;
        let db = LedgerDb::open_local(
            &config.database.path,
            config.database.busy_timeout_ms,
            units,
        )
        .await?;
        let trail = if config.migration.trail_enabled() {
            TrailWriter::new(PathBuf::from(&config.migration.trail_dir))?
        } else {
            TrailWriter::disabled()
        };
        Ok(Self::from_db(db, config.clone(), trail))
    }

    /// Create from an existing `LedgerDb` (for testing).
    #[must_use]
    pub fn from_db(db: LedgerDb, config: AmanahConfig, trail: TrailWriter) -> Self {
        Self {
            db,
            retry: RetryConfig::from(&config.retry),
            config,
            trail,
            schema: SchemaRegistry::new(),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LedgerDb {
        &self.db
    }

    #[must_use]
    pub const fn config(&self) -> &AmanahConfig {
        &self.config
    }

    /// Precision amounts are stored with.
    #[must_use]
    pub const fn units(&self) -> MinorUnits {
        self.db.units()
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Access the trail writer.
    #[must_use]
    pub const fn trail(&self) -> &TrailWriter {
        &self.trail
    }

    /// Access the schema registry.
    #[must_use]
    pub const fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }
}

/// Open a write transaction that takes the `SQLite` write lock up front.
pub(crate) async fn begin_write(conn: &Connection) -> Result<Transaction, DatabaseError> {
    Ok(conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .await?)
}

/// Commit on success, roll back on failure, and hand back `result`.
pub(crate) async fn finish_write<T>(
    tx: Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!("rollback after failed write also failed: {rollback}");
            }
            Err(e)
        }
    }
}
