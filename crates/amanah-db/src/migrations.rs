//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::LedgerDb;
use crate::error::DatabaseError;

/// Ledger schema: accounts, sequences, entries, lines, transactions, payments.
const MIGRATION_001: &str = include_str!("../migrations/001_ledger.sql");
/// Legacy pre-ledger sources.
const MIGRATION_002: &str = include_str!("../migrations/002_legacy.sql");

impl LedgerDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(conn: &libsql::Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_ledger: {e}")))?;
        conn.execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_legacy: {e}")))?;
        Ok(())
    }
}
