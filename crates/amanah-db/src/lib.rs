//! # amanah-db
//!
//! libSQL store and services for the Amanah double-entry ledger.
//!
//! Holds the chart of accounts, the journal (entries and their lines), the
//! canonical business records written by the savings backfill, and the legacy
//! pre-ledger sources read by the category auditor and the batch jobs.
//! Balances are never stored; every report aggregates lines on demand.
//!
//! ## Connections
//!
//! One writer connection per process sits behind an async write gate and
//! opens every write with `BEGIN IMMEDIATE`, so other processes serialize on
//! the SQLite write lock. File databases run in WAL mode and serve reads from
//! fresh connections; in-memory databases only exist on one connection, so
//! their reads go through the writer.

pub mod error;
pub mod helpers;
pub mod jobs;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod trail;

#[cfg(test)]
mod test_support;

use std::ops::Deref;

use amanah_core::money::MinorUnits;
use error::DatabaseError;
use libsql::{Builder, Connection};
use tokio::sync::{Mutex, MutexGuard};

const MEMORY_PATH: &str = ":memory:";

/// Central database handle for all ledger state.
pub struct LedgerDb {
    db: libsql::Database,
    writer: Mutex<Connection>,
    in_memory: bool,
    busy_timeout_ms: u64,
    units: MinorUnits,
}

/// A connection for read-only queries.
///
/// Either a fresh connection of its own or, for in-memory databases, the
/// writer connection held under the write gate.
pub enum Reader<'a> {
    Shared(MutexGuard<'a, Connection>),
    Owned(Connection),
}

impl Deref for Reader<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Self::Shared(guard) => guard,
            Self::Owned(conn) => conn,
        }
    }
}

impl LedgerDb {
    /// Open a local database at the given path, or `:memory:`.
    ///
    /// Runs migrations automatically and checks that the stored minor-unit
    /// precision matches `units`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened, migrations
    /// fail, or the database was created with a different precision.
    pub async fn open_local(
        path: &str,
        busy_timeout_ms: u64,
        units: MinorUnits,
    ) -> Result<Self, DatabaseError> {
        let in_memory = path == MEMORY_PATH;
        if !in_memory {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| DatabaseError::Other(e.into()))?;
                }
            }
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        configure_connection(&conn, busy_timeout_ms).await?;
        if !in_memory {
            let mut rows = conn.query("PRAGMA journal_mode = WAL", ()).await?;
            while rows.next().await?.is_some() {}
        }

        let ledger_db = Self {
            db,
            writer: Mutex::new(conn),
            in_memory,
            busy_timeout_ms,
            units,
        };
        {
            let conn = ledger_db.writer.lock().await;
            Self::run_migrations(&conn).await?;
            check_minor_units(&conn, units).await?;
        }
        Ok(ledger_db)
    }

    /// Open a fresh in-memory database (tests, dry experiments).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if migrations fail.
    pub async fn open_in_memory(units: MinorUnits) -> Result<Self, DatabaseError> {
        Self::open_local(MEMORY_PATH, 0, units).await
    }

    /// Acquire the write gate. Hold the guard for the whole write transaction.
    pub async fn writer(&self) -> MutexGuard<'_, Connection> {
        self.writer.lock().await
    }

    /// Connection for read-only queries.
    ///
    /// Must not be called while holding [`Self::writer`]: in-memory readers
    /// wait on the same gate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a new connection cannot be opened.
    pub async fn reader(&self) -> Result<Reader<'_>, DatabaseError> {
        if self.in_memory {
            return Ok(Reader::Shared(self.writer.lock().await));
        }
        let conn = self.db.connect()?;
        configure_connection(&conn, self.busy_timeout_ms).await?;
        Ok(Reader::Owned(conn))
    }

    /// Precision amounts are stored with.
    #[must_use]
    pub const fn units(&self) -> MinorUnits {
        self.units
    }

    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }
}

/// Per-connection pragmas (`SQLite` keeps these per connection).
async fn configure_connection(conn: &Connection, busy_timeout_ms: u64) -> Result<(), DatabaseError> {
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
    if busy_timeout_ms > 0 {
        let mut rows = conn
            .query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"), ())
            .await?;
        while rows.next().await?.is_some() {}
    }
    Ok(())
}

async fn check_minor_units(conn: &Connection, units: MinorUnits) -> Result<(), DatabaseError> {
    let digits = units.digits().to_string();
    conn.execute(
        "INSERT OR IGNORE INTO ledger_meta (key, value) VALUES ('minor_unit_digits', ?1)",
        [digits.as_str()],
    )
    .await?;
    let mut rows = conn
        .query(
            "SELECT value FROM ledger_meta WHERE key = 'minor_unit_digits'",
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let stored = row.get::<String>(0)?;
    if stored != digits {
        return Err(DatabaseError::InvalidState(format!(
            "database stores amounts with {stored} minor-unit digits, configuration asks for {digits}"
        )));
    }
    Ok(())
}
