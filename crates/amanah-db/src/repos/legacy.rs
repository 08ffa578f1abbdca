//! Legacy pre-ledger sources: inserts, reads, and JSONL import.
//!
//! These tables are only ever read by the category auditor and the savings
//! backfill; the backfill is the single writer of `migration_status`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use amanah_core::entities::{LegacyRecord, LegacySavingsTransaction};
use amanah_core::enums::{LegacyRowState, LegacySource};
use amanah_core::errors::LedgerError;
use amanah_core::money::MinorUnits;
use amanah_core::period::storage_timestamp;
use amanah_core::responses::ImportResponse;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{get_amount, get_opt_string, parse_datetime, parse_enum};
use crate::service::{LedgerService, begin_write, finish_write};

const SAVINGS_COLS: &str = "id, saver_ref, kind, amount, target_type, target_id, cash_account_code, payment_method, description, occurred_at, migration_status, skip_reason";

/// A legacy table that accepts imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyTable {
    Transactions,
    Disbursements,
    Savings,
}

impl LegacyTable {
    pub const ALL: [Self; 3] = [Self::Transactions, Self::Disbursements, Self::Savings];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Disbursements => "disbursements",
            Self::Savings => "savings",
        }
    }

    /// Schema each imported line must satisfy.
    #[must_use]
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Transactions | Self::Disbursements => "legacy_record",
            Self::Savings => "legacy_savings_transaction",
        }
    }
}

impl fmt::Display for LegacyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyTable {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| LedgerError::Validation(format!("unknown legacy table: {s}")))
    }
}

pub(crate) fn row_to_savings(
    row: &libsql::Row,
    units: MinorUnits,
) -> Result<LegacySavingsTransaction, DatabaseError> {
    Ok(LegacySavingsTransaction {
        id: row.get::<String>(0)?,
        saver_ref: row.get::<String>(1)?,
        kind: row.get::<String>(2)?,
        amount: get_amount(row, 3, units)?,
        target_type: get_opt_string(row, 4)?,
        target_id: get_opt_string(row, 5)?,
        cash_account_code: get_opt_string(row, 6)?,
        payment_method: get_opt_string(row, 7)?,
        description: get_opt_string(row, 8)?,
        occurred_at: parse_datetime(&row.get::<String>(9)?)?,
        migration_status: parse_enum(&row.get::<String>(10)?)?,
        skip_reason: get_opt_string(row, 11)?
            .map(|reason| parse_enum(&reason))
            .transpose()?,
    })
}

/// One keyset page of savings rows with `id > after`, ordered by id.
pub(crate) async fn savings_page(
    conn: &Connection,
    after: Option<&str>,
    limit: u32,
    units: MinorUnits,
) -> Result<Vec<LegacySavingsTransaction>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SAVINGS_COLS} FROM legacy_savings_transactions
                 WHERE id > ?1 ORDER BY id LIMIT {limit}"
            ),
            [after.unwrap_or("")],
        )
        .await?;
    let mut page = Vec::new();
    while let Some(row) = rows.next().await? {
        page.push(row_to_savings(&row, units)?);
    }
    Ok(page)
}

fn to_minor(units: MinorUnits, row_id: &str, amount: rust_decimal::Decimal) -> Result<i64, LedgerError> {
    units
        .to_minor(amount)
        .map_err(|e| LedgerError::Validation(format!("legacy row {row_id}: {e}")))
}

async fn insert_record(
    conn: &Connection,
    source: LegacySource,
    record: &LegacyRecord,
    units: MinorUnits,
) -> Result<(), DatabaseError> {
    let amount = to_minor(units, &record.id, record.amount)?;
    conn.execute(
        &format!(
            "INSERT INTO {} (id, record_type, category, description, reference, amount, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            source.table()
        ),
        libsql::params![
            record.id.as_str(),
            record.record_type.as_str(),
            record.category.as_deref(),
            record.description.as_deref(),
            record.reference.as_deref(),
            amount,
            storage_timestamp(record.occurred_at)
        ],
    )
    .await?;
    Ok(())
}

async fn insert_savings(
    conn: &Connection,
    row: &LegacySavingsTransaction,
    units: MinorUnits,
) -> Result<(), DatabaseError> {
    let amount = to_minor(units, &row.id, row.amount)?;
    conn.execute(
        "INSERT INTO legacy_savings_transactions
            (id, saver_ref, kind, amount, target_type, target_id, cash_account_code, payment_method, description, occurred_at, migration_status, skip_reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        libsql::params![
            row.id.as_str(),
            row.saver_ref.as_str(),
            row.kind.as_str(),
            amount,
            row.target_type.as_deref(),
            row.target_id.as_deref(),
            row.cash_account_code.as_deref(),
            row.payment_method.as_deref(),
            row.description.as_deref(),
            storage_timestamp(row.occurred_at),
            row.migration_status.as_str(),
            row.skip_reason.map(|reason| reason.as_str())
        ],
    )
    .await?;
    Ok(())
}

impl LedgerService {
    /// Store one legacy transaction or disbursement row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the amount exceeds the ledger's
    /// precision, or `DatabaseError` if the id already exists.
    pub async fn insert_legacy_record(
        &self,
        source: LegacySource,
        record: &LegacyRecord,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().writer().await;
        let tx = begin_write(&conn).await?;
        let result = insert_record(&tx, source, record, self.units()).await;
        finish_write(tx, result).await
    }

    /// Store one legacy savings row.
    ///
    /// # Errors
    ///
    /// Same as [`Self::insert_legacy_record`].
    pub async fn insert_legacy_savings(
        &self,
        row: &LegacySavingsTransaction,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().writer().await;
        let tx = begin_write(&conn).await?;
        let result = insert_savings(&tx, row, self.units()).await;
        finish_write(tx, result).await
    }

    /// Savings rows ordered by id, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_legacy_savings(
        &self,
        status: Option<LegacyRowState>,
        limit: Option<u32>,
    ) -> Result<Vec<LegacySavingsTransaction>, DatabaseError> {
        let limit = limit.unwrap_or(100);
        let conn = self.db().reader().await?;
        let mut rows = match status {
            Some(status) => {
                conn.query(
                    &format!(
                        "SELECT {SAVINGS_COLS} FROM legacy_savings_transactions
                         WHERE migration_status = ?1 ORDER BY id LIMIT {limit}"
                    ),
                    [status.as_str()],
                )
                .await?
            }
            None => {
                conn.query(
                    &format!(
                        "SELECT {SAVINGS_COLS} FROM legacy_savings_transactions ORDER BY id LIMIT {limit}"
                    ),
                    (),
                )
                .await?
            }
        };
        let mut savings = Vec::new();
        while let Some(row) = rows.next().await? {
            savings.push(row_to_savings(&row, self.units())?);
        }
        Ok(savings)
    }

    /// Load a JSONL file of legacy rows into `table`.
    ///
    /// Every line is checked against the table's JSON Schema before anything
    /// is written; the whole file goes in as one transaction. Savings rows
    /// must be `unmigrated` with no skip reason.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` naming the first bad line, or
    /// `DatabaseError` if the file cannot be read or a row cannot be stored.
    pub async fn import_legacy_jsonl(
        &self,
        table: LegacyTable,
        path: &Path,
    ) -> Result<ImportResponse, DatabaseError> {
        let lines = serde_jsonlines::json_lines::<serde_json::Value, _>(path)
            .map_err(|e| DatabaseError::Other(anyhow::anyhow!("{}: {e}", path.display())))?;

        let mut records = Vec::new();
        let mut savings = Vec::new();
        for (index, line) in lines.enumerate() {
            let n = index + 1;
            let value = line.map_err(|e| {
                LedgerError::Validation(format!("{}:{n}: {e}", path.display()))
            })?;
            let invalid =
                |e: amanah_schema::SchemaError| LedgerError::Validation(format!("{}:{n}: {e}", path.display()));
            match table {
                LegacyTable::Transactions | LegacyTable::Disbursements => records.push(
                    self.schema()
                        .parse::<LegacyRecord>(table.schema_name(), value)
                        .map_err(invalid)?,
                ),
                LegacyTable::Savings => {
                    let row = self
                        .schema()
                        .parse::<LegacySavingsTransaction>(table.schema_name(), value)
                        .map_err(invalid)?;
                    if row.migration_status != LegacyRowState::Unmigrated || row.skip_reason.is_some() {
                        return Err(LedgerError::Validation(format!(
                            "{}:{n}: savings row {} must arrive unmigrated; migration state is set by the backfill",
                            path.display(),
                            row.id
                        ))
                        .into());
                    }
                    savings.push(row);
                }
            }
        }

        let source = match table {
            LegacyTable::Disbursements => LegacySource::Disbursements,
            _ => LegacySource::Transactions,
        };
        let conn = self.db().writer().await;
        let tx = begin_write(&conn).await?;
        let result = async {
            for record in &records {
                insert_record(&tx, source, record, self.units()).await?;
            }
            for row in &savings {
                insert_savings(&tx, row, self.units()).await?;
            }
            Ok(())
        }
        .await;
        finish_write(tx, result).await?;

        let rows_imported = (records.len() + savings.len()) as u64;
        tracing::info!(table = %table, rows_imported, "imported legacy rows");
        Ok(ImportResponse {
            table: table.to_string(),
            rows_imported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{savings_row, test_service};
    use rstest::rstest;
    use amanah_core::enums::SkipReason;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn table_names_parse() {
        for table in LegacyTable::ALL {
            assert_eq!(table.as_str().parse::<LegacyTable>().unwrap(), table);
        }
        assert!("payments".parse::<LegacyTable>().is_err());
    }

    #[tokio::test]
    async fn savings_rows_roundtrip_through_the_table() {
        let svc = test_service().await;
        let mut skipped = savings_row("sav-2", "withdrawal");
        skipped.migration_status = LegacyRowState::Skipped;
        skipped.skip_reason = Some(SkipReason::Unsupported);
        svc.insert_legacy_savings(&savings_row("sav-1", "deposit"))
            .await
            .unwrap();
        svc.insert_legacy_savings(&skipped).await.unwrap();

        let all = svc.list_legacy_savings(None, None).await.unwrap();
        assert_eq!(all, vec![savings_row("sav-1", "deposit"), skipped]);

        let pending = svc
            .list_legacy_savings(Some(LegacyRowState::Unmigrated), None)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "sav-1");
    }

    #[tokio::test]
    async fn excess_precision_is_rejected() {
        let svc = test_service().await;
        let mut row = savings_row("sav-1", "deposit");
        row.amount = dec!(10.25);
        let err = svc.insert_legacy_savings(&row).await.unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn import_loads_valid_jsonl() {
        let svc = test_service().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":"trx-1","record_type":"donation","category":"donasi","amount":"75000","occurred_at":"2025-03-01T08:00:00Z"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"id":"trx-2","record_type":"zakat","category":"sedekah-lama","description":"Old","amount":"5000","occurred_at":"2025-03-02T08:00:00Z"}}"#
        )
        .unwrap();

        let response = svc
            .import_legacy_jsonl(LegacyTable::Transactions, file.path())
            .await
            .unwrap();
        assert_eq!(response.rows_imported, 2);
        assert_eq!(response.table, "transactions");
    }

    #[tokio::test]
    async fn import_rejects_whole_file_on_bad_line() {
        let svc = test_service().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":"sav-1","saver_ref":"d","kind":"deposit","amount":"100","occurred_at":"2026-01-01T00:00:00Z"}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"id":"sav-2","kind":"deposit"}}"#).unwrap();

        let err = svc
            .import_legacy_jsonl(LegacyTable::Savings, file.path())
            .await
            .unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::Validation(msg)) if msg.contains(":2:")));
        assert!(svc.list_legacy_savings(None, None).await.unwrap().is_empty());
    }

    #[rstest]
    #[case::claims_migrated(r#""migration_status":"migrated""#)]
    #[case::claims_skipped(r#""migration_status":"skipped","skip_reason":"unsupported""#)]
    #[case::stray_skip_reason(r#""skip_reason":"invalid_reference""#)]
    #[tokio::test]
    async fn import_refuses_preset_migration_state(#[case] state: &str) {
        let svc = test_service().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":"sav-1","saver_ref":"d","kind":"deposit","amount":"100","occurred_at":"2026-01-01T00:00:00Z"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"id":"sav-2","saver_ref":"d","kind":"deposit","amount":"100","occurred_at":"2026-01-01T00:00:00Z",{state}}}"#
        )
        .unwrap();

        let err = svc
            .import_legacy_jsonl(LegacyTable::Savings, file.path())
            .await
            .unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::Validation(msg)) if msg.contains(":2:") && msg.contains("sav-2")));
        assert!(svc.list_legacy_savings(None, None).await.unwrap().is_empty());
    }
}
