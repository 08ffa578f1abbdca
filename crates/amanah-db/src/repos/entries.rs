//! Journal repository: the posting engine, entry reads, void and reverse.
//!
//! Posting runs the pure line rules first, then resolves accounts, takes the
//! next per-period sequence number, and writes the header and all lines in
//! one `BEGIN IMMEDIATE` transaction. A rejected posting leaves no rows and
//! consumes no number.

use std::collections::HashMap;

use amanah_core::entities::{LedgerEntry, LedgerLine};
use amanah_core::enums::{EntryStatus, RefType};
use amanah_core::errors::LedgerError;
use amanah_core::ids::{LEGACY_REFERENCE_KEY, PREFIX_ENTRY, PREFIX_LINE};
use amanah_core::money::MinorUnits;
use amanah_core::period::{format_entry_number, period_of, storage_timestamp};
use amanah_core::posting::{PostingRequest, ValidatedLine, reversal_lines};
use chrono::{DateTime, Utc};
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{
    generate_id, get_amount, get_opt_string, parse_datetime, parse_enum, parse_optional_json,
    to_json_text,
};
use crate::retry::with_retry;
use crate::service::{LedgerService, begin_write, finish_write};

const ENTRY_COLS: &str = "id, entry_number, period, sequence, ref_type, ref_id, posted_at, memo, status, metadata, void_reason, created_at";

const ENTITY: &str = "ledger_entry";

fn row_to_entry(row: &libsql::Row) -> Result<LedgerEntry, DatabaseError> {
    Ok(LedgerEntry {
        id: row.get::<String>(0)?,
        entry_number: row.get::<String>(1)?,
        period: row.get::<String>(2)?,
        sequence: row.get::<i64>(3)?,
        ref_type: parse_enum(&row.get::<String>(4)?)?,
        ref_id: row.get::<String>(5)?,
        posted_at: parse_datetime(&row.get::<String>(6)?)?,
        memo: get_opt_string(row, 7)?,
        status: parse_enum(&row.get::<String>(8)?)?,
        metadata: parse_optional_json(get_opt_string(row, 9)?.as_deref())?,
        void_reason: get_opt_string(row, 10)?,
        lines: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

/// Filter criteria for entry listings.
#[derive(Debug, Default)]
pub struct EntryFilter {
    pub ref_type: Option<RefType>,
    pub ref_id: Option<String>,
    /// `"YYYY-MM"`.
    pub period: Option<String>,
    pub status: Option<EntryStatus>,
    pub limit: Option<u32>,
}

async fn load_lines(
    conn: &Connection,
    entry_id: &str,
    units: MinorUnits,
) -> Result<Vec<LedgerLine>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT l.id, l.entry_id, l.line_no, a.code, l.debit, l.credit
             FROM ledger_lines l
             JOIN accounts a ON a.id = l.account_id
             WHERE l.entry_id = ?1
             ORDER BY l.line_no",
            [entry_id],
        )
        .await?;
    let mut lines = Vec::new();
    while let Some(row) = rows.next().await? {
        lines.push(LedgerLine {
            id: row.get::<String>(0)?,
            entry_id: row.get::<String>(1)?,
            line_no: row.get::<i64>(2)?,
            account_code: row.get::<String>(3)?,
            debit: get_amount(&row, 4, units)?,
            credit: get_amount(&row, 5, units)?,
        });
    }
    Ok(lines)
}

/// Load one entry with its lines, selected by `column = value`.
async fn load_entry(
    conn: &Connection,
    column: &str,
    value: &str,
    units: MinorUnits,
) -> Result<Option<LedgerEntry>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {ENTRY_COLS} FROM ledger_entries WHERE {column} = ?1"),
            [value],
        )
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    let mut entry = row_to_entry(&row)?;
    entry.lines = load_lines(conn, &entry.id, units).await?;
    Ok(Some(entry))
}

async fn require_entry(
    conn: &Connection,
    id: &str,
    units: MinorUnits,
) -> Result<LedgerEntry, DatabaseError> {
    load_entry(conn, "id", id, units).await?.ok_or_else(|| {
        LedgerError::NotFound {
            entity_type: ENTITY.into(),
            id: id.to_string(),
        }
        .into()
    })
}

/// Whether any entry carries `marker` as its legacy reference.
pub(crate) async fn legacy_reference_exists(
    conn: &Connection,
    marker: &str,
) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT 1 FROM ledger_entries
                 WHERE json_extract(metadata, '$.{LEGACY_REFERENCE_KEY}') = ?1 LIMIT 1"
            ),
            [marker],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Map each line's account code to a postable account id.
async fn resolve_postable(
    conn: &Connection,
    lines: &[ValidatedLine],
) -> Result<HashMap<String, String>, DatabaseError> {
    let mut ids = HashMap::new();
    for line in lines {
        if ids.contains_key(&line.account_code) {
            continue;
        }
        let mut rows = conn
            .query(
                "SELECT id FROM accounts WHERE code = ?1 AND is_active = 1",
                [line.account_code.as_str()],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| LedgerError::AccountNotFound {
            code: line.account_code.clone(),
        })?;
        ids.insert(line.account_code.clone(), row.get::<String>(0)?);
    }
    Ok(ids)
}

/// Atomically take the next sequence number of `period`.
async fn next_sequence(conn: &Connection, period: &str) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query(
            "INSERT INTO entry_sequences (period, last_number) VALUES (?1, 1)
             ON CONFLICT(period) DO UPDATE SET last_number = last_number + 1
             RETURNING last_number",
            [period],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

impl LedgerService {
    /// Validate and commit a journal entry.
    ///
    /// Retries the write on lock contention; rule violations are never retried.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidLine`, `LedgerError::UnbalancedEntry`, or
    /// `LedgerError::AccountNotFound` (unknown or inactive account). Nothing
    /// is persisted on error.
    pub async fn post(&self, request: &PostingRequest) -> Result<LedgerEntry, DatabaseError> {
        let validated = request.validate(self.units())?;
        let lines = validated.as_slice();
        let entry = with_retry(self.retry(), "post", move || async move {
            let conn = self.db().writer().await;
            let tx = begin_write(&conn).await?;
            let result = self.insert_entry(&tx, request, lines).await;
            finish_write(tx, result).await
        })
        .await?;

        tracing::info!(
            entry_number = %entry.entry_number,
            ref_type = %entry.ref_type,
            ref_id = %entry.ref_id,
            "posted entry"
        );
        Ok(entry)
    }

    /// Post inside a transaction the caller owns.
    pub(crate) async fn post_within(
        &self,
        conn: &Connection,
        request: &PostingRequest,
    ) -> Result<LedgerEntry, DatabaseError> {
        let validated = request.validate(self.units())?;
        self.insert_entry(conn, request, &validated).await
    }

    async fn insert_entry(
        &self,
        conn: &Connection,
        request: &PostingRequest,
        lines: &[ValidatedLine],
    ) -> Result<LedgerEntry, DatabaseError> {
        let accounts = resolve_postable(conn, lines).await?;

        let period = period_of(request.posted_at);
        let sequence = next_sequence(conn, &period).await?;
        let entry_number = format_entry_number(
            &self.config().ledger.entry_number_prefix,
            &period,
            sequence,
        );
        let id = generate_id(conn, PREFIX_ENTRY).await?;
        let metadata = request.metadata.as_ref().map(to_json_text).transpose()?;

        conn.execute(
            "INSERT INTO ledger_entries (id, entry_number, period, sequence, ref_type, ref_id, posted_at, memo, status, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'posted', ?9, ?10)",
            libsql::params![
                id.as_str(),
                entry_number.as_str(),
                period.as_str(),
                sequence,
                request.ref_type.as_str(),
                request.ref_id.as_str(),
                storage_timestamp(request.posted_at),
                request.memo.as_deref(),
                metadata.as_deref(),
                storage_timestamp(Utc::now())
            ],
        )
        .await?;

        for (line_no, line) in (1_i64..).zip(lines) {
            let line_id = generate_id(conn, PREFIX_LINE).await?;
            let account_id = accounts
                .get(&line.account_code)
                .ok_or(DatabaseError::NoResult)?;
            conn.execute(
                "INSERT INTO ledger_lines (id, entry_id, line_no, account_id, debit, credit)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    line_id.as_str(),
                    id.as_str(),
                    line_no,
                    account_id.as_str(),
                    line.debit,
                    line.credit
                ],
            )
            .await?;
        }

        require_entry(conn, &id, self.units()).await
    }

    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no entry has this id.
    pub async fn get_entry(&self, id: &str) -> Result<LedgerEntry, DatabaseError> {
        let conn = self.db().reader().await?;
        require_entry(&conn, id, self.units()).await
    }

    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no entry has this number.
    pub async fn get_entry_by_number(&self, entry_number: &str) -> Result<LedgerEntry, DatabaseError> {
        let conn = self.db().reader().await?;
        load_entry(&conn, "entry_number", entry_number, self.units())
            .await?
            .ok_or_else(|| {
                LedgerError::NotFound {
                    entity_type: ENTITY.into(),
                    id: entry_number.to_string(),
                }
                .into()
            })
    }

    /// Entries carrying a legacy-reference marker, if one was migrated.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_entry_by_legacy_reference(
        &self,
        marker: &str,
    ) -> Result<Option<LedgerEntry>, DatabaseError> {
        let conn = self.db().reader().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT id FROM ledger_entries
                     WHERE json_extract(metadata, '$.{LEGACY_REFERENCE_KEY}') = ?1
                     ORDER BY created_at LIMIT 1"
                ),
                [marker],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let id = row.get::<String>(0)?;
        load_entry(&conn, "id", &id, self.units()).await
    }

    /// List entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref_type) = filter.ref_type {
            params.push(libsql::Value::Text(ref_type.as_str().to_string()));
            conditions.push(format!("ref_type = ?{}", params.len()));
        }
        if let Some(ref ref_id) = filter.ref_id {
            params.push(libsql::Value::Text(ref_id.clone()));
            conditions.push(format!("ref_id = ?{}", params.len()));
        }
        if let Some(ref period) = filter.period {
            params.push(libsql::Value::Text(period.clone()));
            conditions.push(format!("period = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {ENTRY_COLS} FROM ledger_entries {where_clause}
             ORDER BY posted_at DESC, period DESC, sequence DESC LIMIT {limit}"
        );

        let conn = self.db().reader().await?;
        let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        for entry in &mut entries {
            entry.lines = load_lines(&conn, &entry.id, self.units()).await?;
        }
        Ok(entries)
    }

    /// Void a posted entry. Voided entries drop out of every balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a blank reason,
    /// `LedgerError::NotFound` for an unknown id, and
    /// `LedgerError::InvalidTransition` unless the entry is posted.
    pub async fn void_entry(&self, id: &str, reason: &str) -> Result<LedgerEntry, DatabaseError> {
        if reason.trim().is_empty() {
            return Err(LedgerError::Validation("a void reason is required".into()).into());
        }

        let conn = self.db().writer().await;
        let tx = begin_write(&conn).await?;
        let result = async {
            let entry = require_entry(&tx, id, self.units()).await?;
            ensure_transition(&entry, EntryStatus::Voided)?;
            tx.execute(
                "UPDATE ledger_entries SET status = 'voided', voided_at = ?1, void_reason = ?2
                 WHERE id = ?3 AND status = 'posted'",
                libsql::params![storage_timestamp(Utc::now()), reason.trim(), id],
            )
            .await?;
            require_entry(&tx, id, self.units()).await
        }
        .await;
        let entry = finish_write(tx, result).await?;

        tracing::info!(entry_number = %entry.entry_number, reason, "voided entry");
        Ok(entry)
    }

    /// Post the mirror image of an entry and mark the original reversed.
    ///
    /// Both happen in one transaction. Returns the new reversal entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound`, `LedgerError::InvalidTransition` unless
    /// the original is posted, or any posting error for the mirrored lines.
    pub async fn reverse_entry(
        &self,
        id: &str,
        posted_at: Option<DateTime<Utc>>,
        memo: Option<&str>,
    ) -> Result<LedgerEntry, DatabaseError> {
        let reversal = with_retry(self.retry(), "reverse", move || async move {
            let conn = self.db().writer().await;
            let tx = begin_write(&conn).await?;
            let result = async {
                let original = require_entry(&tx, id, self.units()).await?;
                ensure_transition(&original, EntryStatus::Reversed)?;

                let request = PostingRequest {
                    ref_type: RefType::Reversal,
                    ref_id: original.id.clone(),
                    posted_at: posted_at.unwrap_or_else(Utc::now),
                    memo: Some(memo.map_or_else(
                        || format!("Reversal of {}", original.entry_number),
                        str::to_string,
                    )),
                    lines: reversal_lines(&original),
                    metadata: Some(serde_json::json!({ "reverses": original.entry_number })),
                };
                let reversal = self.post_within(&tx, &request).await?;
                tx.execute(
                    "UPDATE ledger_entries SET status = 'reversed' WHERE id = ?1 AND status = 'posted'",
                    [id],
                )
                .await?;
                Ok(reversal)
            }
            .await;
            finish_write(tx, result).await
        })
        .await?;

        tracing::info!(
            entry_number = %reversal.entry_number,
            reverses = %reversal.ref_id,
            "reversed entry"
        );
        Ok(reversal)
    }
}

fn ensure_transition(entry: &LedgerEntry, next: EntryStatus) -> Result<(), LedgerError> {
    if entry.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(LedgerError::InvalidTransition {
            entity_type: ENTITY.into(),
            id: entry.id.clone(),
            from: entry.status.to_string(),
            to: next.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, posting, seeded_service};
    use amanah_core::posting::LineInput;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn donation(ref_id: &str, amount: rust_decimal::Decimal) -> PostingRequest {
        posting(
            ref_id,
            at(1, 5),
            vec![LineInput::debit("1020", amount), LineInput::credit("2010", amount)],
        )
    }

    async fn row_count(svc: &LedgerService, table: &str) -> i64 {
        let conn = svc.db().reader().await.unwrap();
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }

    #[tokio::test]
    async fn post_materializes_entry_and_lines() {
        let svc = seeded_service().await;
        let entry = svc.post(&donation("don-771", dec!(100000))).await.unwrap();

        assert_eq!(entry.entry_number, "JE-202601-000001");
        assert_eq!(entry.period, "2026-01");
        assert_eq!(entry.sequence, 1);
        assert_eq!(entry.status, EntryStatus::Posted);
        assert_eq!(entry.posted_at, at(1, 5));
        assert_eq!(entry.lines.len(), 2);
        assert_eq!(entry.lines[0].account_code, "1020");
        assert_eq!(entry.lines[0].debit, dec!(100000));
        assert_eq!(entry.lines[1].credit, dec!(100000));
        assert_eq!(entry.total_debit(), entry.total_credit());

        assert_eq!(svc.get_entry(&entry.id).await.unwrap(), entry);
        assert_eq!(
            svc.get_entry_by_number("JE-202601-000001").await.unwrap(),
            entry
        );
    }

    #[tokio::test]
    async fn sub_second_posting_time_survives_storage() {
        let svc = seeded_service().await;
        let mut request = donation("don-1", dec!(10));
        request.posted_at = at(1, 5) + chrono::Duration::microseconds(123_456);

        let entry = svc.post(&request).await.unwrap();
        assert_eq!(entry.posted_at, request.posted_at);
        assert_eq!(svc.get_entry(&entry.id).await.unwrap().posted_at, request.posted_at);
    }

    #[tokio::test]
    async fn numbers_increase_within_a_period_and_restart_per_period() {
        let svc = seeded_service().await;
        let a = svc.post(&donation("don-1", dec!(10))).await.unwrap();
        let b = svc.post(&donation("don-2", dec!(10))).await.unwrap();
        let mut feb = donation("don-3", dec!(10));
        feb.posted_at = at(2, 1);
        let c = svc.post(&feb).await.unwrap();

        assert_eq!(a.entry_number, "JE-202601-000001");
        assert_eq!(b.entry_number, "JE-202601-000002");
        assert_eq!(c.entry_number, "JE-202602-000001");
    }

    #[tokio::test]
    async fn rejected_posts_leave_no_rows_and_no_gaps() {
        let svc = seeded_service().await;

        let unbalanced = posting(
            "don-bad",
            at(1, 5),
            vec![
                LineInput::debit("1020", dec!(100000)),
                LineInput::credit("2010", dec!(90000)),
            ],
        );
        let err = svc.post(&unbalanced).await.unwrap_err();
        assert_eq!(
            err.ledger(),
            Some(&LedgerError::UnbalancedEntry {
                total_debit: dec!(100000),
                total_credit: dec!(90000),
            })
        );

        let unknown = posting(
            "don-bad-2",
            at(1, 5),
            vec![LineInput::debit("1020", dec!(5)), LineInput::credit("2999", dec!(5))],
        );
        let err = svc.post(&unknown).await.unwrap_err();
        assert_eq!(
            err.ledger(),
            Some(&LedgerError::AccountNotFound {
                code: "2999".into()
            })
        );

        assert_eq!(row_count(&svc, "ledger_entries").await, 0);
        assert_eq!(row_count(&svc, "ledger_lines").await, 0);

        let ok = svc.post(&donation("don-ok", dec!(5))).await.unwrap();
        assert_eq!(ok.entry_number, "JE-202601-000001");
    }

    #[tokio::test]
    async fn inactive_accounts_are_not_postable() {
        let svc = seeded_service().await;
        svc.deactivate_account("2010").await.unwrap();
        let err = svc.post(&donation("don-1", dec!(5))).await.unwrap_err();
        assert!(matches!(
            err.ledger(),
            Some(LedgerError::AccountNotFound { code }) if code == "2010"
        ));
    }

    #[tokio::test]
    async fn void_is_terminal() {
        let svc = seeded_service().await;
        let entry = svc.post(&donation("don-1", dec!(5))).await.unwrap();

        let voided = svc.void_entry(&entry.id, "duplicate webhook").await.unwrap();
        assert_eq!(voided.status, EntryStatus::Voided);
        assert_eq!(voided.void_reason.as_deref(), Some("duplicate webhook"));

        let err = svc.void_entry(&entry.id, "again").await.unwrap_err();
        assert!(matches!(
            err.ledger(),
            Some(LedgerError::InvalidTransition { .. })
        ));
        let err = svc.reverse_entry(&entry.id, None, None).await.unwrap_err();
        assert!(matches!(
            err.ledger(),
            Some(LedgerError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn void_requires_a_reason() {
        let svc = seeded_service().await;
        let entry = svc.post(&donation("don-1", dec!(5))).await.unwrap();
        let err = svc.void_entry(&entry.id, "  ").await.unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn reverse_posts_mirror_and_marks_original() {
        let svc = seeded_service().await;
        let entry = svc.post(&donation("don-1", dec!(250))).await.unwrap();

        let reversal = svc
            .reverse_entry(&entry.id, Some(at(1, 20)), Some("refund"))
            .await
            .unwrap();
        assert_eq!(reversal.ref_type, RefType::Reversal);
        assert_eq!(reversal.ref_id, entry.id);
        assert_eq!(reversal.memo.as_deref(), Some("refund"));
        assert_eq!(reversal.entry_number, "JE-202601-000002");
        assert_eq!(reversal.lines[0].account_code, "1020");
        assert_eq!(reversal.lines[0].credit, dec!(250));
        assert_eq!(reversal.lines[1].debit, dec!(250));

        let original = svc.get_entry(&entry.id).await.unwrap();
        assert_eq!(original.status, EntryStatus::Reversed);
    }

    #[tokio::test]
    async fn list_entries_filters() {
        let svc = seeded_service().await;
        svc.post(&donation("don-1", dec!(5))).await.unwrap();
        let second = svc.post(&donation("don-2", dec!(7))).await.unwrap();
        svc.void_entry(&second.id, "test").await.unwrap();

        let all = svc.list_entries(&EntryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|e| e.lines.len() == 2));

        let voided = svc
            .list_entries(&EntryFilter {
                status: Some(EntryStatus::Voided),
                ..EntryFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(voided.len(), 1);
        assert_eq!(voided[0].ref_id, "don-2");

        let by_ref = svc
            .list_entries(&EntryFilter {
                ref_type: Some(RefType::Donation),
                ref_id: Some("don-1".into()),
                period: Some("2026-01".into()),
                ..EntryFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_ref.len(), 1);
    }

    #[tokio::test]
    async fn legacy_reference_lookup() {
        let svc = seeded_service().await;
        let mut request = donation("txn-1", dec!(5));
        request.metadata = Some(serde_json::json!({ "legacy_reference_id": "legacy_savings:sav-1" }));
        let entry = svc.post(&request).await.unwrap();

        let found = svc
            .find_entry_by_legacy_reference("legacy_savings:sav-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, entry.id);
        assert_eq!(found.metadata_str("legacy_reference_id"), Some("legacy_savings:sav-1"));
        assert!(svc
            .find_entry_by_legacy_reference("legacy_savings:sav-2")
            .await
            .unwrap()
            .is_none());
    }
}
