//! Liability-model migration.
//!
//! Rewrites lines posted to retired income/expense codes onto the liability
//! accounts that replace them, retires the old codes, and re-verifies the
//! ledger before committing. Amounts are never touched, only the account a
//! line points at. A second run finds nothing left to rewrite.

use std::collections::BTreeSet;

use amanah_core::enums::AccountType;
use amanah_core::errors::LedgerError;
use amanah_core::period::storage_timestamp;
use amanah_core::responses::LiabilityMigrationReport;
use amanah_core::trail::TrailEvent;
use chrono::Utc;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::get_amount;
use crate::jobs::JobRun;
use crate::repos::accounts::find_account;
use crate::service::{LedgerService, begin_write, finish_write};

const JOB: &str = "liability_migration";

/// Suffix appended to the name of a retired account.
const RETIRED_SUFFIX: &str = " (legacy)";

impl LedgerService {
    /// Apply `migration.liability_map` to the ledger.
    ///
    /// With `dry_run` the full rewrite and verification run, then roll back.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if a mapped target is missing,
    /// inactive, or not a liability, if an existing source is not an income
    /// or expense account, or if a code is both source and target, and
    /// `LedgerError::MigrationIntegrityViolation` if the rewritten ledger does
    /// not balance. Nothing is committed in either case.
    pub async fn migrate_liability_model(
        &self,
        dry_run: bool,
    ) -> Result<LiabilityMigrationReport, DatabaseError> {
        let run = JobRun::start(JOB);
        tracing::info!(dry_run, pairs = self.config().migration.liability_map.len(), "starting liability migration");

        let conn = self.db().writer().await;
        let tx = begin_write(&conn).await?;
        let outcome = self.rewrite_liability_lines(&tx, dry_run).await;

        let report = match outcome {
            Ok(report) if dry_run => {
                tx.rollback().await?;
                report
            }
            other => match finish_write(tx, other).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("liability migration aborted: {e}");
                    if let Err(trail) = run.record(
                        self.trail(),
                        TrailEvent::RunAborted,
                        serde_json::json!({ "dry_run": dry_run, "error": e.to_string() }),
                    ) {
                        tracing::warn!("failed to write trail record: {trail}");
                    }
                    return Err(e);
                }
            },
        };
        drop(conn);

        let recorded = serde_json::to_value(&report)
            .map_err(|e| DatabaseError::Other(e.into()))
            .and_then(|data| run.record(self.trail(), TrailEvent::RunCompleted, data));
        if let Err(trail) = recorded {
            tracing::warn!("failed to write trail record: {trail}");
        }
        tracing::info!(
            dry_run,
            lines_rewritten = report.lines_rewritten,
            entries_touched = report.entries_touched,
            accounts_retired = report.accounts_retired.len(),
            "liability migration finished"
        );
        Ok(report)
    }

    async fn rewrite_liability_lines(
        &self,
        conn: &Connection,
        dry_run: bool,
    ) -> Result<LiabilityMigrationReport, DatabaseError> {
        let map = &self.config().migration.liability_map;
        let mut report = LiabilityMigrationReport {
            dry_run,
            ..LiabilityMigrationReport::default()
        };

        if let Some(code) = self.config().migration.chained_code() {
            return Err(LedgerError::Validation(format!(
                "account {code} is both a migration source and a target"
            ))
            .into());
        }
        for from in map.keys() {
            let Some(source) = find_account(conn, from).await? else {
                continue;
            };
            if !matches!(source.account_type, AccountType::Income | AccountType::Expense) {
                return Err(LedgerError::Validation(format!(
                    "migration source {from} must be an income or expense account, found {}",
                    source.account_type
                ))
                .into());
            }
        }
        for to in map.values().collect::<BTreeSet<_>>() {
            let target = find_account(conn, to).await?;
            match target {
                Some(account) if account.is_active && account.account_type == AccountType::Liability => {}
                Some(account) => {
                    return Err(LedgerError::Validation(format!(
                        "migration target {to} must be an active liability account, found {} ({})",
                        account.account_type,
                        if account.is_active { "active" } else { "inactive" }
                    ))
                    .into());
                }
                None => {
                    return Err(LedgerError::Validation(format!(
                        "migration target {to} does not exist"
                    ))
                    .into());
                }
            }
        }

        let now = storage_timestamp(Utc::now());
        let mut touched = BTreeSet::new();
        for (from, to) in map {
            let Some(source) = find_account(conn, from).await? else {
                tracing::warn!(code = %from, "mapped legacy account does not exist, skipping");
                report.missing_sources.push(from.clone());
                continue;
            };
            let target = find_account(conn, to).await?.ok_or(DatabaseError::NoResult)?;

            let mut rows = conn
                .query(
                    "SELECT DISTINCT entry_id FROM ledger_lines WHERE account_id = ?1",
                    [source.id.as_str()],
                )
                .await?;
            while let Some(row) = rows.next().await? {
                touched.insert(row.get::<String>(0)?);
            }

            let rewritten = conn
                .execute(
                    "UPDATE ledger_lines SET account_id = ?1 WHERE account_id = ?2",
                    [target.id.as_str(), source.id.as_str()],
                )
                .await?;
            report.lines_rewritten += rewritten;

            let retired = conn
                .execute(
                    "UPDATE accounts SET is_active = 0, name = name || ?1, updated_at = ?2
                     WHERE id = ?3 AND is_active = 1",
                    libsql::params![RETIRED_SUFFIX, now.as_str(), source.id.as_str()],
                )
                .await?;
            if retired > 0 {
                report.accounts_retired.push(from.clone());
            }
            tracing::debug!(from = %from, to = %to, rewritten, "remapped legacy account");
            report.mapping.insert(from.clone(), to.clone());
        }
        report.entries_touched = touched.len() as u64;

        self.verify_ledger_balance(conn, &mut report).await?;
        Ok(report)
    }

    /// Check every entry and the ledger as a whole for debit == credit.
    async fn verify_ledger_balance(
        &self,
        conn: &Connection,
        report: &mut LiabilityMigrationReport,
    ) -> Result<(), DatabaseError> {
        let mut rows = conn
            .query(
                "SELECT e.entry_number FROM ledger_entries e
                 JOIN ledger_lines l ON l.entry_id = e.id
                 GROUP BY e.id
                 HAVING SUM(l.debit) != SUM(l.credit)
                 ORDER BY e.entry_number",
                (),
            )
            .await?;
        let mut unbalanced_entries = Vec::new();
        while let Some(row) = rows.next().await? {
            unbalanced_entries.push(row.get::<String>(0)?);
        }

        let mut rows = conn
            .query(
                "SELECT COALESCE(SUM(debit), 0), COALESCE(SUM(credit), 0) FROM ledger_lines",
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        report.total_debit = get_amount(&row, 0, self.units())?;
        report.total_credit = get_amount(&row, 1, self.units())?;

        if !unbalanced_entries.is_empty() || report.total_debit != report.total_credit {
            return Err(LedgerError::MigrationIntegrityViolation {
                total_debit: report.total_debit,
                total_credit: report.total_credit,
                unbalanced_entries,
            }
            .into());
        }
        Ok(())
    }
}
