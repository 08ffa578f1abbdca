//! Savings backfill: legacy savings rows → transaction, payment, and entry.
//!
//! Rows are walked in id order, one keyset page at a time. Each row is
//! decided and written in its own transaction:
//!
//! 1. an entry already carrying the row's legacy marker → `already_migrated`;
//!    the stored status alone never counts as migrated
//! 2. a row previously marked skipped stays skipped with its stored reason
//! 3. otherwise the row is planned; an unplannable row is marked skipped
//! 4. a planned row gets its transaction, payment, and balanced entry, and is
//!    marked migrated in the same commit
//!
//! Killing the job between rows loses nothing and duplicates nothing.

use amanah_config::BackfillConfig;
use amanah_core::entities::LegacySavingsTransaction;
use amanah_core::enums::{LegacyRowState, SavingsKind, SkipReason};
use amanah_core::errors::LedgerError;
use amanah_core::ids::{
    LEGACY_REFERENCE_KEY, PREFIX_PAYMENT, PREFIX_TRANSACTION, legacy_savings_reference,
};
use amanah_core::period::storage_timestamp;
use amanah_core::posting::{LineInput, PostingRequest};
use amanah_core::responses::{BackfillOutcome, BackfillReport};
use amanah_core::trail::TrailEvent;
use chrono::Utc;
use libsql::Connection;
use rust_decimal::Decimal;

use crate::error::DatabaseError;
use crate::helpers::{generate_id, to_json_text};
use crate::jobs::JobRun;
use crate::repos::accounts::find_account;
use crate::repos::entries::legacy_reference_exists;
use crate::repos::legacy::savings_page;
use crate::retry::with_retry;
use crate::service::{LedgerService, begin_write, finish_write};

const JOB: &str = "savings_backfill";

/// Payment method recorded when the legacy row names none.
const DEFAULT_PAYMENT_METHOD: &str = "legacy";

/// How one legacy row translates into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SavingsPlan {
    kind: SavingsKind,
    debit_code: String,
    credit_code: String,
}

/// A row that cannot be planned, and why.
#[derive(Debug)]
struct RowSkip {
    reason: SkipReason,
    error: LedgerError,
}

impl RowSkip {
    fn new(reason: SkipReason, row: &LegacySavingsTransaction, detail: impl Into<String>) -> Self {
        Self {
            reason,
            error: LedgerError::LegacyRowUnresolvable {
                row_id: row.id.clone(),
                reason: detail.into(),
            },
        }
    }

    fn into_outcome(self) -> BackfillOutcome {
        BackfillOutcome::Skipped {
            reason: self.reason,
            detail: self.error.to_string(),
        }
    }
}

/// Decide the debit and credit accounts for a row. Pure.
fn plan(row: &LegacySavingsTransaction, config: &BackfillConfig) -> Result<SavingsPlan, RowSkip> {
    let Some(kind) = SavingsKind::parse(&row.kind) else {
        return Err(RowSkip::new(
            SkipReason::Unsupported,
            row,
            format!("unsupported savings kind '{}'", row.kind),
        ));
    };
    if row.amount <= Decimal::ZERO {
        return Err(RowSkip::new(
            SkipReason::InvalidReference,
            row,
            format!("amount {} is not positive", row.amount),
        ));
    }

    match kind {
        SavingsKind::Deposit => Ok(SavingsPlan {
            kind,
            debit_code: row
                .cash_account_code
                .clone()
                .filter(|code| !code.trim().is_empty())
                .unwrap_or_else(|| config.cash_account_code.clone()),
            credit_code: config.savings_liability_code.clone(),
        }),
        SavingsKind::Conversion => {
            let target_type = row
                .target_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| RowSkip::new(SkipReason::InvalidReference, row, "conversion without target type"))?;
            if row.target_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
                return Err(RowSkip::new(
                    SkipReason::InvalidReference,
                    row,
                    format!("conversion to {target_type} without target id"),
                ));
            }
            let credit_code = config
                .conversion_targets
                .get(&target_type.to_ascii_lowercase())
                .cloned()
                .ok_or_else(|| {
                    RowSkip::new(
                        SkipReason::InvalidReference,
                        row,
                        format!("no liability account for target type '{target_type}'"),
                    )
                })?;
            Ok(SavingsPlan {
                kind,
                debit_code: config.savings_liability_code.clone(),
                credit_code,
            })
        }
    }
}

impl LedgerService {
    /// Migrate every unmigrated legacy savings row.
    ///
    /// Safe to rerun: migrated rows are recognized by their legacy marker and
    /// counted as `skipped_already_migrated`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` on storage failures. Unresolvable rows are
    /// skipped and counted, never returned as errors.
    pub async fn backfill_savings(&self) -> Result<BackfillReport, DatabaseError> {
        let run = JobRun::start(JOB);
        let batch_size = self.config().migration.batch_size.max(1);
        let mut report = BackfillReport::default();
        let mut after: Option<String> = None;

        tracing::info!(batch_size, "starting savings backfill");
        loop {
            let page = {
                let conn = self.db().reader().await?;
                savings_page(&conn, after.as_deref(), batch_size, self.units()).await?
            };
            let Some(last) = page.last() else {
                break;
            };
            after = Some(last.id.clone());

            for row in &page {
                let outcome = match self.backfill_row(row).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(row_id = %row.id, "savings backfill aborted: {e}");
                        if let Err(trail) = run.record(
                            self.trail(),
                            TrailEvent::RunAborted,
                            serde_json::json!({ "row_id": row.id, "error": e.to_string(), "report": report }),
                        ) {
                            tracing::warn!("failed to write trail record: {trail}");
                        }
                        return Err(e);
                    }
                };
                match &outcome {
                    BackfillOutcome::Migrated { entry_number, .. } => {
                        tracing::debug!(row_id = %row.id, %entry_number, "migrated savings row");
                    }
                    BackfillOutcome::Skipped { reason, detail } => {
                        tracing::warn!(row_id = %row.id, %reason, "skipped savings row: {detail}");
                        if let Err(trail) = run.record(
                            self.trail(),
                            TrailEvent::RowSkipped,
                            serde_json::json!({ "row_id": row.id, "reason": reason, "detail": detail }),
                        ) {
                            tracing::warn!(row_id = %row.id, "failed to write trail record: {trail}");
                        }
                    }
                }
                report.record(&outcome);
            }
        }

        let recorded = serde_json::to_value(&report)
            .map_err(|e| DatabaseError::Other(e.into()))
            .and_then(|data| run.record(self.trail(), TrailEvent::RunCompleted, data));
        if let Err(trail) = recorded {
            tracing::warn!("failed to write trail record: {trail}");
        }
        tracing::info!(
            scanned = report.scanned,
            migrated = report.migrated,
            skipped = report.skipped(),
            "savings backfill finished"
        );
        Ok(report)
    }

    async fn backfill_row(
        &self,
        row: &LegacySavingsTransaction,
    ) -> Result<BackfillOutcome, DatabaseError> {
        with_retry(self.retry(), "backfill", move || async move {
            let conn = self.db().writer().await;
            let tx = begin_write(&conn).await?;
            let result = self.backfill_row_within(&tx, row).await;
            finish_write(tx, result).await
        })
        .await
    }

    async fn backfill_row_within(
        &self,
        conn: &Connection,
        row: &LegacySavingsTransaction,
    ) -> Result<BackfillOutcome, DatabaseError> {
        let marker = legacy_savings_reference(&row.id);
        if legacy_reference_exists(conn, &marker).await? {
            if row.migration_status.can_transition_to(LegacyRowState::Migrated) {
                set_row_state(conn, row, row.migration_status, LegacyRowState::Migrated, None).await?;
            }
            return Ok(BackfillOutcome::Skipped {
                reason: SkipReason::AlreadyMigrated,
                detail: format!("ledger already holds {marker}"),
            });
        }
        let state = match row.migration_status {
            LegacyRowState::Skipped => {
                let reason = row.skip_reason.unwrap_or(SkipReason::InvalidReference);
                return Ok(BackfillOutcome::Skipped {
                    reason,
                    detail: format!("row {} was skipped by an earlier run", row.id),
                });
            }
            LegacyRowState::Migrated => {
                tracing::warn!(row_id = %row.id, "row is marked migrated but the ledger has no {marker}");
                LegacyRowState::Unmigrated
            }
            LegacyRowState::Unmigrated => LegacyRowState::Unmigrated,
        };

        let plan = match plan(row, &self.config().backfill) {
            Ok(plan) => plan,
            Err(skip) => return mark_skipped(conn, row, state, skip).await,
        };
        for code in [&plan.debit_code, &plan.credit_code] {
            let postable = find_account(conn, code)
                .await?
                .is_some_and(|account| account.is_active);
            if !postable {
                let skip = RowSkip::new(
                    SkipReason::InvalidReference,
                    row,
                    format!("account {code} is missing or retired"),
                );
                return mark_skipped(conn, row, state, skip).await;
            }
        }

        let amount = self.units().to_minor(row.amount)?;
        let transaction_id = generate_id(conn, PREFIX_TRANSACTION).await?;
        let metadata = serde_json::json!({
            LEGACY_REFERENCE_KEY: marker,
            "legacy_kind": row.kind,
        });
        let occurred_at = storage_timestamp(row.occurred_at);
        conn.execute(
            "INSERT INTO transactions (id, kind, donor_ref, target_type, target_id, amount, status, occurred_at, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'paid', ?7, ?8, ?9)",
            libsql::params![
                transaction_id.as_str(),
                plan.kind.ref_type().as_str(),
                row.saver_ref.as_str(),
                row.target_type.as_deref(),
                row.target_id.as_deref(),
                amount,
                occurred_at.as_str(),
                to_json_text(&metadata)?,
                storage_timestamp(Utc::now())
            ],
        )
        .await?;

        let payment_id = generate_id(conn, PREFIX_PAYMENT).await?;
        let method = row
            .payment_method
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_PAYMENT_METHOD);
        conn.execute(
            "INSERT INTO payments (id, transaction_id, method, amount, status, paid_at)
             VALUES (?1, ?2, ?3, ?4, 'paid', ?5)",
            libsql::params![
                payment_id.as_str(),
                transaction_id.as_str(),
                method,
                amount,
                occurred_at.as_str()
            ],
        )
        .await?;

        let request = PostingRequest {
            ref_type: plan.kind.ref_type(),
            ref_id: transaction_id.clone(),
            posted_at: row.occurred_at,
            memo: Some(row.description.clone().unwrap_or_else(|| {
                format!("Legacy savings {} {}", plan.kind, row.id)
            })),
            lines: vec![
                LineInput::debit(plan.debit_code.as_str(), row.amount),
                LineInput::credit(plan.credit_code.as_str(), row.amount),
            ],
            metadata: Some(metadata),
        };
        let entry = self.post_within(conn, &request).await?;

        set_row_state(conn, row, state, LegacyRowState::Migrated, None).await?;

        Ok(BackfillOutcome::Migrated {
            entry_number: entry.entry_number,
            transaction_id,
        })
    }
}

async fn mark_skipped(
    conn: &Connection,
    row: &LegacySavingsTransaction,
    from: LegacyRowState,
    skip: RowSkip,
) -> Result<BackfillOutcome, DatabaseError> {
    debug_assert!(skip.error.is_row_recoverable());
    set_row_state(conn, row, from, LegacyRowState::Skipped, Some(skip.reason)).await?;
    Ok(skip.into_outcome())
}

/// Move a row along `unmigrated → migrated | skipped`.
///
/// `from` is the state the backfill decided the row is in, which differs
/// from the stored column when a row claims `migrated` without a marker.
async fn set_row_state(
    conn: &Connection,
    row: &LegacySavingsTransaction,
    from: LegacyRowState,
    to: LegacyRowState,
    reason: Option<SkipReason>,
) -> Result<(), DatabaseError> {
    if !from.can_transition_to(to) {
        return Err(LedgerError::InvalidTransition {
            entity_type: "legacy savings row".into(),
            id: row.id.clone(),
            from: from.to_string(),
            to: to.to_string(),
        }
        .into());
    }
    conn.execute(
        "UPDATE legacy_savings_transactions SET migration_status = ?1, skip_reason = ?2 WHERE id = ?3",
        libsql::params![to.as_str(), reason.map(SkipReason::as_str), row.id.as_str()],
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{savings_row, seeded_service, test_service_with};
    use crate::trail::writer::TrailWriter;
    use amanah_config::AmanahConfig;
    use amanah_core::enums::RefType;
    use amanah_core::trail::JobTrailRecord;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn conversion(id: &str, target_type: &str, target_id: Option<&str>) -> LegacySavingsTransaction {
        LegacySavingsTransaction {
            target_type: Some(target_type.into()),
            target_id: target_id.map(String::from),
            ..savings_row(id, "conversion")
        }
    }

    #[test]
    fn deposit_plan_uses_row_cash_account_first() {
        let config = BackfillConfig::default();
        let mut row = savings_row("sav-1", "Setoran");
        assert_eq!(
            plan(&row, &config).unwrap(),
            SavingsPlan {
                kind: SavingsKind::Deposit,
                debit_code: "1010".into(),
                credit_code: "2030".into(),
            }
        );
        row.cash_account_code = Some("1020".into());
        assert_eq!(plan(&row, &config).unwrap().debit_code, "1020");
    }

    #[test]
    fn conversion_plan_credits_target_liability() {
        let plan = plan(&conversion("sav-2", "Qurban", Some("qrb-1")), &BackfillConfig::default()).unwrap();
        assert_eq!(plan.kind, SavingsKind::Conversion);
        assert_eq!(plan.debit_code, "2030");
        assert_eq!(plan.credit_code, "2040");
    }

    #[rstest]
    #[case::unsupported_kind(savings_row("s", "withdrawal"), SkipReason::Unsupported)]
    #[case::missing_target_id(conversion("s", "qurban", None), SkipReason::InvalidReference)]
    #[case::unknown_target(conversion("s", "wakaf", Some("w-1")), SkipReason::InvalidReference)]
    #[case::zero_amount(
        LegacySavingsTransaction { amount: dec!(0), ..savings_row("s", "deposit") },
        SkipReason::InvalidReference
    )]
    fn unplannable_rows(#[case] row: LegacySavingsTransaction, #[case] reason: SkipReason) {
        let skip = plan(&row, &BackfillConfig::default()).unwrap_err();
        assert_eq!(skip.reason, reason);
        assert!(skip.error.is_row_recoverable());
    }

    #[tokio::test]
    async fn deposit_creates_transaction_payment_and_entry() {
        let svc = seeded_service().await;
        svc.insert_legacy_savings(&LegacySavingsTransaction {
            payment_method: Some("bank_transfer".into()),
            ..savings_row("sav-1", "deposit")
        })
        .await
        .unwrap();

        let report = svc.backfill_savings().await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.migrated, 1);

        let entry = svc
            .find_entry_by_legacy_reference("legacy_savings:sav-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.ref_type, RefType::SavingsDeposit);
        assert_eq!(entry.posted_at, savings_row("sav-1", "deposit").occurred_at);
        assert_eq!(entry.lines[0].account_code, "1010");
        assert_eq!(entry.lines[1].account_code, "2030");
        assert_eq!(entry.total_debit(), dec!(250000));

        let transaction = svc.get_transaction(&entry.ref_id).await.unwrap();
        assert_eq!(transaction.status, "paid");
        assert_eq!(transaction.amount, dec!(250000));
        assert_eq!(transaction.donor_ref, "donor-4");
        assert_eq!(
            transaction.metadata.unwrap()[LEGACY_REFERENCE_KEY],
            "legacy_savings:sav-1"
        );
        let payments = svc.payments_for(&transaction.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].method, "bank_transfer");

        assert_eq!(svc.account_balance("2030", None).await.unwrap(), dec!(250000));
        let rows = svc.list_legacy_savings(None, None).await.unwrap();
        assert_eq!(rows[0].migration_status, LegacyRowState::Migrated);
    }

    #[tokio::test]
    async fn rerun_reports_already_migrated() {
        let svc = seeded_service().await;
        svc.insert_legacy_savings(&savings_row("sav-1", "deposit"))
            .await
            .unwrap();

        let first = svc.backfill_savings().await.unwrap();
        assert_eq!(first.migrated, 1);

        let second = svc.backfill_savings().await.unwrap();
        assert_eq!(second.migrated, 0);
        assert_eq!(second.skipped_already_migrated, 1);
        assert_eq!(svc.list_entries(&Default::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn marker_wins_over_row_state() {
        let svc = seeded_service().await;
        svc.insert_legacy_savings(&savings_row("sav-1", "deposit"))
            .await
            .unwrap();
        let mut request = crate::test_support::posting(
            "txn-manual",
            savings_row("sav-1", "deposit").occurred_at,
            vec![LineInput::debit("1010", dec!(250000)), LineInput::credit("2030", dec!(250000))],
        );
        request.metadata = Some(serde_json::json!({ LEGACY_REFERENCE_KEY: "legacy_savings:sav-1" }));
        svc.post(&request).await.unwrap();

        let report = svc.backfill_savings().await.unwrap();
        assert_eq!(report.skipped_already_migrated, 1);
        assert_eq!(report.migrated, 0);
        let rows = svc.list_legacy_savings(None, None).await.unwrap();
        assert_eq!(rows[0].migration_status, LegacyRowState::Migrated);
    }

    #[tokio::test]
    async fn migrated_status_without_marker_is_still_posted() {
        let svc = seeded_service().await;
        for row in [savings_row("sav-1", "deposit"), savings_row("sav-2", "withdrawal")] {
            svc.insert_legacy_savings(&LegacySavingsTransaction {
                migration_status: LegacyRowState::Migrated,
                ..row
            })
            .await
            .unwrap();
        }

        let report = svc.backfill_savings().await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.migrated, 1);
        assert_eq!(report.skipped_already_migrated, 0);
        assert_eq!(report.skipped_unsupported, 1);
        assert!(
            svc.find_entry_by_legacy_reference("legacy_savings:sav-1")
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(svc.account_balance("2030", None).await.unwrap(), dec!(250000));

        let states: Vec<(String, LegacyRowState)> = svc
            .list_legacy_savings(None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.id, r.migration_status))
            .collect();
        assert_eq!(
            states,
            vec![
                ("sav-1".to_string(), LegacyRowState::Migrated),
                ("sav-2".to_string(), LegacyRowState::Skipped),
            ]
        );

        let again = svc.backfill_savings().await.unwrap();
        assert_eq!(again.migrated, 0);
        assert_eq!(again.skipped_already_migrated, 1);
    }

    #[tokio::test]
    async fn skipped_row_cannot_be_marked_migrated() {
        let svc = seeded_service().await;
        let row = LegacySavingsTransaction {
            migration_status: LegacyRowState::Skipped,
            skip_reason: Some(SkipReason::Unsupported),
            ..savings_row("sav-1", "deposit")
        };
        svc.insert_legacy_savings(&row).await.unwrap();

        let conn = svc.db().writer().await;
        let err = set_row_state(&conn, &row, row.migration_status, LegacyRowState::Migrated, None)
            .await
            .unwrap_err();
        assert!(matches!(err.ledger(), Some(LedgerError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn mixed_rows_are_counted_not_dropped() {
        let svc = seeded_service().await;
        for row in [
            savings_row("sav-1", "deposit"),
            conversion("sav-2", "qurban", Some("qrb-2026-goat-3")),
            savings_row("sav-3", "withdrawal"),
            conversion("sav-4", "qurban", None),
            LegacySavingsTransaction {
                cash_account_code: Some("1999".into()),
                ..savings_row("sav-5", "deposit")
            },
        ] {
            svc.insert_legacy_savings(&row).await.unwrap();
        }

        let report = svc.backfill_savings().await.unwrap();
        assert_eq!(
            report,
            BackfillReport {
                scanned: 5,
                migrated: 2,
                skipped_already_migrated: 0,
                skipped_unsupported: 1,
                skipped_invalid_reference: 2,
            }
        );

        // Deposit in, conversion out of savings into qurban.
        assert_eq!(svc.account_balance("2030", None).await.unwrap(), Decimal::ZERO);
        assert_eq!(svc.account_balance("2040", None).await.unwrap(), dec!(250000));

        let skipped = svc
            .list_legacy_savings(Some(LegacyRowState::Skipped), None)
            .await
            .unwrap();
        let reasons: Vec<(&str, Option<SkipReason>)> =
            skipped.iter().map(|r| (r.id.as_str(), r.skip_reason)).collect();
        assert_eq!(
            reasons,
            vec![
                ("sav-3", Some(SkipReason::Unsupported)),
                ("sav-4", Some(SkipReason::InvalidReference)),
                ("sav-5", Some(SkipReason::InvalidReference)),
            ]
        );

        let again = svc.backfill_savings().await.unwrap();
        assert_eq!(again.migrated, 0);
        assert_eq!(again.skipped_already_migrated, 2);
        assert_eq!(again.skipped_unsupported, 1);
        assert_eq!(again.skipped_invalid_reference, 2);
    }

    #[tokio::test]
    async fn pages_through_all_rows() {
        let mut config = AmanahConfig::default();
        config.migration.batch_size = 2;
        let svc = test_service_with(config, TrailWriter::disabled()).await;
        crate::test_support::seed_chart(&svc).await;
        for n in 1..=5 {
            svc.insert_legacy_savings(&savings_row(&format!("sav-{n}"), "deposit"))
                .await
                .unwrap();
        }

        let report = svc.backfill_savings().await.unwrap();
        assert_eq!(report.scanned, 5);
        assert_eq!(report.migrated, 5);

        let numbers: Vec<String> = svc
            .list_entries(&Default::default())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.entry_number)
            .collect();
        assert_eq!(numbers.len(), 5);
        assert!(numbers.contains(&"JE-202601-000005".to_string()));
    }

    #[tokio::test]
    async fn unwritable_trail_does_not_fail_committed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let trail = TrailWriter::new(dir.path().to_path_buf()).unwrap();
        std::fs::create_dir(trail.path_for(JOB)).unwrap();
        let svc = test_service_with(AmanahConfig::default(), trail).await;
        crate::test_support::seed_chart(&svc).await;
        svc.insert_legacy_savings(&savings_row("sav-1", "withdrawal"))
            .await
            .unwrap();
        svc.insert_legacy_savings(&savings_row("sav-2", "deposit"))
            .await
            .unwrap();

        let report = svc.backfill_savings().await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.migrated, 1);
        assert_eq!(report.skipped_unsupported, 1);
    }

    #[tokio::test]
    async fn skips_and_summary_go_to_trail() {
        let dir = tempfile::tempdir().unwrap();
        let trail = TrailWriter::new(dir.path().to_path_buf()).unwrap();
        let svc = test_service_with(AmanahConfig::default(), trail).await;
        crate::test_support::seed_chart(&svc).await;
        svc.insert_legacy_savings(&savings_row("sav-1", "withdrawal"))
            .await
            .unwrap();
        svc.insert_legacy_savings(&savings_row("sav-2", "deposit"))
            .await
            .unwrap();
        svc.backfill_savings().await.unwrap();

        let records = serde_jsonlines::json_lines::<JobTrailRecord, _>(svc.trail().path_for(JOB))
            .unwrap()
            .collect::<std::io::Result<Vec<_>>>()
            .unwrap();
        let events: Vec<TrailEvent> = records.iter().map(|r| r.event).collect();
        assert_eq!(events, vec![TrailEvent::RowSkipped, TrailEvent::RunCompleted]);
        assert_eq!(records[0].data["row_id"], "sav-1");
        assert_eq!(records[0].data["reason"], "unsupported");
        assert_eq!(records[1].data["migrated"], 1);
        assert!(records.iter().all(|r| r.run_id == records[0].run_id));
    }
}
