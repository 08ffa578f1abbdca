//! Serde roundtrip and JsonSchema validation tests for ledger types.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use schemars::schema_for;

use amanah_core::audit::{CategoryAuditReport, CategoryAuditRow, InvalidCategories};
use amanah_core::entities::*;
use amanah_core::enums::*;
use amanah_core::period::DateRange;
use amanah_core::posting::{LineInput, PostingRequest};
use amanah_core::reports::{AccountBalance, FinancialStatement};
use amanah_core::responses::*;
use amanah_core::trail::{JobTrailRecord, TRAIL_VERSION, TrailEvent};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn jan(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, 9, 30, 0).unwrap()
}

roundtrip_and_validate!(
    account_roundtrip,
    Account,
    Account {
        id: "acc-00000000000000a1".into(),
        code: "2010".into(),
        name: "Donation Liability".into(),
        account_type: AccountType::Liability,
        normal_balance: NormalBalance::Credit,
        category: Some("donation".into()),
        parent_code: Some("2000".into()),
        is_active: true,
        created_at: jan(1),
        updated_at: jan(1),
    }
);

roundtrip_and_validate!(
    ledger_entry_roundtrip,
    LedgerEntry,
    LedgerEntry {
        id: "je-00000000000000b2".into(),
        entry_number: "JE-202601-000001".into(),
        period: "2026-01".into(),
        sequence: 1,
        ref_type: RefType::Donation,
        ref_id: "don-771".into(),
        posted_at: jan(5),
        memo: Some("Campaign donation".into()),
        status: EntryStatus::Posted,
        metadata: Some(serde_json::json!({"channel": "qris"})),
        void_reason: None,
        lines: vec![
            LedgerLine {
                id: "jl-1".into(),
                entry_id: "je-00000000000000b2".into(),
                line_no: 1,
                account_code: "1020".into(),
                debit: dec!(100000),
                credit: dec!(0),
            },
            LedgerLine {
                id: "jl-2".into(),
                entry_id: "je-00000000000000b2".into(),
                line_no: 2,
                account_code: "2010".into(),
                debit: dec!(0),
                credit: dec!(100000),
            },
        ],
        created_at: jan(5),
    }
);

roundtrip_and_validate!(
    posting_request_roundtrip,
    PostingRequest,
    PostingRequest {
        ref_type: RefType::Disbursement,
        ref_id: "dis-9".into(),
        posted_at: jan(12),
        memo: None,
        lines: vec![
            LineInput::debit("2010", dec!(50000)),
            LineInput::credit("1020", dec!(50000)),
        ],
        metadata: None,
    }
);

roundtrip_and_validate!(
    legacy_savings_roundtrip,
    LegacySavingsTransaction,
    LegacySavingsTransaction {
        id: "sav-17".into(),
        saver_ref: "donor-4".into(),
        kind: "conversion".into(),
        amount: dec!(2500000),
        target_type: Some("qurban".into()),
        target_id: Some("qrb-2026-goat-3".into()),
        cash_account_code: None,
        payment_method: None,
        description: Some("Convert to qurban goat".into()),
        occurred_at: jan(20),
        migration_status: LegacyRowState::Skipped,
        skip_reason: Some(SkipReason::InvalidReference),
    }
);

roundtrip_and_validate!(
    financial_statement_roundtrip,
    FinancialStatement,
    FinancialStatement::assemble(
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap(),
        vec![
            AccountBalance::new(
                "1020".into(),
                "Bank".into(),
                AccountType::Asset,
                NormalBalance::Debit,
                dec!(100000),
                dec!(0),
            ),
            AccountBalance::new(
                "2010".into(),
                "Donation Liability".into(),
                AccountType::Liability,
                NormalBalance::Credit,
                dec!(0),
                dec!(100000),
            ),
        ],
        vec![],
        dec!(1),
    )
);

roundtrip_and_validate!(
    category_audit_report_roundtrip,
    CategoryAuditReport,
    CategoryAuditReport {
        range: DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap(),
        source: SourceFilter::All,
        invalid_categories: InvalidCategories {
            transactions: vec!["sedekah-lama".into()],
            disbursements: vec![],
        },
        rows: vec![CategoryAuditRow {
            source: LegacySource::Transactions,
            id: "trx-1".into(),
            record_type: "donation".into(),
            category: Some("sedekah-lama".into()),
            description: Some("Old donation".into()),
            reference: Some("INV-001".into()),
            amount: dec!(75000),
            occurred_at: jan(3),
            status: CategoryStatus::Unknown,
            matched_account: None,
        }],
        page: 1,
        per_page: 20,
        total_rows: 1,
        total_pages: 1,
    }
);

roundtrip_and_validate!(
    backfill_report_roundtrip,
    BackfillReport,
    BackfillReport {
        scanned: 4,
        migrated: 2,
        skipped_already_migrated: 1,
        skipped_unsupported: 1,
        skipped_invalid_reference: 0,
    }
);

roundtrip_and_validate!(
    trail_record_roundtrip,
    JobTrailRecord,
    JobTrailRecord {
        v: TRAIL_VERSION,
        ts: "2026-01-31T10:00:00Z".into(),
        job: "savings_backfill".into(),
        run_id: "run-1".into(),
        event: TrailEvent::RowSkipped,
        data: serde_json::json!({"row_id": "sav-3", "reason": "unsupported"}),
    }
);

#[test]
fn schema_rejects_unknown_ref_type() {
    let schema = serde_json::to_value(schema_for!(PostingRequest)).unwrap();
    let instance = serde_json::json!({
        "ref_type": "gift",
        "ref_id": "x",
        "posted_at": "2026-01-05T00:00:00Z",
        "lines": []
    });
    assert!(!validate_against_schema(&schema, &instance).is_empty());
}
