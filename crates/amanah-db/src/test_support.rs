//! Shared test utilities for amanah-db unit tests.

use amanah_config::AmanahConfig;
use amanah_core::entities::{LegacySavingsTransaction, NewAccount};
use amanah_core::enums::{AccountType, LegacyRowState, RefType};
use amanah_core::money::MinorUnits;
use amanah_core::posting::{LineInput, PostingRequest};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use crate::LedgerDb;
use crate::service::LedgerService;
use crate::trail::writer::TrailWriter;

/// Create an in-memory `LedgerService` with trail disabled.
pub async fn test_service() -> LedgerService {
    test_service_with(AmanahConfig::default(), TrailWriter::disabled()).await
}

/// Create an in-memory `LedgerService` from a specific config and trail.
pub async fn test_service_with(config: AmanahConfig, trail: TrailWriter) -> LedgerService {
    let units = MinorUnits::new(config.ledger.minor_unit_digits).unwrap();
    let db = LedgerDb::open_in_memory(units).await.unwrap();
    LedgerService::from_db(db, config, trail)
}

/// In-memory service with [`standard_chart`] loaded.
pub async fn seeded_service() -> LedgerService {
    let svc = test_service().await;
    seed_chart(&svc).await;
    svc
}

/// A small donation-platform chart, including the legacy income/expense
/// codes retired by the liability migration.
pub fn standard_chart() -> Vec<NewAccount> {
    vec![
        NewAccount::new("1010", "Cash", AccountType::Asset).with_category("cash"),
        NewAccount::new("1020", "Bank", AccountType::Asset).with_category("bank"),
        NewAccount::new("2010", "Donation Liability", AccountType::Liability)
            .with_category("donation"),
        NewAccount::new("2020", "Zakat Liability", AccountType::Liability).with_category("zakat"),
        NewAccount::new("2030", "Savings Liability", AccountType::Liability)
            .with_category("savings"),
        NewAccount::new("2040", "Qurban Liability", AccountType::Liability)
            .with_category("qurban"),
        NewAccount::new("2100", "Funds Held in Trust", AccountType::Liability),
        NewAccount::new("3000", "Opening Equity", AccountType::Equity),
        NewAccount::new("4100", "Donation Income", AccountType::Income).with_category("donasi"),
        NewAccount::new("4200", "Zakat Income", AccountType::Income),
        NewAccount::new("5100", "Program Expense", AccountType::Expense)
            .with_category("program"),
        NewAccount::new("5200", "Operational Expense", AccountType::Expense)
            .with_category("operasional"),
    ]
}

pub async fn seed_chart(svc: &LedgerService) {
    for account in standard_chart() {
        svc.create_account(&account).await.unwrap();
    }
}

pub fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, 9, 0, 0).unwrap()
}

/// A posting request with the given lines.
pub fn posting(ref_id: &str, posted_at: DateTime<Utc>, lines: Vec<LineInput>) -> PostingRequest {
    PostingRequest {
        ref_type: RefType::Donation,
        ref_id: ref_id.into(),
        posted_at,
        memo: None,
        lines,
        metadata: None,
    }
}

/// An unmigrated legacy savings row of 250000 dated 15 January.
pub fn savings_row(id: &str, kind: &str) -> LegacySavingsTransaction {
    LegacySavingsTransaction {
        id: id.into(),
        saver_ref: "donor-4".into(),
        kind: kind.into(),
        amount: dec!(250000),
        target_type: None,
        target_id: None,
        cash_account_code: None,
        payment_method: None,
        description: None,
        occurred_at: at(1, 15),
        migration_status: LegacyRowState::Unmigrated,
        skip_reason: None,
    }
}
