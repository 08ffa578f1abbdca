//! Batch job reports and CLI response types returned as JSON by `amanah`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SkipReason;

/// Summary of a liability-model migration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LiabilityMigrationReport {
    pub dry_run: bool,
    /// Legacy code → liability code pairs that were applied.
    pub mapping: BTreeMap<String, String>,
    pub lines_rewritten: u64,
    pub entries_touched: u64,
    /// Legacy accounts marked non-postable by this run.
    pub accounts_retired: Vec<String>,
    /// Mapped legacy codes with no account in the chart.
    pub missing_sources: Vec<String>,
    /// Aggregate ledger totals after the rewrite.
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

/// Outcome of processing one legacy savings row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BackfillOutcome {
    Migrated {
        entry_number: String,
        transaction_id: String,
    },
    Skipped {
        reason: SkipReason,
        detail: String,
    },
}

/// Counts reported by a savings backfill run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BackfillReport {
    pub scanned: u64,
    pub migrated: u64,
    pub skipped_already_migrated: u64,
    pub skipped_unsupported: u64,
    pub skipped_invalid_reference: u64,
}

impl BackfillReport {
    /// Count one row's outcome.
    pub const fn record(&mut self, outcome: &BackfillOutcome) {
        self.scanned += 1;
        match outcome {
            BackfillOutcome::Migrated { .. } => self.migrated += 1,
            BackfillOutcome::Skipped { reason, .. } => match reason {
                SkipReason::AlreadyMigrated => self.skipped_already_migrated += 1,
                SkipReason::Unsupported => self.skipped_unsupported += 1,
                SkipReason::InvalidReference => self.skipped_invalid_reference += 1,
            },
        }
    }

    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped_already_migrated + self.skipped_unsupported + self.skipped_invalid_reference
    }
}

/// Response from `amanah import`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportResponse {
    pub table: String,
    pub rows_imported: u64,
}

/// Response from `amanah balance`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BalanceResponse {
    pub account_code: String,
    pub as_of: Option<chrono::NaiveDate>,
    pub balance: Decimal,
}
