//! Ledger error taxonomy.
//!
//! These errors describe rule violations that can be detected without knowing
//! how the ledger is stored. Storage failures live in `amanah-db`'s
//! `DatabaseError`, which wraps `LedgerError` transparently.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::enums::{AccountType, NormalBalance};

/// Errors raised by ledger rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An account with this code already exists.
    #[error("Account code already exists: {code}")]
    DuplicateCode { code: String },

    /// The normal balance does not match the one implied by the account type.
    #[error(
        "Invalid normal balance for account {code}: {account_type} accounts are {expected}-normal, got {actual}"
    )]
    InvalidNormalBalance {
        code: String,
        account_type: AccountType,
        expected: NormalBalance,
        actual: NormalBalance,
    },

    /// Debit and credit totals of an entry differ.
    #[error("Unbalanced entry: debit {total_debit} != credit {total_credit}")]
    UnbalancedEntry {
        total_debit: Decimal,
        total_credit: Decimal,
    },

    /// A line (or the line set as a whole) is malformed.
    #[error("Invalid line: {0}")]
    InvalidLine(String),

    /// The account code does not resolve to a postable account.
    #[error("Account not found or not postable: {code}")]
    AccountNotFound { code: String },

    /// A migration would leave the ledger unbalanced. Never recovered locally.
    #[error(
        "Migration integrity violation: aggregate debit {total_debit} != credit {total_credit} ({} unbalanced entries)",
        unbalanced_entries.len()
    )]
    MigrationIntegrityViolation {
        total_debit: Decimal,
        total_credit: Decimal,
        unbalanced_entries: Vec<String>,
    },

    /// A legacy row cannot be translated. Recovered by skipping the row.
    #[error("Legacy row {row_id} is unresolvable: {reason}")]
    LegacyRowUnresolvable { row_id: String, reason: String },

    /// A report was requested with `end < start`.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A status transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// A query filter is malformed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Data failed validation outside the posting rules.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LedgerError {
    /// Whether a batch job may skip the offending row and continue.
    #[must_use]
    pub const fn is_row_recoverable(&self) -> bool {
        matches!(self, Self::LegacyRowUnresolvable { .. })
    }
}
