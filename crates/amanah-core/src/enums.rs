//! Account types, balance sides, entry lifecycle, and legacy-source enums.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage. Status enums with state machines
//! provide `allowed_next_states()` so transitions are checked in one place.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::LedgerError;

/// Implements `FromStr` by matching against `as_str()` of every variant in `ALL`.
macro_rules! from_str_via_all {
    ($ty:ty, $label:literal) => {
        impl FromStr for $ty {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| LedgerError::Validation(format!("unknown {}: '{s}'", $label)))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// NormalBalance
// ---------------------------------------------------------------------------

/// The side on which an account naturally accumulates value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    Debit,
    Credit,
}

impl NormalBalance {
    pub const ALL: [Self; 2] = [Self::Debit, Self::Credit];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Balance in the account's natural direction.
    ///
    /// Debit-normal accounts report `debit - credit`; credit-normal accounts
    /// report `credit - debit`. A positive result is an expected balance.
    #[must_use]
    pub fn signed_balance(self, total_debit: Decimal, total_credit: Decimal) -> Decimal {
        match self {
            Self::Debit => total_debit - total_credit,
            Self::Credit => total_credit - total_debit,
        }
    }
}

impl fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

from_str_via_all!(NormalBalance, "normal balance");

// ---------------------------------------------------------------------------
// AccountType
// ---------------------------------------------------------------------------

/// Classification of an account in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountType {
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// The only normal balance an account of this type may carry.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }

    /// Point-in-time accounts reported cumulatively on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

from_str_via_all!(AccountType, "account type");

// ---------------------------------------------------------------------------
// EntryStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a ledger entry. Entries are never deleted.
///
/// ```text
/// posted → voided
///        → reversed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Posted,
    Voided,
    Reversed,
}

impl EntryStatus {
    pub const ALL: [Self; 3] = [Self::Posted, Self::Voided, Self::Reversed];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Posted => &[Self::Voided, Self::Reversed],
            Self::Voided | Self::Reversed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether lines of an entry in this state count toward balances.
    ///
    /// A reversed entry still counts; its reversal entry offsets it.
    #[must_use]
    pub const fn counts_toward_balance(self) -> bool {
        !matches!(self, Self::Voided)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Voided => "voided",
            Self::Reversed => "reversed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

from_str_via_all!(EntryStatus, "entry status");

// ---------------------------------------------------------------------------
// RefType
// ---------------------------------------------------------------------------

/// Origin of a ledger entry. Paired with `ref_id` as a weak reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    Donation,
    Disbursement,
    SavingsDeposit,
    SavingsConversion,
    MigrationBackfill,
    Reversal,
    Adjustment,
}

impl RefType {
    pub const ALL: [Self; 7] = [
        Self::Donation,
        Self::Disbursement,
        Self::SavingsDeposit,
        Self::SavingsConversion,
        Self::MigrationBackfill,
        Self::Reversal,
        Self::Adjustment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::Disbursement => "disbursement",
            Self::SavingsDeposit => "savings_deposit",
            Self::SavingsConversion => "savings_conversion",
            Self::MigrationBackfill => "migration_backfill",
            Self::Reversal => "reversal",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

from_str_via_all!(RefType, "ref type");

// ---------------------------------------------------------------------------
// LegacySource / SourceFilter
// ---------------------------------------------------------------------------

/// A pre-ledger table carrying free-form category strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LegacySource {
    /// Incoming money: donations, zakat, infaq.
    Transactions,
    /// Outgoing money: program and operational disbursements.
    Disbursements,
}

impl LegacySource {
    pub const ALL: [Self; 2] = [Self::Transactions, Self::Disbursements];

    /// Account types a category on this source may legitimately point at.
    #[must_use]
    pub const fn canonical_account_types(self) -> &'static [AccountType] {
        match self {
            Self::Transactions => &[AccountType::Income, AccountType::Liability],
            Self::Disbursements => &[AccountType::Expense, AccountType::Liability],
        }
    }

    /// Table holding rows of this source.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Transactions => "legacy_transactions",
            Self::Disbursements => "legacy_disbursements",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Disbursements => "disbursements",
        }
    }
}

impl fmt::Display for LegacySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which legacy sources a category audit covers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceFilter {
    #[default]
    All,
    Transactions,
    Disbursements,
}

impl SourceFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Transactions, Self::Disbursements];

    #[must_use]
    pub const fn includes(self, source: LegacySource) -> bool {
        matches!(
            (self, source),
            (Self::All, _)
                | (Self::Transactions, LegacySource::Transactions)
                | (Self::Disbursements, LegacySource::Disbursements)
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Transactions => "transactions",
            Self::Disbursements => "disbursements",
        }
    }
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

from_str_via_all!(SourceFilter, "source filter");

// ---------------------------------------------------------------------------
// CategoryStatus
// ---------------------------------------------------------------------------

/// Outcome of checking one legacy category string against the COA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    /// Matches an active account of a canonical type.
    Valid,
    /// Matches a deactivated account of a canonical type.
    Retired,
    /// Matches an account whose type is not canonical for the source.
    TypeMismatch,
    /// Matches no account code or category key.
    Unknown,
    /// The row has no category at all.
    Missing,
}

impl CategoryStatus {
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::TypeMismatch | Self::Unknown | Self::Missing)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Retired => "retired",
            Self::TypeMismatch => "type_mismatch",
            Self::Unknown => "unknown",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SavingsKind
// ---------------------------------------------------------------------------

/// Legacy savings transaction kinds the backfill knows how to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SavingsKind {
    /// Money paid into a saver's balance.
    Deposit,
    /// Saved balance moved into a target such as a qurban order.
    Conversion,
}

impl SavingsKind {
    /// Parse the free-form kind stored on legacy rows.
    ///
    /// Returns `None` for kinds the backfill does not support.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deposit" | "setoran" => Some(Self::Deposit),
            "conversion" | "convert" | "konversi" => Some(Self::Conversion),
            _ => None,
        }
    }

    #[must_use]
    pub const fn ref_type(self) -> RefType {
        match self {
            Self::Deposit => RefType::SavingsDeposit,
            Self::Conversion => RefType::SavingsConversion,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Conversion => "conversion",
        }
    }
}

impl fmt::Display for SavingsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LegacyRowState / SkipReason
// ---------------------------------------------------------------------------

/// Why a legacy row was not migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyMigrated,
    Unsupported,
    InvalidReference,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyMigrated => "already_migrated",
            Self::Unsupported => "unsupported",
            Self::InvalidReference => "invalid_reference",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Migration state of a legacy savings row.
///
/// ```text
/// unmigrated → migrated
///            → skipped
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LegacyRowState {
    #[default]
    Unmigrated,
    Migrated,
    Skipped,
}

impl LegacyRowState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Unmigrated => &[Self::Migrated, Self::Skipped],
            Self::Migrated | Self::Skipped => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unmigrated => "unmigrated",
            Self::Migrated => "migrated",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for LegacyRowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
