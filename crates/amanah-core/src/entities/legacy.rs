use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{LegacyRowState, SkipReason};

/// A pre-ledger transaction or disbursement row with a free-form category.
///
/// Both legacy sources share this shape; which table a record lives in is
/// given by `LegacySource`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LegacyRecord {
    pub id: String,
    /// The row's own type, e.g. `donation`, `zakat`, `program`.
    pub record_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// A row of the pre-ledger savings table (qurban/zakat savings).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LegacySavingsTransaction {
    pub id: String,
    pub saver_ref: String,
    /// Free-form kind; see `SavingsKind::parse`.
    pub kind: String,
    pub amount: Decimal,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    /// Cash or bank account that received a deposit.
    #[serde(default)]
    pub cash_account_code: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub migration_status: LegacyRowState,
    #[serde(default)]
    pub skip_reason: Option<SkipReason>,
}
