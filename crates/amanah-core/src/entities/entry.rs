use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntryStatus, RefType};

/// One balanced journal record of an economic event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: String,
    pub entry_number: String,
    pub period: String,
    pub sequence: i64,
    pub ref_type: RefType,
    pub ref_id: String,
    /// Event date, distinct from `created_at`.
    pub posted_at: DateTime<Utc>,
    pub memo: Option<String>,
    pub status: EntryStatus,
    pub metadata: Option<serde_json::Value>,
    pub void_reason: Option<String>,
    pub lines: Vec<LedgerLine>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|line| line.debit).sum()
    }

    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|line| line.credit).sum()
    }

    /// Read a string field from the entry metadata.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

/// One debit or credit leg of an entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LedgerLine {
    pub id: String,
    pub entry_id: String,
    pub line_no: i64,
    pub account_code: String,
    pub debit: Decimal,
    pub credit: Decimal,
}
