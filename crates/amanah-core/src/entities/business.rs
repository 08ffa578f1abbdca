use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RefType;

/// Canonical business transaction synthesized for a migrated legacy row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub kind: RefType,
    pub donor_ref: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub amount: Decimal,
    pub status: String,
    pub occurred_at: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Payment record settling a canonical transaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Payment {
    pub id: String,
    pub transaction_id: String,
    pub method: String,
    pub amount: Decimal,
    pub status: String,
    pub paid_at: DateTime<Utc>,
}
