//! Ledger-wide settings: currency precision, numbering, reconciliation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "IDR".to_string()
}

fn default_entry_number_prefix() -> String {
    "JE".to_string()
}

const fn default_tolerance() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// ISO currency code the ledger is kept in. Informational only.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Decimal places amounts may carry. Fixed once a database is created.
    #[serde(default)]
    pub minor_unit_digits: u32,

    /// Prefix of human-readable entry numbers.
    #[serde(default = "default_entry_number_prefix")]
    pub entry_number_prefix: String,

    /// Largest balance-sheet gap still reported as balanced.
    #[serde(default = "default_tolerance")]
    pub reconciliation_tolerance: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            minor_unit_digits: 0,
            entry_number_prefix: default_entry_number_prefix(),
            reconciliation_tolerance: default_tolerance(),
        }
    }
}
