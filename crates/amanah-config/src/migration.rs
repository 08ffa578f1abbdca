//! Settings for the two batch jobs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Retired income/expense codes and the liability account replacing them.
pub const DEFAULT_LIABILITY_MAP: [(&str, &str); 5] = [
    ("4100", "2100"),
    ("4200", "2100"),
    ("4300", "2100"),
    ("5100", "2100"),
    ("5200", "2100"),
];

fn default_liability_map() -> BTreeMap<String, String> {
    DEFAULT_LIABILITY_MAP
        .iter()
        .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
        .collect()
}

const fn default_batch_size() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigrationConfig {
    /// Legacy account code → liability account code.
    #[serde(default = "default_liability_map")]
    pub liability_map: BTreeMap<String, String>,

    /// Directory for JSONL run trails. Empty disables the trail.
    #[serde(default)]
    pub trail_dir: String,

    /// Legacy rows fetched per page by the backfill.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

impl MigrationConfig {
    #[must_use]
    pub fn trail_enabled(&self) -> bool {
        !self.trail_dir.is_empty()
    }

    /// A code that is mapped away and also used as a target.
    ///
    /// Such a map retires the code and then writes lines onto it.
    #[must_use]
    pub fn chained_code(&self) -> Option<&str> {
        self.liability_map
            .keys()
            .find(|from| self.liability_map.values().any(|to| to == *from))
            .map(String::as_str)
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            liability_map: default_liability_map(),
            trail_dir: String::new(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_cash_account_code() -> String {
    "1010".to_string()
}

fn default_savings_liability_code() -> String {
    "2030".to_string()
}

fn default_conversion_targets() -> BTreeMap<String, String> {
    [("qurban", "2040"), ("campaign", "2010"), ("zakat", "2020")]
        .iter()
        .map(|(target, code)| ((*target).to_string(), (*code).to_string()))
        .collect()
}

/// Account codes used when translating legacy savings rows.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackfillConfig {
    /// Debited by deposits that do not name their own cash account.
    #[serde(default = "default_cash_account_code")]
    pub cash_account_code: String,

    /// Liability holding savers' balances.
    #[serde(default = "default_savings_liability_code")]
    pub savings_liability_code: String,

    /// Conversion target type → liability account credited.
    #[serde(default = "default_conversion_targets")]
    pub conversion_targets: BTreeMap<String, String>,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            cash_account_code: default_cash_account_code(),
            savings_liability_code: default_savings_liability_code(),
            conversion_targets: default_conversion_targets(),
        }
    }
}
