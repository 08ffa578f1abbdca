//! Category-consistency audit: types and the pure classification rule.
//!
//! Legacy rows carry free-form category strings. A category is accepted when
//! it names an account code, or an account's `category` key, whose type is
//! canonical for the row's source.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Account;
use crate::enums::{AccountType, CategoryStatus, LegacySource, SourceFilter};
use crate::errors::LedgerError;
use crate::period::DateRange;

/// Parameters of one audit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAuditQuery {
    pub range: DateRange,
    pub source: SourceFilter,
    /// Case-insensitive substring over description, reference, and category.
    pub search: Option<String>,
    /// Return only rows whose category is invalid.
    pub only_invalid: bool,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl CategoryAuditQuery {
    /// Check paging bounds against the configured maximum page size.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidFilter` for a zero page, a zero page size,
    /// or a page size above `max_per_page`.
    pub fn validate(&self, max_per_page: u32) -> Result<(), LedgerError> {
        if self.page == 0 {
            return Err(LedgerError::InvalidFilter("page starts at 1".into()));
        }
        if self.per_page == 0 || self.per_page > max_per_page {
            return Err(LedgerError::InvalidFilter(format!(
                "per_page must be between 1 and {max_per_page}, got {}",
                self.per_page
            )));
        }
        Ok(())
    }

    /// Zero-based index of the first row on the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// One legacy row with its classification.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CategoryAuditRow {
    pub source: LegacySource,
    pub id: String,
    pub record_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub status: CategoryStatus,
    /// Account the category resolved to, when any did.
    pub matched_account: Option<String>,
}

/// Distinct invalid category values per source, sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InvalidCategories {
    pub transactions: Vec<String>,
    pub disbursements: Vec<String>,
}

/// Result of an audit call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CategoryAuditReport {
    pub range: DateRange,
    pub source: SourceFilter,
    pub invalid_categories: InvalidCategories,
    pub rows: Vec<CategoryAuditRow>,
    pub page: u32,
    pub per_page: u32,
    /// Rows matching the filters across all pages.
    pub total_rows: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone)]
struct IndexedAccount {
    code: String,
    account_type: AccountType,
    is_active: bool,
}

/// Snapshot of the chart of accounts keyed for category lookups.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    by_code: HashMap<String, IndexedAccount>,
    by_key: HashMap<String, Vec<IndexedAccount>>,
}

impl CategoryIndex {
    #[must_use]
    pub fn new(accounts: &[Account]) -> Self {
        let mut index = Self::default();
        for account in accounts {
            let entry = IndexedAccount {
                code: account.code.clone(),
                account_type: account.account_type,
                is_active: account.is_active,
            };
            if let Some(key) = account.category.as_deref().map(normalize_key) {
                if !key.is_empty() {
                    index.by_key.entry(key).or_default().push(entry.clone());
                }
            }
            index.by_code.insert(account.code.clone(), entry);
        }
        index
    }

    /// Classify a category string for a row of `source`.
    #[must_use]
    pub fn classify(
        &self,
        category: Option<&str>,
        source: LegacySource,
    ) -> (CategoryStatus, Option<String>) {
        let Some(raw) = category.map(str::trim).filter(|c| !c.is_empty()) else {
            return (CategoryStatus::Missing, None);
        };

        let candidates: Vec<&IndexedAccount> = match self.by_code.get(raw) {
            Some(account) => vec![account],
            None => self
                .by_key
                .get(&normalize_key(raw))
                .map(|accounts| accounts.iter().collect())
                .unwrap_or_default(),
        };

        let canonical = source.canonical_account_types();
        let mut retired = None;
        let mut mismatched = None;
        for account in &candidates {
            if !canonical.contains(&account.account_type) {
                mismatched.get_or_insert_with(|| account.code.clone());
            } else if account.is_active {
                return (CategoryStatus::Valid, Some(account.code.clone()));
            } else {
                retired.get_or_insert_with(|| account.code.clone());
            }
        }

        if let Some(code) = retired {
            (CategoryStatus::Retired, Some(code))
        } else if let Some(code) = mismatched {
            (CategoryStatus::TypeMismatch, Some(code))
        } else {
            (CategoryStatus::Unknown, None)
        }
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
