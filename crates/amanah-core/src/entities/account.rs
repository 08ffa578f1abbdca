use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AccountType, NormalBalance};
use crate::errors::LedgerError;

/// A node in the chart of accounts, keyed by its stable `code`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub normal_balance: NormalBalance,
    /// Free-form sub-classification; also accepted as a category key by the auditor.
    pub category: Option<String>,
    pub parent_code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub normal_balance: NormalBalance,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub parent_code: Option<String>,
}

impl NewAccount {
    /// Account whose normal balance follows from its type.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            normal_balance: account_type.normal_balance(),
            category: None,
            parent_code: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    /// Check the code shape and the type/normal-balance pairing.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a blank code or name, and
    /// `LedgerError::InvalidNormalBalance` when the pairing is wrong.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.code.trim().is_empty() || self.code.chars().any(char::is_whitespace) {
            return Err(LedgerError::Validation(format!(
                "account code '{}' must be non-empty without whitespace",
                self.code
            )));
        }
        if self.name.trim().is_empty() {
            return Err(LedgerError::Validation(format!(
                "account {} needs a name",
                self.code
            )));
        }
        let expected = self.account_type.normal_balance();
        if self.normal_balance != expected {
            return Err(LedgerError::InvalidNormalBalance {
                code: self.code.clone(),
                account_type: self.account_type,
                expected,
                actual: self.normal_balance,
            });
        }
        Ok(())
    }
}
