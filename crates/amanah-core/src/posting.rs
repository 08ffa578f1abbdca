//! Posting requests and the pure validation every posting goes through.
//!
//! Validation runs in a fixed order before anything touches the store:
//! 1. at least two lines
//! 2. every line has exactly one positive side and fits the minor-unit precision
//! 3. debit and credit totals are exactly equal
//!
//! Account resolution (step 4) needs the store and happens in `amanah-db`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::LedgerEntry;
use crate::enums::RefType;
use crate::errors::LedgerError;
use crate::money::MinorUnits;

/// A proposed entry submitted to the posting engine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PostingRequest {
    pub ref_type: RefType,
    pub ref_id: String,
    pub posted_at: DateTime<Utc>,
    #[serde(default)]
    pub memo: Option<String>,
    pub lines: Vec<LineInput>,
    /// Free-form JSON object stored with the entry.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// One proposed debit or credit leg.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LineInput {
    pub account_code: String,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
}

impl LineInput {
    #[must_use]
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// A line that passed validation, with amounts in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    pub account_code: String,
    pub debit: i64,
    pub credit: i64,
}

impl PostingRequest {
    /// Run steps 1-3 of posting validation.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a blank `ref_id` or non-object
    /// metadata, `LedgerError::InvalidLine` for malformed lines, and
    /// `LedgerError::UnbalancedEntry` when totals differ.
    pub fn validate(&self, units: MinorUnits) -> Result<Vec<ValidatedLine>, LedgerError> {
        if self.ref_id.trim().is_empty() {
            return Err(LedgerError::Validation("ref_id must not be empty".into()));
        }
        if let Some(metadata) = &self.metadata {
            if !metadata.is_object() {
                return Err(LedgerError::Validation(
                    "metadata must be a JSON object".into(),
                ));
            }
        }
        validate_lines(&self.lines, units)
    }
}

/// Validate a line set against the posting rules.
///
/// # Errors
///
/// See [`PostingRequest::validate`].
pub fn validate_lines(
    lines: &[LineInput],
    units: MinorUnits,
) -> Result<Vec<ValidatedLine>, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InvalidLine(format!(
            "an entry needs at least 2 lines, got {}",
            lines.len()
        )));
    }

    let mut validated = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let n = index + 1;
        if line.account_code.trim().is_empty() {
            return Err(LedgerError::InvalidLine(format!(
                "line {n}: account code is empty"
            )));
        }
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::InvalidLine(format!(
                "line {n}: amounts must not be negative"
            )));
        }
        let has_debit = line.debit > Decimal::ZERO;
        let has_credit = line.credit > Decimal::ZERO;
        if has_debit == has_credit {
            return Err(LedgerError::InvalidLine(format!(
                "line {n}: exactly one of debit or credit must be positive"
            )));
        }
        let debit = units
            .to_minor(line.debit)
            .map_err(|e| LedgerError::InvalidLine(format!("line {n}: {e}")))?;
        let credit = units
            .to_minor(line.credit)
            .map_err(|e| LedgerError::InvalidLine(format!("line {n}: {e}")))?;
        validated.push(ValidatedLine {
            account_code: line.account_code.clone(),
            debit,
            credit,
        });
    }

    let total_debit: Decimal = lines.iter().map(|line| line.debit).sum();
    let total_credit: Decimal = lines.iter().map(|line| line.credit).sum();
    if total_debit != total_credit {
        return Err(LedgerError::UnbalancedEntry {
            total_debit,
            total_credit,
        });
    }

    let minor_total = validated
        .iter()
        .try_fold(0i64, |acc, line| acc.checked_add(line.debit));
    if minor_total.is_none() {
        return Err(LedgerError::InvalidLine(
            "entry totals exceed the storable range".into(),
        ));
    }

    Ok(validated)
}

/// Lines that offset `entry` exactly: every debit becomes a credit and back.
#[must_use]
pub fn reversal_lines(entry: &LedgerEntry) -> Vec<LineInput> {
    entry
        .lines
        .iter()
        .map(|line| LineInput {
            account_code: line.account_code.clone(),
            debit: line.credit,
            credit: line.debit,
        })
        .collect()
}
