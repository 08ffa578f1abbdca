//! Conversion between decimal amounts and stored integer minor units.
//!
//! Amounts cross the API as `Decimal` and are persisted as `INTEGER` minor
//! units, so every sum the store computes is exact integer arithmetic.

use rust_decimal::Decimal;

use crate::errors::LedgerError;

/// Largest number of decimal places a ledger may be configured with.
pub const MAX_MINOR_UNIT_DIGITS: u32 = 9;

/// The minor-unit precision of a ledger's currency.
///
/// `digits = 0` stores whole units (e.g. IDR), `digits = 2` stores cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinorUnits {
    digits: u32,
}

impl MinorUnits {
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `digits` exceeds
    /// [`MAX_MINOR_UNIT_DIGITS`].
    pub fn new(digits: u32) -> Result<Self, LedgerError> {
        if digits > MAX_MINOR_UNIT_DIGITS {
            return Err(LedgerError::Validation(format!(
                "minor_unit_digits must be at most {MAX_MINOR_UNIT_DIGITS}, got {digits}"
            )));
        }
        Ok(Self { digits })
    }

    #[must_use]
    pub const fn digits(self) -> u32 {
        self.digits
    }

    /// Convert an amount to minor units without rounding.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the amount carries more decimal
    /// places than the ledger stores, or does not fit in an `i64`.
    pub fn to_minor(self, amount: Decimal) -> Result<i64, LedgerError> {
        if amount.round_dp(self.digits) != amount {
            return Err(LedgerError::Validation(format!(
                "amount {amount} has more than {} decimal places",
                self.digits
            )));
        }
        let mut scaled = amount;
        scaled.rescale(self.digits);
        i64::try_from(scaled.mantissa())
            .map_err(|_| LedgerError::Validation(format!("amount {amount} is out of range")))
    }

    /// Convert stored minor units back to a decimal amount.
    #[must_use]
    pub fn from_minor(self, minor: i64) -> Decimal {
        Decimal::new(minor, self.digits)
    }
}
