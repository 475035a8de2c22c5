//! Amount - non-negative decimal value in base units

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Base units per settlement unit (10^18).
///
/// Loan figures (amounts, interest, supply) are quoted in whole settlement
/// units; the ledger books everything in base units.
pub const SETTLEMENT_SCALE: u64 = 1_000_000_000_000_000_000;

/// Largest unit figure accepted on a loan record or the initial supply.
///
/// Keeps every scaled value, including sums of principal and interest, well
/// inside `Decimal`'s 96-bit mantissa.
pub const MAX_UNIT_FIGURE: u64 = 1_000_000_000;

/// Errors related to Amount operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative decimal amount in base units
///
/// Invariant: value >= 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create a new Amount, rejecting negative values
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        Ok(Amount(value))
    }

    /// Create without validation.
    ///
    /// Caller must ensure `value >= 0`.
    pub const fn new_unchecked(value: Decimal) -> Self {
        Amount(value)
    }

    /// Scale a whole settlement-unit figure into base units.
    ///
    /// Callers keep `units` at or below [`MAX_UNIT_FIGURE`]; figures inside
    /// that range never overflow the decimal mantissa.
    pub fn from_units(units: u64) -> Self {
        Amount(Decimal::from(units) * Decimal::from(SETTLEMENT_SCALE))
    }

    /// Express this amount in settlement units (base units / 10^18)
    pub fn to_units(&self) -> Decimal {
        self.0 / Decimal::from(SETTLEMENT_SCALE)
    }

    /// Get the inner decimal value
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition, None on overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction, None if the result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result.is_sign_negative() && !result.is_zero() {
            return None;
        }
        Some(Amount(result))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
