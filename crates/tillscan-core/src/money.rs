//! # Money Module
//!
//! Wraps scanned amounts into integer minor units of their currency.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BARCODE AMOUNT                         MONEY                           │
//! │                                                                         │
//! │  AI 3912 "752" "1250"                                                   │
//! │    currency SEK, 12.50 (scale 2)  ──►   1250 öre, SEK                   │
//! │                                                                         │
//! │  RCN "24" price 12.5 (scale 1), NOK ──► 1250 øre, NOK                   │
//! │                                                                         │
//! │  JPY 12.50 (scale 2)              ──►   PrecisionLoss (yen has no       │
//! │                                         minor unit)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are never converted through floating point. This module only
//! represents money; arithmetic stays with the caller.
//!
//! ## Usage
//! ```rust
//! use tillscan_core::money::Money;
//! use tillscan_core::types::{CurrencyCode, MonetaryAmount, ScaledDecimal};
//!
//! let amount = MonetaryAmount {
//!     currency: Some(CurrencyCode::new("SEK")),
//!     amount: ScaledDecimal::new(125, 1),
//! };
//! let money = Money::try_from(&amount).unwrap();
//! assert_eq!(money.minor_units(), 1250);
//! assert_eq!(money.to_string(), "SEK 12.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

use crate::types::{CurrencyCode, MonetaryAmount, ScaledDecimal};

/// Currencies whose minor unit is not 1/100.
const MINOR_UNIT_EXPONENTS: &[(&str, u8)] = &[
    ("BHD", 3),
    ("ISK", 0),
    ("JOD", 3),
    ("JPY", 0),
    ("KRW", 0),
    ("KWD", 3),
    ("OMR", 3),
    ("TND", 3),
];

/// Decimal places of the currency's minor unit (ISO 4217).
pub fn minor_unit_exponent(currency: &CurrencyCode) -> u8 {
    MINOR_UNIT_EXPONENTS
        .iter()
        .find(|(code, _)| *code == currency.as_str())
        .map_or(2, |(_, exponent)| *exponent)
}

// =============================================================================
// Money Error
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The amount carries no ISO 4217 code (AI 390n/392n, RCN without region).
    #[error("Amount {0} has no currency")]
    MissingCurrency(ScaledDecimal),

    /// The amount has more decimals than the currency's minor unit.
    #[error("Amount {amount} cannot be expressed in minor units of {currency}")]
    PrecisionLoss {
        amount: ScaledDecimal,
        currency: CurrencyCode,
    },
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of its currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money {
    minor_units: i64,
    currency: CurrencyCode,
}

impl Money {
    #[inline]
    pub fn from_minor_units(minor_units: i64, currency: CurrencyCode) -> Self {
        Money {
            minor_units,
            currency,
        }
    }

    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    #[inline]
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// The value as a decimal with the currency's exponent.
    pub fn as_decimal(&self) -> ScaledDecimal {
        ScaledDecimal::new(self.minor_units, minor_unit_exponent(&self.currency))
    }
}

impl TryFrom<&MonetaryAmount> for Money {
    type Error = MoneyError;

    fn try_from(value: &MonetaryAmount) -> Result<Self, Self::Error> {
        let currency = value
            .currency
            .clone()
            .ok_or(MoneyError::MissingCurrency(value.amount))?;
        let scaled = value
            .amount
            .rescale(minor_unit_exponent(&currency))
            .ok_or_else(|| MoneyError::PrecisionLoss {
                amount: value.amount,
                currency: currency.clone(),
            })?;
        Ok(Money::from_minor_units(scaled.mantissa(), currency))
    }
}

/// Renders `SEK 12.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.as_decimal())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
