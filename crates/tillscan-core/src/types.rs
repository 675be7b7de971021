//! # Shared Value Types
//!
//! Exact numeric and monetary values produced by the parsers.
//!
//! ## Why no floats?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Barcode digits "001086" with 3 implied decimals                        │
//! │                                                                         │
//! │    f64:            1.086 → 1.0859999999999999  ❌                      │
//! │    ScaledDecimal:  mantissa 1086, scale 3      ✅ exact                 │
//! │                                                                         │
//! │  Prices and weights leave this crate exactly as they were encoded.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::InterpretError;
use crate::validation::{first_invalid, Charset};

// =============================================================================
// Scaled Decimal
// =============================================================================

/// A decimal number stored as `mantissa / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScaledDecimal {
    mantissa: i64,
    scale: u8,
}

impl ScaledDecimal {
    /// Creates a decimal from its integer mantissa and scale.
    ///
    /// ```rust
    /// use tillscan_core::types::ScaledDecimal;
    ///
    /// let weight = ScaledDecimal::new(1086, 3);
    /// assert_eq!(weight.to_string(), "1.086");
    /// ```
    #[inline]
    pub const fn new(mantissa: i64, scale: u8) -> Self {
        ScaledDecimal { mantissa, scale }
    }

    /// Reads a run of ASCII digits with `places` implied decimals.
    ///
    /// Rejects empty input and anything but ASCII digits, then checks the
    /// decimal placement and the 64-bit range.
    pub fn from_digits(digits: &str, places: u8) -> Result<Self, InterpretError> {
        if digits.is_empty() {
            return Err(InterpretError::DigitCount {
                expected: "at least 1".to_string(),
                length: 0,
            });
        }
        if let Some((position, character)) = first_invalid(digits, Charset::Numeric) {
            return Err(InterpretError::InvalidCharacter {
                character,
                position,
            });
        }
        if usize::from(places) > digits.len() {
            return Err(InterpretError::DecimalPlaces {
                places,
                digits: digits.len(),
            });
        }
        let mantissa = digits
            .parse::<i64>()
            .map_err(|_| InterpretError::Overflow(digits.to_string()))?;
        Ok(ScaledDecimal::new(mantissa, places))
    }

    /// Integer value before the implied point is applied.
    #[inline]
    pub const fn mantissa(&self) -> i64 {
        self.mantissa
    }

    /// Number of implied decimal places.
    #[inline]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Returns the same value expressed with `scale` decimals, if exact.
    ///
    /// ```rust
    /// use tillscan_core::types::ScaledDecimal;
    ///
    /// assert_eq!(ScaledDecimal::new(125, 1).rescale(2), Some(ScaledDecimal::new(1250, 2)));
    /// assert_eq!(ScaledDecimal::new(1250, 2).rescale(1), Some(ScaledDecimal::new(125, 1)));
    /// assert_eq!(ScaledDecimal::new(1255, 2).rescale(1), None);
    /// ```
    pub fn rescale(&self, scale: u8) -> Option<Self> {
        if scale >= self.scale {
            let factor = 10_i64.checked_pow(u32::from(scale - self.scale))?;
            let mantissa = self.mantissa.checked_mul(factor)?;
            Some(ScaledDecimal::new(mantissa, scale))
        } else {
            let factor = 10_i64.checked_pow(u32::from(self.scale - scale))?;
            if self.mantissa % factor != 0 {
                return None;
            }
            Some(ScaledDecimal::new(self.mantissa / factor, scale))
        }
    }
}

impl fmt::Display for ScaledDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = usize::from(self.scale);
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}

// =============================================================================
// Currency
// =============================================================================

/// ISO 4217 numeric → alphabetic codes understood in GS1 amount fields.
const ISO_4217: &[(&str, &str)] = &[
    ("036", "AUD"),
    ("124", "CAD"),
    ("156", "CNY"),
    ("203", "CZK"),
    ("208", "DKK"),
    ("344", "HKD"),
    ("348", "HUF"),
    ("352", "ISK"),
    ("356", "INR"),
    ("392", "JPY"),
    ("410", "KRW"),
    ("484", "MXN"),
    ("554", "NZD"),
    ("578", "NOK"),
    ("643", "RUB"),
    ("702", "SGD"),
    ("710", "ZAR"),
    ("752", "SEK"),
    ("756", "CHF"),
    ("826", "GBP"),
    ("840", "USD"),
    ("946", "RON"),
    ("949", "TRY"),
    ("975", "BGN"),
    ("978", "EUR"),
    ("985", "PLN"),
    ("986", "BRL"),
];

/// An ISO 4217 alphabetic currency code, e.g. `SEK`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Wraps an alphabetic code. The code is upper-cased.
    pub fn new(alpha: &str) -> Self {
        CurrencyCode(alpha.to_ascii_uppercase())
    }

    /// Looks up a three-digit ISO 4217 numeric code.
    ///
    /// ```rust
    /// use tillscan_core::types::CurrencyCode;
    ///
    /// assert_eq!(CurrencyCode::from_numeric("752").unwrap().as_str(), "SEK");
    /// assert!(CurrencyCode::from_numeric("000").is_none());
    /// ```
    pub fn from_numeric(numeric: &str) -> Option<Self> {
        ISO_4217
            .iter()
            .find(|(code, _)| *code == numeric)
            .map(|(_, alpha)| CurrencyCode::new(alpha))
    }

    /// Returns the alphabetic code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Monetary Amount
// =============================================================================

/// A monetary amount as encoded in a barcode.
///
/// `currency` is `None` for GS1 amount fields without an ISO code
/// (AI 390n/392n), which are in the local currency of the scanning party.
/// Wrapping into a money type is left to the caller (see the `money`
/// feature).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonetaryAmount {
    pub currency: Option<CurrencyCode>,
    pub amount: ScaledDecimal,
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.currency {
            Some(currency) => write!(f, "{} {}", currency, self.amount),
            None => write!(f, "{}", self.amount),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_decimal_display() {
        assert_eq!(ScaledDecimal::new(1086, 3).to_string(), "1.086");
        assert_eq!(ScaledDecimal::new(5, 2).to_string(), "0.05");
        assert_eq!(ScaledDecimal::new(1500, 0).to_string(), "1500");
        assert_eq!(ScaledDecimal::new(-550, 2).to_string(), "-5.50");
        assert_eq!(ScaledDecimal::new(0, 3).to_string(), "0.000");
    }

    #[test]
    fn test_scaled_decimal_from_digits() {
        let value = ScaledDecimal::from_digits("001086", 3).unwrap();
        assert_eq!(value.mantissa(), 1086);
        assert_eq!(value.scale(), 3);

        assert_eq!(
            ScaledDecimal::from_digits("12", 3),
            Err(InterpretError::DecimalPlaces {
                places: 3,
                digits: 2
            })
        );
        assert!(matches!(
            ScaledDecimal::from_digits("99999999999999999999", 0),
            Err(InterpretError::Overflow(_))
        ));
    }

    #[test]
    fn test_from_digits_rejects_empty_and_signs() {
        assert_eq!(
            ScaledDecimal::from_digits("", 0),
            Err(InterpretError::DigitCount {
                expected: "at least 1".to_string(),
                length: 0
            })
        );
        assert_eq!(
            ScaledDecimal::from_digits("+125", 1),
            Err(InterpretError::InvalidCharacter {
                character: '+',
                position: 0
            })
        );
    }

    #[test]
    fn test_currency_lookup() {
        assert_eq!(CurrencyCode::from_numeric("978"), Some(CurrencyCode::new("EUR")));
        assert_eq!(CurrencyCode::new("sek").as_str(), "SEK");
    }

    #[test]
    fn test_monetary_amount_display() {
        let amount = MonetaryAmount {
            currency: Some(CurrencyCode::new("NOK")),
            amount: ScaledDecimal::new(1250, 2),
        };
        assert_eq!(amount.to_string(), "NOK 12.50");
    }
}
