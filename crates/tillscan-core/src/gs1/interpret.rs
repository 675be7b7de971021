//! # Field Value Interpreters
//!
//! Turn the raw characters of a GS1 field into typed values.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AI   raw           interpreter             value                      │
//! │  ──   ───────────   ─────────────────────   ──────────────────────     │
//! │  17   100425        date                    2010-04-25                 │
//! │  15   240200        date (day 00)           2024-02-29, day unknown    │
//! │  3103 001086        decimal(places = 3)     1.086                      │
//! │  3912 7521250       amount_with_currency    SEK 12.50                  │
//! │  7003 2304251530    date_time               2023-04-25 15:30           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers validate the character set first; the interpreters only check
//! what the characters mean.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::InterpretError;
use crate::types::{CurrencyCode, MonetaryAmount, ScaledDecimal};
use crate::validation::{digit_value, first_invalid, Charset};

// =============================================================================
// Year Expansion
// =============================================================================

/// How a two-digit year `YY` becomes a full year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum YearExpansion {
    /// `YY < pivot` is 20YY, otherwise 19YY.
    Fixed { pivot: u8 },

    /// GS1 General Specifications section 7.12: a year more than 50 years
    /// ahead of the reference year is in the previous century, one 50 or
    /// more years behind is in the next.
    SlidingWindow { reference_year: i32 },
}

impl Default for YearExpansion {
    fn default() -> Self {
        YearExpansion::Fixed { pivot: 50 }
    }
}

impl YearExpansion {
    /// Expands `yy` (0..=99).
    ///
    /// ```rust
    /// use tillscan_core::gs1::interpret::YearExpansion;
    ///
    /// assert_eq!(YearExpansion::Fixed { pivot: 50 }.expand(49), 2049);
    /// assert_eq!(YearExpansion::Fixed { pivot: 50 }.expand(50), 1950);
    /// assert_eq!(YearExpansion::SlidingWindow { reference_year: 2025 }.expand(76), 1976);
    /// ```
    pub fn expand(&self, yy: u32) -> i32 {
        let yy = yy as i32;
        match *self {
            YearExpansion::Fixed { pivot } => {
                if yy < i32::from(pivot) {
                    2000 + yy
                } else {
                    1900 + yy
                }
            }
            YearExpansion::SlidingWindow { reference_year } => {
                let century = reference_year - reference_year.rem_euclid(100);
                match yy - reference_year.rem_euclid(100) {
                    51..=99 => century - 100 + yy,
                    -99..=-50 => century + 100 + yy,
                    _ => century + yy,
                }
            }
        }
    }
}

// =============================================================================
// Dates
// =============================================================================

/// A GS1 date (`YYMMDD`).
///
/// Day `00` means "day not specified"; the date then resolves to the last
/// day of the month and `day_unknown` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Gs1Date {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub day_unknown: bool,
}

impl fmt::Display for Gs1Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date)
    }
}

/// Every interpreter reads bytes, so non-digits are rejected up front.
fn require_digits(raw: &str) -> Result<(), InterpretError> {
    match first_invalid(raw, Charset::Numeric) {
        Some((position, character)) => Err(InterpretError::InvalidCharacter {
            character,
            position,
        }),
        None => Ok(()),
    }
}

fn two_digits(raw: &[u8], at: usize) -> u32 {
    digit_value(raw[at]) * 10 + digit_value(raw[at + 1])
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next?.pred_opt()
}

/// Interprets a six-digit `YYMMDD` date.
///
/// ```rust
/// use tillscan_core::gs1::interpret::{date, YearExpansion};
///
/// let expiry = date("240200", YearExpansion::default()).unwrap();
/// assert_eq!(expiry.to_string(), "2024-02-29");
/// assert!(expiry.day_unknown);
/// ```
pub fn date(raw: &str, years: YearExpansion) -> Result<Gs1Date, InterpretError> {
    require_digits(raw)?;
    if raw.len() != 6 {
        return Err(InterpretError::DigitCount {
            expected: "6".to_string(),
            length: raw.len(),
        });
    }
    let bytes = raw.as_bytes();
    let year = years.expand(two_digits(bytes, 0));
    let month = two_digits(bytes, 2);
    let day = two_digits(bytes, 4);

    if !(1..=12).contains(&month) {
        return Err(InterpretError::InvalidMonth(month));
    }
    let invalid_day = || InterpretError::InvalidDay { year, month, day };

    if day == 0 {
        let date = last_day_of_month(year, month).ok_or_else(invalid_day)?;
        return Ok(Gs1Date {
            date,
            day_unknown: true,
        });
    }
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid_day)?;
    Ok(Gs1Date {
        date,
        day_unknown: false,
    })
}

/// Interprets `YYMMDDHH`, `YYMMDDHHMM` or `YYMMDDHHMMSS`.
///
/// Omitted minutes and seconds are zero. Day `00` is not allowed here.
pub fn date_time(raw: &str, years: YearExpansion) -> Result<NaiveDateTime, InterpretError> {
    require_digits(raw)?;
    if !matches!(raw.len(), 8 | 10 | 12) {
        return Err(InterpretError::DigitCount {
            expected: "8, 10, or 12".to_string(),
            length: raw.len(),
        });
    }
    let bytes = raw.as_bytes();
    let day = date(&raw[..6], years)?;
    if day.day_unknown {
        return Err(InterpretError::InvalidDay {
            year: day.date.year(),
            month: day.date.month(),
            day: 0,
        });
    }

    let hour = two_digits(bytes, 6);
    let minute = if raw.len() >= 10 { two_digits(bytes, 8) } else { 0 };
    let second = if raw.len() == 12 { two_digits(bytes, 10) } else { 0 };
    day.date
        .and_hms_opt(hour, minute, second)
        .ok_or(InterpretError::InvalidTime {
            hour,
            minute,
            second,
        })
}

// =============================================================================
// Numbers and Amounts
// =============================================================================

/// Interprets digits with `places` implied decimals.
///
/// Also used for RCN variable measures, with the scale taken from the
/// regional rule.
pub fn decimal(raw: &str, places: u8) -> Result<ScaledDecimal, InterpretError> {
    ScaledDecimal::from_digits(raw, places)
}

/// Interprets an amount without currency (AI 390n, 392n).
pub fn amount(raw: &str, places: u8) -> Result<MonetaryAmount, InterpretError> {
    Ok(MonetaryAmount {
        currency: None,
        amount: decimal(raw, places)?,
    })
}

/// Interprets a three-digit ISO 4217 code followed by an amount
/// (AI 391n, 393n).
///
/// ```rust
/// use tillscan_core::gs1::interpret::amount_with_currency;
///
/// let amount = amount_with_currency("7521250", 2).unwrap();
/// assert_eq!(amount.to_string(), "SEK 12.50");
/// ```
pub fn amount_with_currency(raw: &str, places: u8) -> Result<MonetaryAmount, InterpretError> {
    require_digits(raw)?;
    if raw.len() < 4 {
        return Err(InterpretError::DigitCount {
            expected: "at least 4".to_string(),
            length: raw.len(),
        });
    }
    let (numeric, digits) = raw.split_at(3);
    let currency = CurrencyCode::from_numeric(numeric)
        .ok_or_else(|| InterpretError::UnknownCurrency(numeric.to_string()))?;
    Ok(MonetaryAmount {
        currency: Some(currency),
        amount: decimal(digits, places)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PIVOT_50: YearExpansion = YearExpansion::Fixed { pivot: 50 };

    #[test]
    fn test_date() {
        let expiry = date("100425", PIVOT_50).unwrap();
        assert_eq!(expiry.date, NaiveDate::from_ymd_opt(2010, 4, 25).unwrap());
        assert!(!expiry.day_unknown);

        assert_eq!(date("991231", PIVOT_50).unwrap().date.year(), 1999);
    }

    #[test]
    fn test_date_with_unknown_day() {
        let expiry = date("230200", PIVOT_50).unwrap();
        assert_eq!(expiry.date, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        assert!(expiry.day_unknown);

        let expiry = date("231200", PIVOT_50).unwrap();
        assert_eq!(expiry.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(date("101325", PIVOT_50), Err(InterpretError::InvalidMonth(13)));
        assert_eq!(date("100025", PIVOT_50), Err(InterpretError::InvalidMonth(0)));
        assert_eq!(
            date("230230", PIVOT_50),
            Err(InterpretError::InvalidDay {
                year: 2023,
                month: 2,
                day: 30
            })
        );
        assert!(matches!(
            date("10042", PIVOT_50),
            Err(InterpretError::DigitCount { length: 5, .. })
        ));
    }

    #[test]
    fn test_sliding_window() {
        let window = YearExpansion::SlidingWindow {
            reference_year: 2025,
        };
        assert_eq!(window.expand(75), 2075);
        assert_eq!(window.expand(76), 1976);
        assert_eq!(window.expand(0), 2000);

        let window = YearExpansion::SlidingWindow {
            reference_year: 2090,
        };
        assert_eq!(window.expand(30), 2130);
        assert_eq!(window.expand(41), 2041);
    }

    #[test]
    fn test_date_time() {
        let stamp = date_time("2304251530", PIVOT_50).unwrap();
        assert_eq!(stamp.to_string(), "2023-04-25 15:30:00");

        let stamp = date_time("23042515", PIVOT_50).unwrap();
        assert_eq!(stamp.to_string(), "2023-04-25 15:00:00");

        assert!(matches!(
            date_time("230425256000", PIVOT_50),
            Err(InterpretError::InvalidTime { hour: 25, .. })
        ));
        assert!(date_time("2304001530", PIVOT_50).is_err());
        assert!(date_time("230425153", PIVOT_50).is_err());
    }

    #[test]
    fn test_non_digit_input_is_rejected() {
        assert_eq!(
            date_time("23042é5", PIVOT_50),
            Err(InterpretError::InvalidCharacter {
                character: 'é',
                position: 5
            })
        );
        assert_eq!(
            date("10a425", PIVOT_50),
            Err(InterpretError::InvalidCharacter {
                character: 'a',
                position: 2
            })
        );
        assert!(matches!(
            amount_with_currency("97€5", 0),
            Err(InterpretError::InvalidCharacter { character: '€', .. })
        ));
        assert!(matches!(
            decimal("", 0),
            Err(InterpretError::DigitCount { length: 0, .. })
        ));
    }

    #[test]
    fn test_decimal_and_amounts() {
        assert_eq!(decimal("001086", 3).unwrap().to_string(), "1.086");
        assert_eq!(amount("1250", 2).unwrap().to_string(), "12.50");
        assert_eq!(
            amount_with_currency("978999", 1).unwrap().to_string(),
            "EUR 99.9"
        );
        assert_eq!(
            amount_with_currency("0001250", 2),
            Err(InterpretError::UnknownCurrency("000".to_string()))
        );
        assert!(amount_with_currency("978", 0).is_err());
    }
}
