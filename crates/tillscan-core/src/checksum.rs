//! # Check-Digit Engine
//!
//! Check digit algorithms for GS1 keys, ISBN-10/ISSN and RCN price fields.
//!
//! ## Algorithms
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GS1 modulo 10 (GTIN-8/12/13/14, SSCC-18)                               │
//! │    weights 3,1,3,1… starting at the rightmost data digit               │
//! │    check = (10 - sum % 10) % 10                                         │
//! │                                                                         │
//! │  Modulo 11 (ISBN-10, ISSN)                                              │
//! │    weights n+1 … 2 from the leftmost data digit                        │
//! │    check = (11 - sum % 11) % 11, 10 written as 'X'                      │
//! │                                                                         │
//! │  Price verifier (RCN variable measure, GS1 Gen Specs 7.9.3 / 7.9.4)     │
//! │    4 digits: factors 2-,2-,3,5-   check = units digit of 3 × sum        │
//! │    5 digits: factors 5+,2-,5-,5+,2-  check = 5-⁻¹((10 - sum%10) % 10)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two families are kept apart: modulo 11 maps remainder 10 to a
//! symbol, which the GS1 scheme never produces.

use crate::error::{ParseError, ParseResult};
use crate::validation::{digit_value, require_digits};

/// Shortest data part the GS1 engine accepts (GTIN-8 minus check digit).
pub const MIN_GS1_DATA_DIGITS: usize = 7;

/// Longest data part the GS1 engine accepts (SSCC-18 minus check digit).
pub const MAX_GS1_DATA_DIGITS: usize = 17;

// =============================================================================
// GS1 Modulo 10
// =============================================================================

/// Computes the GS1 check digit for `data` (all digits except the check).
///
/// ## Example
/// ```rust
/// use tillscan_core::checksum::gs1_check_digit;
///
/// assert_eq!(gs1_check_digit("400638133393").unwrap(), '1');
/// assert_eq!(gs1_check_digit("9638507").unwrap(), '4');
/// ```
pub fn gs1_check_digit(data: &str) -> ParseResult<char> {
    require_digits(data)?;
    if !(MIN_GS1_DATA_DIGITS..=MAX_GS1_DATA_DIGITS).contains(&data.len()) {
        return Err(ParseError::InvalidLength {
            value: data.to_string(),
            length: data.len(),
            expected: format!("{}..={} digits", MIN_GS1_DATA_DIGITS, MAX_GS1_DATA_DIGITS),
        });
    }
    Ok(gs1_check_digit_unchecked(data.as_bytes()))
}

/// Weighted sum over pre-validated ASCII digits.
pub(crate) fn gs1_check_digit_unchecked(data: &[u8]) -> char {
    let sum: u32 = data
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &c)| digit_value(c) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    digit_char((10 - sum % 10) % 10)
}

/// Verifies that the last digit of `full` is its GS1 check digit.
///
/// Returns `false` for malformed input rather than an error; use
/// [`ensure_gs1_check_digit`] for the expected-vs-found details.
pub fn verify(full: &str) -> bool {
    ensure_gs1_check_digit(full).is_ok()
}

/// Like [`verify`], but reports what was expected.
///
/// ## Example
/// ```rust
/// use tillscan_core::checksum::ensure_gs1_check_digit;
/// use tillscan_core::ParseError;
///
/// assert!(ensure_gs1_check_digit("4006381333931").is_ok());
/// assert_eq!(
///     ensure_gs1_check_digit("4006381333932"),
///     Err(ParseError::ChecksumMismatch {
///         value: "4006381333932".to_string(),
///         expected: '1',
///         found: '2',
///     })
/// );
/// ```
pub fn ensure_gs1_check_digit(full: &str) -> ParseResult<()> {
    let (data, found) = split_check(full)?;
    let expected = gs1_check_digit(data)?;
    if expected == found {
        Ok(())
    } else {
        Err(ParseError::ChecksumMismatch {
            value: full.to_string(),
            expected,
            found,
        })
    }
}

// =============================================================================
// Modulo 11
// =============================================================================

/// Computes the modulo 11 check character used by ISBN-10 and ISSN.
///
/// Weights run from `data.len() + 1` down to 2, so 9 data digits use the
/// ISBN-10 weights 10..2 and 7 data digits use the ISSN weights 8..2.
///
/// ```rust
/// use tillscan_core::checksum::mod11_check_char;
///
/// assert_eq!(mod11_check_char("030640615").unwrap(), '2');
/// assert_eq!(mod11_check_char("0317847").unwrap(), '1');
/// assert_eq!(mod11_check_char("080442957").unwrap(), 'X');
/// ```
pub fn mod11_check_char(data: &str) -> ParseResult<char> {
    require_digits(data)?;
    let top = data.len() as u32 + 1;
    let sum: u32 = data
        .bytes()
        .enumerate()
        .map(|(i, c)| digit_value(c) * (top - i as u32))
        .sum();
    Ok(match (11 - sum % 11) % 11 {
        10 => 'X',
        n => digit_char(n),
    })
}

/// Verifies a modulo 11 code whose last character is the check symbol.
///
/// A lowercase `x` is accepted as `X`.
pub fn ensure_mod11_check_char(full: &str) -> ParseResult<()> {
    let Some(found) = full.chars().last() else {
        return Err(ParseError::InvalidLength {
            value: String::new(),
            length: 0,
            expected: "at least 2 characters".to_string(),
        });
    };
    let data = &full[..full.len() - found.len_utf8()];
    let expected = mod11_check_char(data)?;
    if expected == found.to_ascii_uppercase() {
        Ok(())
    } else {
        Err(ParseError::ChecksumMismatch {
            value: full.to_string(),
            expected,
            found,
        })
    }
}

// =============================================================================
// Price Verifier Digits
// =============================================================================

/// Weighting factor 2-: units digit of 2×d, minus tens digit.
const WEIGHT_2_MINUS: [u32; 10] = [0, 2, 4, 6, 8, 9, 1, 3, 5, 7];
/// Weighting factor 3: units digit of 3×d.
const WEIGHT_3: [u32; 10] = [0, 3, 6, 9, 2, 5, 8, 1, 4, 7];
/// Weighting factor 5+: units digit of 5×d, plus tens digit.
const WEIGHT_5_PLUS: [u32; 10] = [0, 5, 1, 6, 2, 7, 3, 8, 4, 9];
/// Weighting factor 5-: units digit of 5×d, minus tens digit.
const WEIGHT_5_MINUS: [u32; 10] = [0, 5, 9, 4, 8, 3, 7, 2, 6, 1];

/// Computes the verifier digit for a 4- or 5-digit price/weight field.
///
/// ```rust
/// use tillscan_core::checksum::price_check_digit;
///
/// assert_eq!(price_check_digit("2875").unwrap(), '9');
/// assert_eq!(price_check_digit("14685").unwrap(), '6');
/// ```
pub fn price_check_digit(value: &str) -> ParseResult<char> {
    require_digits(value)?;
    let digits: Vec<usize> = value.bytes().map(|c| digit_value(c) as usize).collect();
    match digits.as_slice() {
        [a, b, c, d] => {
            let sum = WEIGHT_2_MINUS[*a] + WEIGHT_2_MINUS[*b] + WEIGHT_3[*c] + WEIGHT_5_MINUS[*d];
            Ok(digit_char((sum * 3) % 10))
        }
        [a, b, c, d, e] => {
            let sum = WEIGHT_5_PLUS[*a]
                + WEIGHT_2_MINUS[*b]
                + WEIGHT_5_MINUS[*c]
                + WEIGHT_5_PLUS[*d]
                + WEIGHT_2_MINUS[*e];
            let target = (10 - sum % 10) % 10;
            let check = WEIGHT_5_MINUS
                .iter()
                .position(|&w| w == target)
                .unwrap_or_default();
            Ok(digit_char(check as u32))
        }
        _ => Err(ParseError::InvalidLength {
            value: value.to_string(),
            length: value.len(),
            expected: "4 or 5 digits".to_string(),
        }),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn split_check(full: &str) -> ParseResult<(&str, char)> {
    require_digits(full)?;
    match full.len() {
        0 => Err(ParseError::InvalidLength {
            value: String::new(),
            length: 0,
            expected: format!("{}..={} digits", MIN_GS1_DATA_DIGITS + 1, MAX_GS1_DATA_DIGITS + 1),
        }),
        n => Ok((&full[..n - 1], char::from(full.as_bytes()[n - 1]))),
    }
}

#[inline]
fn digit_char(n: u32) -> char {
    char::from_digit(n, 10).unwrap_or('0')
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gs1_check_digit_across_lengths() {
        // GTIN-8, GTIN-12, GTIN-13, GTIN-14, SSCC-18
        assert_eq!(gs1_check_digit("9638507").unwrap(), '4');
        assert_eq!(gs1_check_digit("03600029145").unwrap(), '2');
        assert_eq!(gs1_check_digit("590123412345").unwrap(), '7');
        assert_eq!(gs1_check_digit("0950110153310").unwrap(), '3');
        assert_eq!(gs1_check_digit("37044610873466714").unwrap(), '7');
    }

    #[test]
    fn test_gs1_check_digit_rejects_bad_input() {
        assert!(matches!(
            gs1_check_digit("123456"),
            Err(ParseError::InvalidLength { .. })
        ));
        assert!(matches!(
            gs1_check_digit("123456789012345678"),
            Err(ParseError::InvalidLength { .. })
        ));
        assert!(matches!(
            gs1_check_digit("12345a7"),
            Err(ParseError::InvalidCharacter { position: 5, .. })
        ));
    }

    #[test]
    fn test_verify_and_mismatch() {
        assert!(verify("4006381333931"));
        assert!(!verify("4006381333932"));
        assert!(!verify("400638133393X"));

        let err = ensure_gs1_check_digit("4006381333932").unwrap_err();
        assert_eq!(
            err,
            ParseError::ChecksumMismatch {
                value: "4006381333932".to_string(),
                expected: '1',
                found: '2',
            }
        );
    }

    #[test]
    fn test_mod11() {
        assert_eq!(mod11_check_char("030640615").unwrap(), '2');
        assert_eq!(mod11_check_char("080442957").unwrap(), 'X');
        assert!(ensure_mod11_check_char("080442957X").is_ok());
        assert!(ensure_mod11_check_char("080442957x").is_ok());
        assert!(ensure_mod11_check_char("03178471").is_ok());

        let err = ensure_mod11_check_char("0306406153").unwrap_err();
        assert!(matches!(
            err,
            ParseError::ChecksumMismatch {
                expected: '2',
                found: '3',
                ..
            }
        ));
    }

    #[test]
    fn test_price_check_digit() {
        assert_eq!(price_check_digit("2875").unwrap(), '9');
        assert_eq!(price_check_digit("0000").unwrap(), '0');
        assert_eq!(price_check_digit("14685").unwrap(), '6');
        assert!(price_check_digit("123").is_err());
    }
}
