//! # Validation Module
//!
//! Character-set and length checks shared by every parser.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Scanner                                                      │
//! │  └── Symbology decode (not our concern)                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Digits only? GS1 CSET 82 only?                                    │
//! │  └── Length one of the allowed values?                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Format parsers                                               │
//! │  ├── Check digits                                                      │
//! │  └── Field semantics (dates, decimals)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ParseError, ParseResult};

/// Character sets used by GS1 fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// ASCII digits `0`..`9`.
    Numeric,
    /// GS1 AI encodable character set 82.
    Cset82,
}

impl Charset {
    /// Checks a single character against this set.
    pub fn allows(&self, c: char) -> bool {
        match self {
            Charset::Numeric => c.is_ascii_digit(),
            Charset::Cset82 => is_cset82(c),
        }
    }
}

/// Returns true for characters of GS1 character set 82.
///
/// ```rust
/// use tillscan_core::validation::is_cset82;
///
/// assert!(is_cset82('A'));
/// assert!(is_cset82('/'));
/// assert!(!is_cset82(' '));
/// assert!(!is_cset82('\u{1d}'));
/// ```
pub fn is_cset82(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '"'
                | '%'
                | '&'
                | '\''
                | '('
                | ')'
                | '*'
                | '+'
                | ','
                | '-'
                | '.'
                | '/'
                | ':'
                | ';'
                | '<'
                | '='
                | '>'
                | '?'
                | '_'
        )
}

/// Finds the first character of `value` outside `charset`.
///
/// Returns the byte offset and the character.
pub fn first_invalid(value: &str, charset: Charset) -> Option<(usize, char)> {
    value.char_indices().find(|(_, c)| !charset.allows(*c))
}

/// Requires `value` to be all ASCII digits.
///
/// ## Example
/// ```rust
/// use tillscan_core::validation::require_digits;
///
/// assert!(require_digits("4006381333932").is_ok());
/// assert!(require_digits("40063813339X2").is_err());
/// ```
pub fn require_digits(value: &str) -> ParseResult<()> {
    match first_invalid(value, Charset::Numeric) {
        Some((position, character)) => Err(ParseError::InvalidCharacter {
            value: value.to_string(),
            character,
            position,
        }),
        None => Ok(()),
    }
}

/// Requires `value.len()` to be one of `allowed`.
///
/// Call after [`require_digits`], so byte length equals digit count.
pub fn require_length(value: &str, allowed: &[usize], expected: &str) -> ParseResult<()> {
    if allowed.contains(&value.len()) {
        Ok(())
    } else {
        Err(ParseError::InvalidLength {
            value: value.to_string(),
            length: value.len(),
            expected: expected.to_string(),
        })
    }
}

/// Removes surrounding whitespace and interior spaces/hyphens.
///
/// Scanners never emit these, but keyed-in codes (ISBNs in particular)
/// often carry them.
pub fn strip_separators(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect()
}

/// Converts an ASCII digit to its value. Callers validate first.
#[inline]
pub(crate) fn digit_value(c: u8) -> u32 {
    u32::from(c.wrapping_sub(b'0'))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cset82_membership() {
        for c in "!\"%&'()*+,-./:;<=>?_".chars() {
            assert!(is_cset82(c), "{c:?} should be allowed");
        }
        for c in "#$@[\\]^`{|}~ ".chars() {
            assert!(!is_cset82(c), "{c:?} should be rejected");
        }
        assert!(!is_cset82('é'));
    }

    #[test]
    fn test_require_digits_reports_position() {
        let err = require_digits("12a4").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidCharacter {
                value: "12a4".to_string(),
                character: 'a',
                position: 2,
            }
        );
    }

    #[test]
    fn test_require_length() {
        assert!(require_length("12345678", &[8, 12], "8 or 12 digits").is_ok());
        let err = require_length("123", &[8, 12], "8 or 12 digits").unwrap_err();
        assert!(err.to_string().contains("expected 8 or 12 digits"));
    }

    #[test]
    fn test_strip_separators() {
        assert_eq!(strip_separators(" 0-306-40615-2 "), "0306406152");
    }

    #[test]
    fn test_first_invalid() {
        assert_eq!(first_invalid("ABC123", Charset::Cset82), None);
        assert_eq!(first_invalid("AB C", Charset::Cset82), Some((2, ' ')));
        assert_eq!(first_invalid("12x", Charset::Numeric), Some((2, 'x')));
    }
}
