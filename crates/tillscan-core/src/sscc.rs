//! # Serial Shipping Container Codes
//!
//! An SSCC identifies one logistic unit (a pallet, a parcel) for its whole
//! life in the supply chain.
//!
//! ```text
//!   3 7044610 873466714 7
//!   │ └──┬──┘ └───┬───┘ └ check digit
//!   │    │        └ serial reference
//!   │    └ GS1 company prefix (variable length)
//!   └ extension digit
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use ts_rs::TS;

use crate::checksum::ensure_gs1_check_digit;
use crate::error::{ParseError, ParseResult};
use crate::prefix::Gs1Prefix;
use crate::validation::{require_digits, require_length};

/// Digits in an SSCC, check digit included.
pub const SSCC_LENGTH: usize = 18;

/// A validated SSCC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "SsccRecord")]
pub struct Sscc {
    value: String,
    prefix: Option<Gs1Prefix>,
}

impl Sscc {
    /// Parses an 18-digit SSCC and verifies its check digit.
    ///
    /// ```rust
    /// use tillscan_core::sscc::Sscc;
    ///
    /// let sscc = Sscc::parse("376104250021234569").unwrap();
    /// assert_eq!(sscc.extension_digit(), 3);
    /// assert_eq!(sscc.prefix().unwrap().usage, "GS1 Switzerland");
    /// ```
    pub fn parse(raw: &str) -> ParseResult<Self> {
        let value = raw.trim();
        require_digits(value)?;
        require_length(value, &[SSCC_LENGTH], "18 digits")?;
        ensure_gs1_check_digit(value)?;

        debug!(sscc = %value, "Parsed SSCC");
        Ok(Sscc {
            value: value.to_string(),
            prefix: Gs1Prefix::lookup(&value[1..]),
        })
    }

    /// All 18 digits.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Extension digit, chosen freely by the company to increase capacity.
    pub fn extension_digit(&self) -> u8 {
        self.value.as_bytes()[0] - b'0'
    }

    pub fn prefix(&self) -> Option<&Gs1Prefix> {
        self.prefix.as_ref()
    }

    pub fn check_digit(&self) -> char {
        char::from(self.value.as_bytes()[SSCC_LENGTH - 1])
    }

    /// Human readable form with the parts separated by spaces.
    ///
    /// The company prefix length is not encoded in the SSCC itself; pass it
    /// when known (7-11 digits) to split company prefix and serial.
    pub fn as_hri(&self, company_prefix_len: Option<usize>) -> String {
        let (extension, rest) = self.value.split_at(1);
        let (body, check) = rest.split_at(rest.len() - 1);
        match company_prefix_len {
            Some(len) if (7..=11).contains(&len) => {
                let (company, serial) = body.split_at(len);
                format!("{} {} {} {}", extension, company, serial, check)
            }
            _ => format!("{} {} {}", extension, body, check),
        }
    }
}

impl fmt::Display for Sscc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Deserialize)]
struct SsccRecord {
    value: String,
}

impl TryFrom<SsccRecord> for Sscc {
    type Error = ParseError;

    fn try_from(record: SsccRecord) -> Result<Self, Self::Error> {
        Sscc::parse(&record.value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse() {
        let sscc = Sscc::parse("370446108734667147").unwrap();
        assert_eq!(sscc.value(), "370446108734667147");
        assert_eq!(sscc.extension_digit(), 3);
        assert_eq!(sscc.check_digit(), '7');
        assert_eq!(sscc.prefix().unwrap().value, "704");
        assert_eq!(sscc.prefix().unwrap().usage, "GS1 Norway");
    }

    #[test]
    fn test_hri() {
        let sscc = Sscc::parse("370446108734667147").unwrap();
        assert_eq!(sscc.as_hri(Some(7)), "3 7044610 873466714 7");
        assert_eq!(sscc.as_hri(None), "3 7044610873466714 7");
        assert_eq!(sscc.as_hri(Some(3)), "3 7044610873466714 7");
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            Sscc::parse("37044610873466714").unwrap_err().kind(),
            ErrorKind::InvalidLength
        );
        assert!(matches!(
            Sscc::parse("370446108734667140"),
            Err(ParseError::ChecksumMismatch { expected: '7', found: '0', .. })
        ));
    }

    #[test]
    fn test_deserialize_goes_through_parse() {
        let sscc = Sscc::parse("370446108734667147").unwrap();
        let json = serde_json::to_string(&sscc).unwrap();
        assert_eq!(serde_json::from_str::<Sscc>(&json).unwrap(), sscc);

        assert!(serde_json::from_str::<Sscc>(r#"{"value":"3","prefix":null}"#).is_err());
        assert!(serde_json::from_str::<Sscc>(r#"{"value":"370446108734667148"}"#).is_err());
    }
}
