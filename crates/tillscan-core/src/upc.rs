//! # UPC-A and UPC-E
//!
//! UPC-A is a GTIN-12. UPC-E is a zero-suppressed UPC-A for small
//! packages: six payload digits, expanded by the last one.
//!
//! ## Zero Suppression
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPC-E payload abcdef          UPC-A body (after number system)         │
//! │  ───────────────────           ────────────────────────────────         │
//! │  f = 0, 1, 2                   a b f 0 0 | 0 0 c d e                    │
//! │  f = 3                         a b c 0 0 | 0 0 0 d e                    │
//! │  f = 4                         a b c d 0 | 0 0 0 0 e                    │
//! │  f = 5 .. 9                    a b c d e | 0 0 0 0 f                    │
//! │                                manufacturer  product                    │
//! │                                                                         │
//! │  0 425261 4  ──►  0 42100 00526 4                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! UPC-E only exists for number systems 0 and 1. The check digit is always
//! the one of the expanded UPC-A.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use ts_rs::TS;

use crate::checksum::{ensure_gs1_check_digit, gs1_check_digit_unchecked};
use crate::error::{ParseError, ParseResult};
use crate::gtin::Gtin;
use crate::validation::{require_digits, require_length};

/// Which UPC variant was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UpcFormat {
    UpcA,
    UpcE,
}

/// A validated UPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "UpcRecord")]
pub struct Upc {
    format: UpcFormat,
    /// Expanded 12-digit form.
    upc_a: String,
    /// 8-digit form (number system, payload, check) when scanned as UPC-E.
    upc_e: Option<String>,
}

impl Upc {
    /// Parses a UPC.
    ///
    /// Accepts 12 digits (UPC-A), 8 digits (UPC-E with number system and
    /// check digit), 7 digits (UPC-E without check digit) or 6 digits
    /// (UPC-E payload only, number system 0).
    ///
    /// ```rust
    /// use tillscan_core::upc::{Upc, UpcFormat};
    ///
    /// let upc = Upc::parse("04252614").unwrap();
    /// assert_eq!(upc.format(), UpcFormat::UpcE);
    /// assert_eq!(upc.as_upc_a(), "042100005264");
    /// ```
    pub fn parse(raw: &str) -> ParseResult<Self> {
        let value = raw.trim();
        require_digits(value)?;

        let upc = match value.len() {
            12 => {
                ensure_gs1_check_digit(value)?;
                Upc {
                    format: UpcFormat::UpcA,
                    upc_a: value.to_string(),
                    upc_e: None,
                }
            }
            6 => Self::from_upc_e(value, "0", value, None)?,
            7 => Self::from_upc_e(value, &value[..1], &value[1..], None)?,
            8 => {
                let found = char::from(value.as_bytes()[7]);
                Self::from_upc_e(value, &value[..1], &value[1..7], Some(found))?
            }
            length => {
                return Err(ParseError::InvalidLength {
                    value: value.to_string(),
                    length,
                    expected: "6, 7, 8, or 12 digits".to_string(),
                })
            }
        };

        debug!(upc = %upc, format = ?upc.format, "Parsed UPC");
        Ok(upc)
    }

    fn from_upc_e(
        value: &str,
        number_system: &str,
        payload: &str,
        found: Option<char>,
    ) -> ParseResult<Self> {
        if !matches!(number_system, "0" | "1") {
            return Err(ParseError::InvalidCharacter {
                value: value.to_string(),
                character: number_system.chars().next().unwrap_or('?'),
                position: 0,
            });
        }

        let mut upc_a = format!("{}{}", number_system, expand(payload));
        let expected = gs1_check_digit_unchecked(upc_a.as_bytes());
        if let Some(found) = found {
            if found != expected {
                return Err(ParseError::ChecksumMismatch {
                    value: value.to_string(),
                    expected,
                    found,
                });
            }
        }
        upc_a.push(expected);

        Ok(Upc {
            format: UpcFormat::UpcE,
            upc_e: Some(format!("{}{}{}", number_system, payload, expected)),
            upc_a,
        })
    }

    pub fn format(&self) -> UpcFormat {
        self.format
    }

    /// The digits in the scanned format (8 for UPC-E, 12 for UPC-A).
    pub fn value(&self) -> &str {
        self.upc_e.as_deref().unwrap_or(&self.upc_a)
    }

    /// Number system digit (first UPC-A digit).
    pub fn number_system(&self) -> u8 {
        self.upc_a.as_bytes()[0] - b'0'
    }

    pub fn check_digit(&self) -> char {
        char::from(self.upc_a.as_bytes()[11])
    }

    /// The 12-digit UPC-A form.
    pub fn as_upc_a(&self) -> &str {
        &self.upc_a
    }

    /// The 8-digit UPC-E form, if the UPC-A can be zero-suppressed.
    pub fn as_upc_e(&self) -> Option<String> {
        if let Some(upc_e) = &self.upc_e {
            return Some(upc_e.clone());
        }
        let (number_system, rest) = self.upc_a.split_at(1);
        if !matches!(number_system, "0" | "1") {
            return None;
        }
        let payload = suppress(&rest[..5], &rest[5..10])?;
        Some(format!("{}{}{}", number_system, payload, self.check_digit()))
    }

    /// Converts to a GTIN-12.
    pub fn as_gtin(&self) -> ParseResult<Gtin> {
        Gtin::parse(&self.upc_a)
    }
}

impl fmt::Display for Upc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Stored form of a [`Upc`]. The scanned digits are parsed again and the
/// expanded UPC-A is derived from them.
#[derive(Deserialize)]
struct UpcRecord {
    format: UpcFormat,
    upc_a: String,
    #[serde(default)]
    upc_e: Option<String>,
}

impl TryFrom<UpcRecord> for Upc {
    type Error = ParseError;

    fn try_from(record: UpcRecord) -> Result<Self, Self::Error> {
        let (scanned, length, expected) = match record.format {
            UpcFormat::UpcA => (record.upc_a, 12, "12 digits"),
            UpcFormat::UpcE => (record.upc_e.unwrap_or_default(), 8, "8 digits"),
        };
        require_length(&scanned, &[length], expected)?;
        Upc::parse(&scanned)
    }
}

/// Expands a six-digit UPC-E payload to the ten UPC-A body digits.
fn expand(payload: &str) -> String {
    let p = payload;
    match &p[5..] {
        "0" | "1" | "2" => format!("{}{}0000{}", &p[..2], &p[5..], &p[2..5]),
        "3" => format!("{}00000{}", &p[..3], &p[3..5]),
        "4" => format!("{}00000{}", &p[..4], &p[4..5]),
        _ => format!("{}0000{}", &p[..5], &p[5..]),
    }
}

/// Suppresses manufacturer and product digits to a UPC-E payload.
fn suppress(manufacturer: &str, product: &str) -> Option<String> {
    let m = manufacturer.as_bytes();
    let (m1_m2, m3) = (&manufacturer[..2], m[2]);

    if matches!(m3, b'0'..=b'2') && &manufacturer[3..] == "00" && product.starts_with("00") {
        return Some(format!("{}{}{}", m1_m2, &product[2..], char::from(m3)));
    }
    if &manufacturer[3..] == "00" && product.starts_with("000") {
        return Some(format!("{}{}3", &manufacturer[..3], &product[3..]));
    }
    if m[4] == b'0' && product.starts_with("0000") {
        return Some(format!("{}{}4", &manufacturer[..4], &product[4..]));
    }
    if product.starts_with("0000") && product.as_bytes()[4] >= b'5' {
        return Some(format!("{}{}", manufacturer, &product[4..]));
    }
    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gtin::GtinFormat;

    #[test]
    fn test_expand_each_suppression_rule() {
        assert_eq!(Upc::parse("04252614").unwrap().as_upc_a(), "042100005264");
        assert_eq!(Upc::parse("01234531").unwrap().as_upc_a(), "012300000451");
        assert_eq!(Upc::parse("00123046").unwrap().as_upc_a(), "001230000006");
        assert_eq!(Upc::parse("01234572").unwrap().as_upc_a(), "012345000072");
        assert_eq!(Upc::parse("12345656").unwrap().as_upc_a(), "123456000056");
    }

    #[test]
    fn test_short_forms_compute_check_digit() {
        let upc = Upc::parse("425261").unwrap();
        assert_eq!(upc.value(), "04252614");
        assert_eq!(upc.number_system(), 0);

        let upc = Upc::parse("1234565").unwrap();
        assert_eq!(upc.value(), "12345656");
        assert_eq!(upc.check_digit(), '6');
    }

    #[test]
    fn test_suppress_round_trip() {
        for upc_e in ["04252614", "01234531", "06543217", "00123046", "01234572", "12345656"] {
            let expanded = Upc::parse(upc_e).unwrap();
            let upc_a = Upc::parse(expanded.as_upc_a()).unwrap();
            assert_eq!(upc_a.format(), UpcFormat::UpcA);
            assert_eq!(upc_a.as_upc_e().as_deref(), Some(upc_e));
        }
    }

    #[test]
    fn test_upc_a_that_cannot_be_suppressed() {
        let upc = Upc::parse("036000291452").unwrap();
        assert_eq!(upc.as_upc_e(), None);
        assert_eq!(upc.value(), "036000291452");
    }

    #[test]
    fn test_as_gtin() {
        let gtin = Upc::parse("04252614").unwrap().as_gtin().unwrap();
        assert_eq!(gtin.format(), GtinFormat::Gtin12);
        assert_eq!(gtin.as_gtin_13(), Some("0042100005264"));
    }

    #[test]
    fn test_invalid_upc_e() {
        assert!(matches!(
            Upc::parse("24252614"),
            Err(ParseError::InvalidCharacter { position: 0, character: '2', .. })
        ));
        assert!(matches!(
            Upc::parse("04252615"),
            Err(ParseError::ChecksumMismatch { expected: '4', found: '5', .. })
        ));
        assert_eq!(Upc::parse("12345").unwrap_err().kind(), ErrorKind::InvalidLength);
    }

    #[test]
    fn test_deserialize_goes_through_parse() {
        for raw in ["036000291452", "04252614"] {
            let upc = Upc::parse(raw).unwrap();
            let json = serde_json::to_string(&upc).unwrap();
            assert_eq!(serde_json::from_str::<Upc>(&json).unwrap(), upc);
        }

        let short = r#"{"format":"upc_a","upc_a":"1","upc_e":null}"#;
        assert!(serde_json::from_str::<Upc>(short).is_err());

        let missing_upc_e = r#"{"format":"upc_e","upc_a":"042100005264"}"#;
        assert!(serde_json::from_str::<Upc>(missing_upc_e).is_err());

        let bad_check = r#"{"format":"upc_a","upc_a":"036000291453"}"#;
        assert!(serde_json::from_str::<Upc>(bad_check).is_err());
    }
}
