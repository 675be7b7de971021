//! # GTIN Normalizer
//!
//! Parses GTIN-8/12/13/14 and converts between their representations.
//!
//! ## Canonical Form
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every GTIN is stored left-padded to 14 digits:                         │
//! │                                                                         │
//! │  GTIN-8     96385074  →  000000 96385074                                │
//! │  GTIN-12  036000291452  →  00 036000291452   (UPC-A)                    │
//! │  GTIN-13  4006381333931  →  0 4006381333931                             │
//! │  GTIN-14  09501101530003  →  09501101530003                             │
//! │                                                                         │
//! │  The declared format is kept for display, so the value prints back     │
//! │  exactly as scanned.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use ts_rs::TS;

use crate::checksum::ensure_gs1_check_digit;
use crate::config::ParseConfig;
use crate::error::{ParseError, ParseResult};
use crate::isbn::{self, BookNumber};
use crate::prefix::Gs1Prefix;
use crate::rcn::{self, Rcn, RcnRegion, RcnUsage, VariableMeasure};
use crate::validation::{require_digits, require_length};
use crate::GTIN_CANONICAL_LENGTH;

// =============================================================================
// GTIN Format
// =============================================================================

/// The digit count a GTIN was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GtinFormat {
    Gtin8,
    /// Also known as UPC-A.
    Gtin12,
    /// Also known as EAN-13.
    Gtin13,
    Gtin14,
}

impl GtinFormat {
    /// Number of digits, check digit included.
    pub const fn length(&self) -> usize {
        match self {
            GtinFormat::Gtin8 => 8,
            GtinFormat::Gtin12 => 12,
            GtinFormat::Gtin13 => 13,
            GtinFormat::Gtin14 => 14,
        }
    }

    /// Picks the format for a digit count.
    pub const fn from_length(length: usize) -> Option<Self> {
        match length {
            8 => Some(GtinFormat::Gtin8),
            12 => Some(GtinFormat::Gtin12),
            13 => Some(GtinFormat::Gtin13),
            14 => Some(GtinFormat::Gtin14),
            _ => None,
        }
    }
}

impl fmt::Display for GtinFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GTIN-{}", self.length())
    }
}

// =============================================================================
// GTIN Classification
// =============================================================================

/// How far a GTIN can be trusted outside the organisation that scanned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GtinClass {
    /// Globally unique trade item number.
    Standard,
    /// RCN carrying a weight.
    RcnWeight,
    /// RCN carrying a price.
    RcnPrice,
    /// RCN for use within one company.
    RcnCompanyInternal,
    /// RCN whose meaning is defined by a regional GS1 organisation, with no
    /// decoded measure (no region configured, or no rule for its prefix).
    RcnGeographical,
}

impl GtinClass {
    /// Only standard GTINs may be used for cross-organisation lookups.
    pub fn is_globally_unique(&self) -> bool {
        matches!(self, GtinClass::Standard)
    }
}

// =============================================================================
// GTIN
// =============================================================================

/// A validated Global Trade Item Number.
///
/// ## Invariants
/// - `canonical` is 14 ASCII digits; the declared format's digits are its
///   suffix and everything before them is `0`.
/// - The last digit is the GS1 check digit of the others.
///
/// Deserializing re-parses the digits, so a stored record is held to the
/// same invariants as a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "GtinRecord")]
pub struct Gtin {
    canonical: String,
    format: GtinFormat,
    prefix: Option<Gs1Prefix>,
    rcn: Option<Rcn>,
}

impl Gtin {
    /// Parses a GTIN with the default configuration (no RCN region).
    ///
    /// ## Example
    /// ```rust
    /// use tillscan_core::gtin::{Gtin, GtinFormat};
    ///
    /// let gtin = Gtin::parse("036000291452").unwrap();
    /// assert_eq!(gtin.format(), GtinFormat::Gtin12);
    /// assert_eq!(gtin.as_gtin_13(), Some("0036000291452"));
    /// ```
    pub fn parse(raw: &str) -> ParseResult<Self> {
        Self::parse_with(raw, &ParseConfig::default())
    }

    /// Parses a GTIN, decoding RCN variable measures per `config`.
    ///
    /// ## Steps
    /// ```text
    /// " 4006381333931 "
    ///      │  strip whitespace
    ///      ▼
    /// digits only? ──no──► InvalidCharacter
    ///      │
    ///      ▼
    /// 8/12/13/14 digits? ──no──► InvalidLength
    ///      │
    ///      ▼
    /// check digit ok? ──no──► ChecksumMismatch
    ///      │
    ///      ▼
    /// pad to 14, look up prefix, classify RCN
    /// ```
    pub fn parse_with(raw: &str, config: &ParseConfig) -> ParseResult<Self> {
        let value: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        require_digits(&value)?;
        let format =
            GtinFormat::from_length(value.len()).ok_or_else(|| ParseError::InvalidLength {
                value: value.clone(),
                length: value.len(),
                expected: "8, 12, 13, or 14 digits".to_string(),
            })?;
        ensure_gs1_check_digit(&value)?;

        let mut gtin = Gtin {
            canonical: format!("{:0>width$}", value, width = GTIN_CANONICAL_LENGTH),
            format,
            prefix: None,
            rcn: None,
        };
        gtin.prefix = match format {
            GtinFormat::Gtin8 => Gs1Prefix::lookup_gtin8(gtin.value()),
            _ => Gs1Prefix::lookup(&gtin.canonical[1..]),
        };
        gtin.rcn = rcn::classify(&gtin, config)?;

        debug!(gtin = %gtin, format = %format, rcn = gtin.rcn.is_some(), "Parsed GTIN");
        Ok(gtin)
    }

    /// The declared format.
    #[inline]
    pub fn format(&self) -> GtinFormat {
        self.format
    }

    /// The digits in the declared format.
    pub fn value(&self) -> &str {
        &self.canonical[GTIN_CANONICAL_LENGTH - self.format.length()..]
    }

    /// The 14-digit canonical form.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The check digit.
    pub fn check_digit(&self) -> char {
        char::from(self.canonical.as_bytes()[GTIN_CANONICAL_LENGTH - 1])
    }

    /// GTIN-14 indicator digit (packaging level). `None` for other formats.
    pub fn packaging_level(&self) -> Option<u8> {
        match self.format {
            GtinFormat::Gtin14 => Some(self.canonical.as_bytes()[0] - b'0'),
            _ => None,
        }
    }

    /// The GS1 prefix, when the range is allocated.
    pub fn prefix(&self) -> Option<&Gs1Prefix> {
        self.prefix.as_ref()
    }

    /// Restricted circulation details, when this is an RCN.
    pub fn rcn(&self) -> Option<&Rcn> {
        self.rcn.as_ref()
    }

    /// Classifies the GTIN as standard or one of the RCN kinds.
    pub fn classification(&self) -> GtinClass {
        match &self.rcn {
            None => GtinClass::Standard,
            Some(rcn) => match (rcn.measure(), rcn.usage()) {
                (Some(VariableMeasure::Weight { .. }), _) => GtinClass::RcnWeight,
                (Some(VariableMeasure::Price(_)), _) => GtinClass::RcnPrice,
                (None, RcnUsage::Company) => GtinClass::RcnCompanyInternal,
                (None, RcnUsage::Geographical) => GtinClass::RcnGeographical,
            },
        }
    }

    /// GTIN-8 form, if the leading six canonical digits are zero.
    pub fn as_gtin_8(&self) -> Option<&str> {
        self.narrow(8)
    }

    /// GTIN-12 (UPC-A) form, if the leading two canonical digits are zero.
    pub fn as_gtin_12(&self) -> Option<&str> {
        self.narrow(12)
    }

    /// GTIN-13 form, if the packaging level digit is zero.
    pub fn as_gtin_13(&self) -> Option<&str> {
        self.narrow(13)
    }

    /// GTIN-14 form (always available).
    pub fn as_gtin_14(&self) -> &str {
        &self.canonical
    }

    fn narrow(&self, length: usize) -> Option<&str> {
        let (padding, digits) = self.canonical.split_at(GTIN_CANONICAL_LENGTH - length);
        padding.bytes().all(|b| b == b'0').then_some(digits)
    }

    /// ISBN-13 for Bookland (978/979) GTINs.
    pub fn to_isbn13(&self) -> Option<BookNumber> {
        isbn::to_isbn13(self)
    }

    /// ISBN-10 for 978 GTINs.
    pub fn to_isbn10(&self) -> Option<BookNumber> {
        isbn::to_isbn10(self)
    }

    /// ISSN for 977 GTINs.
    pub fn to_issn(&self) -> Option<BookNumber> {
        isbn::to_issn(self)
    }
}

impl fmt::Display for Gtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

// =============================================================================
// Deserialization
// =============================================================================

/// The stored fields a [`Gtin`] is rebuilt from. Prefix and RCN details are
/// derived again; only the region that decoded the RCN is taken over.
#[derive(Deserialize)]
struct GtinRecord {
    canonical: String,
    format: GtinFormat,
    #[serde(default)]
    rcn: Option<RcnRecord>,
}

#[derive(Deserialize)]
struct RcnRecord {
    #[serde(default)]
    region: Option<RcnRegion>,
}

impl TryFrom<GtinRecord> for Gtin {
    type Error = ParseError;

    fn try_from(record: GtinRecord) -> Result<Self, Self::Error> {
        let canonical = record.canonical;
        require_digits(&canonical)?;
        require_length(&canonical, &[GTIN_CANONICAL_LENGTH], "14 digits")?;

        let (padding, digits) = canonical.split_at(GTIN_CANONICAL_LENGTH - record.format.length());
        if let Some(position) = padding.bytes().position(|b| b != b'0') {
            return Err(ParseError::InvalidCharacter {
                character: char::from(padding.as_bytes()[position]),
                value: canonical.clone(),
                position,
            });
        }

        let config = ParseConfig {
            rcn_region: record.rcn.and_then(|rcn| rcn.region),
            rcn_verify_variable_measure: false,
            ..ParseConfig::default()
        };
        Gtin::parse_with(digits, &config)
    }
}

/// Normalizes a scanned GTIN. Alias for [`Gtin::parse`].
pub fn normalize(raw: &str) -> ParseResult<Gtin> {
    Gtin::parse(raw)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_gtin_13() {
        let gtin = Gtin::parse("4006381333931").unwrap();
        assert_eq!(gtin.format(), GtinFormat::Gtin13);
        assert_eq!(gtin.value(), "4006381333931");
        assert_eq!(gtin.canonical(), "04006381333931");
        assert_eq!(gtin.check_digit(), '1');
        assert_eq!(gtin.prefix().unwrap().usage, "GS1 Germany");
        assert_eq!(gtin.classification(), GtinClass::Standard);
        assert!(gtin.rcn().is_none());
    }

    #[test]
    fn test_checksum_mismatch_reports_digits() {
        let err = Gtin::parse("4006381333932").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
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
    fn test_upc_a_normalizes_to_gtin_13_with_leading_zero() {
        let gtin = normalize("036000291452").unwrap();
        assert_eq!(gtin.format(), GtinFormat::Gtin12);
        assert_eq!(gtin.as_gtin_13(), Some("0036000291452"));
        assert_eq!(gtin.as_gtin_12(), Some("036000291452"));
        assert_eq!(gtin.as_gtin_8(), None);
    }

    #[test]
    fn test_gtin_8() {
        let gtin = Gtin::parse("96385074").unwrap();
        assert_eq!(gtin.format(), GtinFormat::Gtin8);
        assert_eq!(gtin.as_gtin_14(), "00000096385074");
        assert_eq!(gtin.as_gtin_8(), Some("96385074"));
        assert_eq!(gtin.prefix().unwrap().usage, "Global Office - GTIN-8 allocations");
    }

    #[test]
    fn test_gtin_14_packaging_level() {
        let gtin = Gtin::parse("98710123456787").unwrap();
        assert_eq!(gtin.format(), GtinFormat::Gtin14);
        assert_eq!(gtin.packaging_level(), Some(9));
        assert_eq!(gtin.as_gtin_13(), None);

        let gtin = Gtin::parse("09501101530003").unwrap();
        assert_eq!(gtin.packaging_level(), Some(0));
        assert_eq!(gtin.as_gtin_13(), Some("9501101530003"));
        assert_eq!(gtin.prefix().unwrap().value, "950");
    }

    #[test]
    fn test_whitespace_is_stripped() {
        let gtin = Gtin::parse(" 4006381333931\n").unwrap();
        assert_eq!(gtin.value(), "4006381333931");
    }

    #[test]
    fn test_invalid_length() {
        let err = Gtin::parse("12345").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLength);
        assert!(err.to_string().contains("expected 8, 12, 13, or 14 digits"));
    }

    #[test]
    fn test_invalid_character() {
        let err = Gtin::parse("40063813339a1").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidCharacter {
                value: "40063813339a1".to_string(),
                character: 'a',
                position: 11,
            }
        );
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["96385074", "036000291452", "4006381333931", "09501101530003"] {
            let gtin = normalize(raw).unwrap();
            assert_eq!(normalize(&gtin.to_string()).unwrap(), gtin);
        }
    }

    #[test]
    fn test_gtin_14_with_rcn_prefix_is_not_an_rcn() {
        let gtin = Gtin::parse("12991111111110").unwrap();
        assert_eq!(gtin.format(), GtinFormat::Gtin14);
        assert!(gtin.rcn().is_none());
        assert_eq!(gtin.classification(), GtinClass::Standard);
    }

    #[test]
    fn test_deserialize_rebuilds_gtin() {
        for raw in ["96385074", "036000291452", "4006381333931", "09501101530003"] {
            let gtin = Gtin::parse(raw).unwrap();
            let json = serde_json::to_string(&gtin).unwrap();
            assert_eq!(serde_json::from_str::<Gtin>(&json).unwrap(), gtin);
        }

        let config = ParseConfig::default().with_rcn_region(RcnRegion::Sweden);
        let gtin = Gtin::parse_with("2012345012509", &config).unwrap();
        let json = serde_json::to_string(&gtin).unwrap();
        let restored: Gtin = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, gtin);
        assert_eq!(restored.classification(), GtinClass::RcnPrice);
    }

    #[test]
    fn test_deserialize_rejects_malformed_records() {
        let short = r#"{"canonical":"1","format":"gtin13","prefix":null,"rcn":null}"#;
        assert!(serde_json::from_str::<Gtin>(short).is_err());

        let bad_check = r#"{"canonical":"04006381333932","format":"gtin13"}"#;
        assert!(serde_json::from_str::<Gtin>(bad_check).is_err());

        let padded = r#"{"canonical":"14006381333931","format":"gtin13"}"#;
        assert!(serde_json::from_str::<Gtin>(padded).is_err());

        let letters = r#"{"canonical":"0400638133393a","format":"gtin13"}"#;
        assert!(serde_json::from_str::<Gtin>(letters).is_err());
    }
}
