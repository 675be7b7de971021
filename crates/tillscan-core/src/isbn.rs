//! # ISBN and ISSN
//!
//! Books and serials are sold with GTIN-13s from the Bookland (978, 979)
//! and ISSN (977) prefixes. This module relabels those GTINs and converts
//! to and from the legacy 10-digit ISBN and 8-digit ISSN.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GTIN-13        978 030640615 7       977 0317847 00 1                  │
//! │                     └───┬───┘             └──┬──┘ │                     │
//! │                         │                    │    └ variant             │
//! │                         ▼                    ▼                          │
//! │  Legacy         030640615 2          0317-847 1                         │
//! │                 ISBN-10 (mod 11)     ISSN (mod 11)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Conversions that do not apply (ISBN-10 from a 979 GTIN, ISSN from a
//! non-977 GTIN) return `None`.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::checksum::{ensure_mod11_check_char, gs1_check_digit, mod11_check_char};
use crate::error::{ParseError, ParseResult};
use crate::gtin::Gtin;
use crate::validation::{require_digits, require_length, strip_separators};

const ISSN_PREFIX: &str = "977";
const ISBN_PREFIXES: [&str; 2] = ["978", "979"];
const ISBN10_PREFIX: &str = "978";

/// Book and serial numbering systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookFormat {
    Isbn10,
    Isbn13,
    Issn,
}

/// An ISBN or ISSN together with the GTIN it was derived from.
///
/// Deserializing derives `value` and `check_char` again from the GTIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "BookNumberRecord")]
pub struct BookNumber {
    pub gtin: Gtin,
    pub format: BookFormat,
    /// Digits without hyphens, check character included.
    pub value: String,
    pub check_char: char,
}

impl BookNumber {
    fn new(gtin: &Gtin, format: BookFormat, value: String) -> Option<Self> {
        let check_char = value.chars().last()?;
        Some(BookNumber {
            gtin: gtin.clone(),
            format,
            value,
            check_char,
        })
    }

    /// The ISBN-10 of the same book, if it has one.
    pub fn to_isbn10(&self) -> Option<BookNumber> {
        to_isbn10(&self.gtin)
    }

    /// The ISBN-13 of the same book.
    pub fn to_isbn13(&self) -> Option<BookNumber> {
        to_isbn13(&self.gtin)
    }
}

impl fmt::Display for BookNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            BookFormat::Issn => write!(f, "{}-{}", &self.value[..4], &self.value[4..]),
            BookFormat::Isbn10 | BookFormat::Isbn13 => f.write_str(&self.value),
        }
    }
}

#[derive(Deserialize)]
struct BookNumberRecord {
    gtin: Gtin,
    format: BookFormat,
}

impl TryFrom<BookNumberRecord> for BookNumber {
    type Error = String;

    fn try_from(record: BookNumberRecord) -> Result<Self, Self::Error> {
        let book = match record.format {
            BookFormat::Isbn10 => to_isbn10(&record.gtin),
            BookFormat::Isbn13 => to_isbn13(&record.gtin),
            BookFormat::Issn => to_issn(&record.gtin),
        };
        book.ok_or_else(|| format!("GTIN {} has no {:?} form", record.gtin, record.format))
    }
}

// =============================================================================
// GTIN -> Book Number
// =============================================================================

/// ISBN-13 of a Bookland GTIN (same digits, new label).
pub fn to_isbn13(gtin: &Gtin) -> Option<BookNumber> {
    let gtin13 = gtin.as_gtin_13()?;
    if !ISBN_PREFIXES.iter().any(|prefix| gtin13.starts_with(prefix)) {
        return None;
    }
    BookNumber::new(gtin, BookFormat::Isbn13, gtin13.to_string())
}

/// ISBN-10 of a 978 GTIN.
///
/// ```rust
/// use tillscan_core::gtin::Gtin;
/// use tillscan_core::isbn::to_isbn10;
///
/// let gtin = Gtin::parse("9780306406157").unwrap();
/// assert_eq!(to_isbn10(&gtin).unwrap().value, "0306406152");
/// ```
pub fn to_isbn10(gtin: &Gtin) -> Option<BookNumber> {
    let gtin13 = gtin.as_gtin_13()?;
    if !gtin13.starts_with(ISBN10_PREFIX) {
        return None;
    }
    let data = &gtin13[3..12];
    let check = mod11_check_char(data).ok()?;
    BookNumber::new(gtin, BookFormat::Isbn10, format!("{}{}", data, check))
}

/// ISSN of a 977 GTIN. The two variant digits are dropped.
pub fn to_issn(gtin: &Gtin) -> Option<BookNumber> {
    let gtin13 = gtin.as_gtin_13()?;
    if !gtin13.starts_with(ISSN_PREFIX) {
        return None;
    }
    let data = &gtin13[3..10];
    let check = mod11_check_char(data).ok()?;
    BookNumber::new(gtin, BookFormat::Issn, format!("{}{}", data, check))
}

// =============================================================================
// Book Number -> GTIN
// =============================================================================

/// Converts an ISBN-10 to its 978 GTIN-13.
///
/// Hyphens and spaces are ignored; a lowercase `x` check character is
/// accepted.
///
/// ```rust
/// use tillscan_core::isbn::isbn10_to_gtin;
///
/// let gtin = isbn10_to_gtin("0-8044-2957-X").unwrap();
/// assert_eq!(gtin.value(), "9780804429573");
/// ```
pub fn isbn10_to_gtin(raw: &str) -> ParseResult<Gtin> {
    let isbn = strip_separators(raw);
    require_length(&isbn, &[10], "10 characters")?;
    require_check_char(&isbn)?;
    ensure_mod11_check_char(&isbn)?;
    gtin_from_body(&format!("{}{}", ISBN10_PREFIX, &isbn[..9]))
}

/// Converts an ISSN to a 977 GTIN-13 with the given two-digit variant.
pub fn issn_to_gtin(raw: &str, variant: u8) -> ParseResult<Gtin> {
    let issn = strip_separators(raw);
    require_length(&issn, &[8], "8 characters")?;
    require_check_char(&issn)?;
    ensure_mod11_check_char(&issn)?;
    if variant > 99 {
        return Err(ParseError::InvalidLength {
            value: variant.to_string(),
            length: 3,
            expected: "a two-digit variant".to_string(),
        });
    }
    gtin_from_body(&format!("{}{}{:02}", ISSN_PREFIX, &issn[..7], variant))
}

/// Digits, with a final digit or `X`.
fn require_check_char(code: &str) -> ParseResult<()> {
    let check = code.chars().last().unwrap_or('?');
    let body = &code[..code.len() - check.len_utf8()];
    require_digits(body)?;
    if check.is_ascii_digit() || check == 'X' || check == 'x' {
        return Ok(());
    }
    Err(ParseError::InvalidCharacter {
        value: code.to_string(),
        character: check,
        position: body.len(),
    })
}

fn gtin_from_body(body: &str) -> ParseResult<Gtin> {
    let check = gs1_check_digit(body)?;
    Gtin::parse(&format!("{}{}", body, check))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_isbn13_and_isbn10() {
        let gtin = Gtin::parse("9780306406157").unwrap();
        let isbn13 = gtin.to_isbn13().unwrap();
        assert_eq!(isbn13.format, BookFormat::Isbn13);
        assert_eq!(isbn13.value, "9780306406157");

        let isbn10 = isbn13.to_isbn10().unwrap();
        assert_eq!(isbn10.value, "0306406152");
        assert_eq!(isbn10.check_char, '2');
        assert_eq!(isbn10.to_isbn13().unwrap(), isbn13);
    }

    #[test]
    fn test_isbn10_with_x_check() {
        let gtin = Gtin::parse("9780804429573").unwrap();
        assert_eq!(to_isbn10(&gtin).unwrap().value, "080442957X");
        assert_eq!(isbn10_to_gtin("080442957x").unwrap(), gtin);
    }

    #[test]
    fn test_979_has_no_isbn10() {
        let gtin = Gtin::parse("9791034567898").unwrap();
        assert!(to_isbn13(&gtin).is_some());
        assert!(to_isbn10(&gtin).is_none());
    }

    #[test]
    fn test_non_book_gtins() {
        let gtin = Gtin::parse("4006381333931").unwrap();
        assert!(to_isbn13(&gtin).is_none());
        assert!(to_isbn10(&gtin).is_none());
        assert!(to_issn(&gtin).is_none());

        let gtin14 = Gtin::parse("98710123456787").unwrap();
        assert!(to_isbn13(&gtin14).is_none());
    }

    #[test]
    fn test_isbn10_round_trip() {
        let gtin = isbn10_to_gtin("0-306-40615-2").unwrap();
        assert_eq!(gtin.value(), "9780306406157");
        assert_eq!(isbn10_to_gtin(&to_isbn10(&gtin).unwrap().value).unwrap(), gtin);
    }

    #[test]
    fn test_isbn10_errors() {
        assert_eq!(
            isbn10_to_gtin("0306406153").unwrap_err().kind(),
            ErrorKind::ChecksumMismatch
        );
        assert_eq!(isbn10_to_gtin("030640615").unwrap_err().kind(), ErrorKind::InvalidLength);
        assert!(matches!(
            isbn10_to_gtin("030640615Y"),
            Err(ParseError::InvalidCharacter { position: 9, .. })
        ));
    }

    #[test]
    fn test_issn() {
        let gtin = Gtin::parse("9770317847001").unwrap();
        let issn = gtin.to_issn().unwrap();
        assert_eq!(issn.value, "03178471");
        assert_eq!(issn.to_string(), "0317-8471");
        assert!(issn.to_isbn10().is_none());

        assert_eq!(issn_to_gtin("0317-8471", 0).unwrap(), gtin);
        assert!(issn_to_gtin("0317-8471", 100).is_err());
        assert_eq!(
            issn_to_gtin("0317-8472", 0).unwrap_err().kind(),
            ErrorKind::ChecksumMismatch
        );
    }

    #[test]
    fn test_deserialize_derives_book_number() {
        let gtin = Gtin::parse("9780306406157").unwrap();
        let isbn10 = to_isbn10(&gtin).unwrap();
        let json = serde_json::to_string(&isbn10).unwrap();
        assert_eq!(serde_json::from_str::<BookNumber>(&json).unwrap(), isbn10);

        let tampered = json.replace("0306406152", "0306406153");
        assert_eq!(serde_json::from_str::<BookNumber>(&tampered).unwrap(), isbn10);

        let issn = json.replace("\"isbn10\"", "\"issn\"");
        let err = serde_json::from_str::<BookNumber>(&issn).unwrap_err();
        assert!(err.to_string().contains("GTIN 9780306406157 has no Issn form"));
    }
}
