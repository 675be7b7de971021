//! # Scan Dispatch
//!
//! Entry point for raw scanner output. Strips the symbology identifier and
//! hands the payload to the parsers that can accept it.
//!
//! ## Dispatch Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw ──► trim ──► symbology::strip ──► (identifier, payload)            │
//! │                                              │                          │
//! │         ┌────────────────────────────────────┼──────────────────┐       │
//! │         ▼                                    ▼                  ▼       │
//! │  ]E0 ]E4 ]I1                       ]C1 ]e0 ]d2 ]Q3 ...    no GS1 hint   │
//! │  GTIN (UPC first for ]E0 < 12)     GS1 element string     GTIN          │
//! │                                                            SSCC         │
//! │                                                            UPC          │
//! │                                                            GS1 element  │
//! │                                                                         │
//! │  First success wins. 977/978/979 GTINs come back as book numbers.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::config::ParseConfig;
use crate::error::{ParseError, ParseResult};
use crate::gs1::{ElementValue, Gs1Message};
use crate::gtin::Gtin;
use crate::isbn::{self, BookNumber};
use crate::sscc::Sscc;
use crate::symbology::{self, Gs1Symbology, SymbologyIdentifier};
use crate::upc::Upc;

// =============================================================================
// Parse Result Records
// =============================================================================

/// The interpreted content of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Gtin(Gtin),
    Upc(Upc),
    Sscc(Sscc),
    /// ISBN-13 or ISSN carried by a Bookland/ISSN GTIN-13.
    Book(BookNumber),
    ElementString(Gs1Message),
}

impl Payload {
    /// The GTIN behind this payload, when there is exactly one.
    pub fn gtin(&self) -> Option<Gtin> {
        match self {
            Payload::Gtin(gtin) => Some(gtin.clone()),
            Payload::Book(book) => Some(book.gtin.clone()),
            Payload::Upc(upc) => upc.as_gtin().ok(),
            Payload::ElementString(message) => match message.get("01").map(|e| &e.value) {
                Some(ElementValue::Gtin(gtin)) => Some(gtin.clone()),
                _ => None,
            },
            Payload::Sscc(_) => None,
        }
    }
}

/// A scan with its symbology identifier and interpreted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParsedBarcode {
    /// Input as received.
    pub raw: String,
    pub symbology: Option<SymbologyIdentifier>,
    pub payload: Payload,
}

// =============================================================================
// Dispatch
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parser {
    Gtin,
    Upc,
    Sscc,
    ElementString,
}

impl Parser {
    fn name(&self) -> &'static str {
        match self {
            Parser::Gtin => "GTIN",
            Parser::Upc => "UPC",
            Parser::Sscc => "SSCC",
            Parser::ElementString => "GS1 element string",
        }
    }

    fn run(&self, payload: &str, config: &ParseConfig) -> ParseResult<Payload> {
        match self {
            Parser::Gtin => Gtin::parse_with(payload, config).map(relabel_books),
            Parser::Upc => Upc::parse(payload).map(Payload::Upc),
            Parser::Sscc => Sscc::parse(payload).map(Payload::Sscc),
            Parser::ElementString => Gs1Message::parse(payload, config).map(Payload::ElementString),
        }
    }
}

fn relabel_books(gtin: Gtin) -> Payload {
    match isbn::to_issn(&gtin).or_else(|| isbn::to_isbn13(&gtin)) {
        Some(book) => Payload::Book(book),
        None => Payload::Gtin(gtin),
    }
}

fn candidates(identifier: Option<&SymbologyIdentifier>, payload: &str) -> &'static [Parser] {
    const UNHINTED: &[Parser] = &[Parser::Gtin, Parser::Sscc, Parser::Upc, Parser::ElementString];

    match identifier.and_then(|id| id.gs1_symbology) {
        Some(Gs1Symbology::Ean13) if payload.len() < 12 => &[Parser::Upc, Parser::Gtin],
        Some(Gs1Symbology::Ean13) => &[Parser::Gtin, Parser::Upc],
        Some(gs1) if gs1.carries_gtin() => &[Parser::Gtin],
        Some(gs1) if gs1.carries_element_strings() => &[Parser::ElementString],
        _ => UNHINTED,
    }
}

/// Parses a raw scan with the default configuration.
///
/// ## Example
/// ```rust
/// use tillscan_core::scan::{parse, Payload};
///
/// let scan = parse("]C1010950110153310317100425").unwrap();
/// let Payload::ElementString(message) = scan.payload else { panic!() };
/// assert_eq!(message.as_hri(), "(01)09501101533103(17)100425");
/// ```
pub fn parse(raw: &str) -> ParseResult<ParsedBarcode> {
    parse_with(raw, &ParseConfig::default())
}

/// Parses a raw scan.
///
/// When a GS1 symbology identifier names a single candidate parser, that
/// parser's error is returned as is. Otherwise a failed scan yields
/// [`ParseError::Unrecognized`] listing every attempt.
pub fn parse_with(raw: &str, config: &ParseConfig) -> ParseResult<ParsedBarcode> {
    let (symbology, payload) = symbology::strip(raw.trim());
    let parsers = candidates(symbology.as_ref(), payload);

    let mut attempts = Vec::with_capacity(parsers.len());
    for parser in parsers {
        match parser.run(payload, config) {
            Ok(parsed) => {
                debug!(parser = parser.name(), payload, "Scan recognized");
                return Ok(ParsedBarcode {
                    raw: raw.to_string(),
                    symbology,
                    payload: parsed,
                });
            }
            Err(error) => {
                debug!(parser = parser.name(), payload, %error, "Parser rejected scan");
                attempts.push((parser.name().to_string(), error));
            }
        }
    }

    if attempts.len() == 1 {
        if let Some((_, error)) = attempts.pop() {
            return Err(error);
        }
    }
    Err(ParseError::Unrecognized {
        value: raw.to_string(),
        attempts,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::isbn::BookFormat;
    use crate::rcn::RcnRegion;
    use crate::types::ScaledDecimal;
    use crate::upc::UpcFormat;

    #[test]
    fn test_plain_gtin() {
        let scan = parse("4006381333931").unwrap();
        assert!(scan.symbology.is_none());
        assert!(matches!(&scan.payload, Payload::Gtin(g) if g.value() == "4006381333931"));
    }

    #[test]
    fn test_gtin_checksum_failure_lists_attempts() {
        let err = parse("9900000000005").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unrecognized);
        let ParseError::Unrecognized { attempts, .. } = err else { unreachable!() };
        assert_eq!(attempts.len(), 4);
        assert_eq!(attempts[0].0, "GTIN");
        assert!(matches!(
            attempts[0].1,
            ParseError::ChecksumMismatch { expected: '4', found: '5', .. }
        ));
        assert_eq!(attempts[3].1.kind(), ErrorKind::UnknownApplicationIdentifier);
    }

    #[test]
    fn test_element_string_without_identifier() {
        let scan = parse("010950110153310317100425").unwrap();
        let Payload::ElementString(message) = &scan.payload else { panic!("{:?}", scan) };
        assert_eq!(message.elements.len(), 2);
        assert_eq!(scan.payload.gtin().unwrap().value(), "09501101533103");
    }

    #[test]
    fn test_gs1_128_identifier_returns_parser_error() {
        let err = parse("]C1991234").unwrap_err();
        assert!(matches!(err, ParseError::UnknownApplicationIdentifier { offset: 0, .. }));
    }

    #[test]
    fn test_sscc() {
        let scan = parse("370446108734667147").unwrap();
        assert!(matches!(scan.payload, Payload::Sscc(_)));
    }

    #[test]
    fn test_upc_e_with_identifier() {
        let scan = parse("]E004252614").unwrap();
        let Payload::Upc(upc) = &scan.payload else { panic!("{:?}", scan) };
        assert_eq!(upc.format(), UpcFormat::UpcE);
        assert_eq!(upc.as_upc_a(), "042100005264");
    }

    #[test]
    fn test_ean8_identifier() {
        let scan = parse("]E496385074").unwrap();
        assert!(matches!(scan.payload, Payload::Gtin(_)));
        assert_eq!(scan.symbology.unwrap().value, "]E4");
    }

    #[test]
    fn test_book_relabeling() {
        let scan = parse("9780306406157").unwrap();
        let Payload::Book(book) = &scan.payload else { panic!("{:?}", scan) };
        assert_eq!(book.format, BookFormat::Isbn13);

        let scan = parse("9770317847001").unwrap();
        let Payload::Book(book) = &scan.payload else { panic!("{:?}", scan) };
        assert_eq!(book.to_string(), "0317-8471");
    }

    #[test]
    fn test_rcn_price_with_region() {
        let config = ParseConfig::default().with_rcn_region(RcnRegion::Sweden);
        let scan = parse_with("2012345012509", &config).unwrap();
        let gtin = scan.payload.gtin().unwrap();
        let price = gtin.rcn().and_then(|rcn| rcn.price()).unwrap();
        assert_eq!(price.amount, ScaledDecimal::new(1250, 2));
        assert!(!gtin.classification().is_globally_unique());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let scan = parse("  ]E04006381333931\n").unwrap();
        assert!(matches!(scan.payload, Payload::Gtin(_)));
        assert_eq!(scan.raw, "  ]E04006381333931\n");
    }
}
