//! # Symbology Identifiers
//!
//! Scanners can be configured to prefix every payload with an ISO/IEC 15424
//! symbology identifier telling which barcode type was read.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "]C1010950110153310317100425"                                         │
//! │   │││                                                                   │
//! │   ││└── modifier: 1 = FNC1 in first position (GS1-128)                 │
//! │   │└─── code character: C = Code 128                                  │
//! │   └──── flag character                                                 │
//! │                                                                         │
//! │  strip() ──► (Some(]C1 = GS1-128), "010950110153310317100425")          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The prefix must be removed before any parser sees the payload: `]C1`
//! would otherwise be read as data.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Flag character that starts every symbology identifier.
pub const FLAG_CHARACTER: char = ']';

// =============================================================================
// Symbology
// =============================================================================

/// Barcode symbology named by the identifier's code character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Code39,
    Telepen,
    Code128,
    CodeOne,
    /// EAN-13, EAN-8, UPC-A, UPC-E and their add-ons.
    EanUpc,
    Codabar,
    Code93,
    Code11,
    InterleavedTwoOfFive,
    Code16K,
    Pdf417,
    Msi,
    Anker,
    Codablock,
    Plessey,
    QrCode,
    StraightTwoOfFiveTwoBarStart,
    StraightTwoOfFiveThreeBarStart,
    MaxiCode,
    DotCode,
    Other,
    NonBarcode,
    ChannelCode,
    DataMatrix,
    Gs1DataBar,
    Aztec,
}

impl Symbology {
    /// Maps an identifier code character to its symbology.
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'A' => Symbology::Code39,
            'B' => Symbology::Telepen,
            'C' => Symbology::Code128,
            'D' => Symbology::CodeOne,
            'E' => Symbology::EanUpc,
            'F' => Symbology::Codabar,
            'G' => Symbology::Code93,
            'H' => Symbology::Code11,
            'I' => Symbology::InterleavedTwoOfFive,
            'J' => Symbology::DotCode,
            'K' => Symbology::Code16K,
            'L' => Symbology::Pdf417,
            'M' => Symbology::Msi,
            'N' => Symbology::Anker,
            'O' => Symbology::Codablock,
            'P' => Symbology::Plessey,
            'Q' => Symbology::QrCode,
            'R' => Symbology::StraightTwoOfFiveTwoBarStart,
            'S' => Symbology::StraightTwoOfFiveThreeBarStart,
            'U' => Symbology::MaxiCode,
            'X' => Symbology::Other,
            'Z' => Symbology::NonBarcode,
            'c' => Symbology::ChannelCode,
            'd' => Symbology::DataMatrix,
            'e' => Symbology::Gs1DataBar,
            'z' => Symbology::Aztec,
            _ => return None,
        })
    }
}

// =============================================================================
// GS1 Symbology
// =============================================================================

/// GS1 symbologies, identified by code character and modifier together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Gs1Symbology {
    /// `]C1`
    Gs1128,
    /// `]e0`
    Gs1DataBar,
    /// `]e1`, `]e2`
    Gs1Composite,
    /// `]d2`
    Gs1DataMatrix,
    /// `]Q3`
    Gs1QrCode,
    /// `]J1`
    Gs1DotCode,
    /// `]E0`: EAN-13, UPC-A or UPC-E
    Ean13,
    /// `]E4`
    Ean8,
    /// `]E3`: EAN/UPC with a 2 or 5 digit add-on
    EanWithAddOn,
    /// `]I1`: ITF with check digit
    Itf14,
}

impl Gs1Symbology {
    /// Looks up the code/modifier pair of an identifier.
    pub fn from_identifier(code: char, modifier: char) -> Option<Self> {
        Some(match (code, modifier) {
            ('C', '1') => Gs1Symbology::Gs1128,
            ('e', '0') => Gs1Symbology::Gs1DataBar,
            ('e', '1') | ('e', '2') => Gs1Symbology::Gs1Composite,
            ('d', '2') => Gs1Symbology::Gs1DataMatrix,
            ('Q', '3') => Gs1Symbology::Gs1QrCode,
            ('J', '1') => Gs1Symbology::Gs1DotCode,
            ('E', '0') => Gs1Symbology::Ean13,
            ('E', '4') => Gs1Symbology::Ean8,
            ('E', '3') => Gs1Symbology::EanWithAddOn,
            ('I', '1') => Gs1Symbology::Itf14,
            _ => return None,
        })
    }

    /// The payload is a bare GTIN (or UPC).
    pub fn carries_gtin(&self) -> bool {
        matches!(
            self,
            Gs1Symbology::Ean13 | Gs1Symbology::Ean8 | Gs1Symbology::Itf14
        )
    }

    /// The payload is a GS1 element string.
    pub fn carries_element_strings(&self) -> bool {
        matches!(
            self,
            Gs1Symbology::Gs1128
                | Gs1Symbology::Gs1DataBar
                | Gs1Symbology::Gs1Composite
                | Gs1Symbology::Gs1DataMatrix
                | Gs1Symbology::Gs1QrCode
                | Gs1Symbology::Gs1DotCode
        )
    }
}

// =============================================================================
// Identifier
// =============================================================================

/// A recognized symbology identifier prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SymbologyIdentifier {
    /// The full prefix, e.g. `]C1`.
    pub value: String,
    pub symbology: Symbology,
    pub modifier: char,
    pub gs1_symbology: Option<Gs1Symbology>,
}

impl fmt::Display for SymbologyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Splits a leading symbology identifier off `raw`.
///
/// Unknown code characters leave the input untouched.
///
/// ```rust
/// use tillscan_core::symbology::{strip, Gs1Symbology};
///
/// let (identifier, payload) = strip("]E05901234123457");
/// assert_eq!(identifier.unwrap().gs1_symbology, Some(Gs1Symbology::Ean13));
/// assert_eq!(payload, "5901234123457");
///
/// assert_eq!(strip("5901234123457"), (None, "5901234123457"));
/// ```
pub fn strip(raw: &str) -> (Option<SymbologyIdentifier>, &str) {
    let mut chars = raw.chars();
    let (Some(FLAG_CHARACTER), Some(code), Some(modifier)) =
        (chars.next(), chars.next(), chars.next())
    else {
        return (None, raw);
    };
    let Some(symbology) = Symbology::from_code(code) else {
        return (None, raw);
    };

    let rest = chars.as_str();
    let identifier = SymbologyIdentifier {
        value: raw[..raw.len() - rest.len()].to_string(),
        symbology,
        modifier,
        gs1_symbology: Gs1Symbology::from_identifier(code, modifier),
    };
    (Some(identifier), rest)
}

// =============================================================================
// Unit Tests
// =============================================================================
