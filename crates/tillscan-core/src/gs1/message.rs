//! # GS1 Element String Parser
//!
//! Splits a GS1 payload into Application Identifier elements and interprets
//! each field.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │        separator: skip                                                  │
//! │           ┌───┐                                                         │
//! │           ▼   │      end of input                                       │
//! │   ┌───────────────┐ ────────────────────────────► Done                  │
//! │   │ AtAiBoundary  │                                                     │
//! │   └───────┬───────┘ ── no AI matches ──► Err(UnknownApplicationId.)     │
//! │           │ longest AI match                                            │
//! │     ┌─────┴──────────────┐                                              │
//! │     ▼                    ▼                                              │
//! │ ReadingFixedField    ReadingVariableField                               │
//! │ exactly max_len      up to max_len or the                               │
//! │ characters           next separator (consumed)                          │
//! │     │                    │                                              │
//! │     └─────┬──────────────┘                                              │
//! │           ▼                                                             │
//! │   length, charset, interpreter ── failure ──► Err(..)                   │
//! │           │                                                             │
//! │           └──────────► AtAiBoundary                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Offsets in errors and elements are byte offsets into the payload
//! after symbology identifier stripping.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};
use ts_rs::TS;

use crate::config::ParseConfig;
use crate::error::{InterpretError, ParseError, ParseResult};
use crate::gs1::ai::{self, AiMatch, AiSpec, FieldKind, MeasureUnit};
use crate::gs1::interpret::{self, Gs1Date};
use crate::gtin::Gtin;
use crate::sscc::Sscc;
use crate::types::{MonetaryAmount, ScaledDecimal};
use crate::validation::first_invalid;

// =============================================================================
// Elements
// =============================================================================

/// Interpreted content of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ElementValue {
    Text(String),
    Gtin(Gtin),
    Sscc(Sscc),
    Date(Gs1Date),
    DateTime {
        #[ts(as = "String")]
        value: NaiveDateTime,
    },
    Decimal(ScaledDecimal),
    Measure {
        value: ScaledDecimal,
        unit: MeasureUnit,
    },
    Amount(MonetaryAmount),
}

/// One AI and its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Gs1Element {
    /// Full AI code, e.g. `"3103"`.
    pub ai: String,
    /// Field content as scanned, separator excluded.
    pub raw: String,
    pub value: ElementValue,
    /// Byte offset of the AI in the payload.
    pub offset: usize,
}

impl Gs1Element {
    /// The AI definition.
    pub fn spec(&self) -> Option<&'static AiSpec> {
        ai::find(&self.ai)
    }

    /// GS1 data title, e.g. `USE BY OR EXPIRY`.
    pub fn title(&self) -> &'static str {
        self.spec().map_or("", |spec| spec.title)
    }

    /// `(AI)value` form.
    pub fn as_hri(&self) -> String {
        format!("({}){}", self.ai, self.raw)
    }
}

// =============================================================================
// Message
// =============================================================================

/// A parsed GS1 element string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Gs1Message {
    /// The payload that was parsed.
    pub value: String,
    pub elements: Vec<Gs1Element>,
}

#[derive(Debug, Clone, Copy)]
struct PendingField<'a> {
    found: AiMatch<'a>,
    /// Offset of the AI.
    offset: usize,
    /// Offset of the field content.
    start: usize,
}

enum State<'a> {
    AtAiBoundary,
    ReadingFixedField(PendingField<'a>),
    ReadingVariableField(PendingField<'a>),
    Done,
}

impl Gs1Message {
    /// Parses a GS1 payload (symbology identifier already stripped).
    ///
    /// ## Example
    /// ```rust
    /// use tillscan_core::config::ParseConfig;
    /// use tillscan_core::gs1::Gs1Message;
    ///
    /// let msg = Gs1Message::parse("10ABC123\u{1d}17100425", &ParseConfig::default()).unwrap();
    /// assert_eq!(msg.elements.len(), 2);
    /// assert_eq!(msg.get("10").unwrap().raw, "ABC123");
    /// assert_eq!(msg.as_hri(), "(10)ABC123(17)100425");
    /// ```
    pub fn parse(payload: &str, config: &ParseConfig) -> ParseResult<Self> {
        let mut elements = Vec::new();
        let mut pos = 0;
        let mut state = State::AtAiBoundary;

        loop {
            state = match state {
                State::AtAiBoundary => match payload[pos..].chars().next() {
                    None => State::Done,
                    Some(c) if config.is_separator(c) => {
                        pos += c.len_utf8();
                        State::AtAiBoundary
                    }
                    Some(_) => {
                        let rest = &payload[pos..];
                        let found = ai::lookup(rest).ok_or_else(|| {
                            ParseError::UnknownApplicationIdentifier {
                                offset: pos,
                                remainder: rest.to_string(),
                            }
                        })?;
                        let field = PendingField {
                            found,
                            offset: pos,
                            start: pos + found.code.len(),
                        };
                        if found.spec.fixed {
                            State::ReadingFixedField(field)
                        } else {
                            State::ReadingVariableField(field)
                        }
                    }
                },
                State::ReadingFixedField(field) => {
                    let rest = &payload[field.start..];
                    let len = field.found.spec.max_len;
                    let end = rest.char_indices().nth(len).map_or(rest.len(), |(i, _)| i);
                    // A separator inside a predefined-length field truncates it
                    let raw = match rest[..end].find(|c| config.is_separator(c)) {
                        Some(i) => &rest[..i],
                        None => &rest[..end],
                    };
                    ensure_length(&field, raw)?;
                    elements.push(finish_field(&field, raw, config)?);
                    pos = field.start + raw.len();
                    State::AtAiBoundary
                }
                State::ReadingVariableField(field) => {
                    let rest = &payload[field.start..];
                    let max = field.found.spec.max_len;
                    let mut end = rest.len();
                    let mut separator_len = 0;
                    for (count, (i, c)) in rest.char_indices().enumerate() {
                        if config.is_separator(c) {
                            end = i;
                            separator_len = c.len_utf8();
                            break;
                        }
                        if count == max {
                            end = i;
                            break;
                        }
                    }
                    let raw = &rest[..end];
                    ensure_length(&field, raw)?;
                    elements.push(finish_field(&field, raw, config)?);
                    pos = field.start + raw.len() + separator_len;
                    State::AtAiBoundary
                }
                State::Done => break,
            };
        }

        if elements.is_empty() {
            return Err(ParseError::InvalidLength {
                value: payload.to_string(),
                length: payload.len(),
                expected: "at least one GS1 element".to_string(),
            });
        }

        debug!(elements = elements.len(), "Parsed GS1 element string");
        Ok(Gs1Message {
            value: payload.to_string(),
            elements,
        })
    }

    /// Parses the human readable interpretation, e.g.
    /// `(01)09501101533103(17)100425`.
    ///
    /// The HRI is rewritten to a payload (with the first configured
    /// separator after variable-length fields) and parsed normally, so
    /// error offsets refer to that payload.
    pub fn parse_hri(hri: &str, config: &ParseConfig) -> ParseResult<Self> {
        let hri = hri.trim();
        let separator = config
            .separator_chars
            .first()
            .copied()
            .unwrap_or(crate::GROUP_SEPARATOR);

        let mut payload = String::with_capacity(hri.len());
        let mut pos = 0;
        while pos < hri.len() {
            let rest = &hri[pos..];
            let close = match (rest.strip_prefix('('), rest.find(')')) {
                (Some(_), Some(close)) if close > 1 => close,
                _ => {
                    let character = rest.chars().next().unwrap_or('(');
                    return Err(ParseError::InvalidCharacter {
                        value: hri.to_string(),
                        character,
                        position: pos,
                    });
                }
            };
            let code = &rest[1..close];
            let spec = ai::find(code).ok_or_else(|| ParseError::UnknownApplicationIdentifier {
                offset: pos,
                remainder: rest.to_string(),
            })?;
            let value_start = close + 1;
            let value_end = rest[value_start..]
                .match_indices('(')
                .map(|(i, _)| value_start + i)
                .find(|&i| hri_ai_at(&rest[i..]).is_some())
                .unwrap_or(rest.len());

            payload.push_str(code);
            payload.push_str(&rest[value_start..value_end]);
            pos += value_end;
            if !spec.fixed && pos < hri.len() {
                payload.push(separator);
            }
        }

        Self::parse(&payload, config)
    }

    pub fn elements(&self) -> &[Gs1Element] {
        &self.elements
    }

    /// First element with exactly this AI.
    pub fn get(&self, ai: &str) -> Option<&Gs1Element> {
        self.elements.iter().find(|element| element.ai == ai)
    }

    /// Elements whose AI starts with `prefix`, e.g. `"310"` for every net
    /// weight regardless of decimal places.
    pub fn filter<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Gs1Element> + 'a {
        self.elements
            .iter()
            .filter(move |element| element.ai.starts_with(prefix))
    }

    /// Human readable interpretation: `(AI)value` for each element.
    pub fn as_hri(&self) -> String {
        self.elements.iter().map(Gs1Element::as_hri).collect()
    }

    /// True if both messages carry the same AIs and interpreted values,
    /// in any order.
    pub fn semantically_equals(&self, other: &Gs1Message) -> bool {
        if self.elements.len() != other.elements.len() {
            return false;
        }
        let mut unmatched: Vec<&Gs1Element> = other.elements.iter().collect();
        self.elements.iter().all(|element| {
            match unmatched
                .iter()
                .position(|candidate| candidate.ai == element.ai && candidate.value == element.value)
            {
                Some(i) => {
                    unmatched.swap_remove(i);
                    true
                }
                None => false,
            }
        })
    }
}

impl fmt::Display for Gs1Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hri())
    }
}

// =============================================================================
// Field Handling
// =============================================================================

/// An `(AI)` header at the start of `hri`, if the digits name a known AI.
///
/// `(` and `)` are CSET 82 characters, so anything else is field data.
fn hri_ai_at(hri: &str) -> Option<&'static AiSpec> {
    let close = hri.strip_prefix('(')?.find(')')? + 1;
    let code = &hri[1..close];
    if !(2..=4).contains(&code.len()) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    ai::find(code)
}

fn ensure_length(field: &PendingField<'_>, raw: &str) -> ParseResult<()> {
    let spec = field.found.spec;
    let length = raw.chars().count();
    if (spec.min_len..=spec.max_len).contains(&length) {
        return Ok(());
    }
    Err(ParseError::FieldLength {
        ai: field.found.code.to_string(),
        offset: field.offset,
        value: raw.to_string(),
        length,
        min: spec.min_len,
        max: spec.max_len,
    })
}

fn finish_field(
    field: &PendingField<'_>,
    raw: &str,
    config: &ParseConfig,
) -> ParseResult<Gs1Element> {
    let value = check_charset(field, raw)
        .and_then(|()| interpret_value(&field.found, raw, config))
        .map_err(|source| ParseError::FieldValueInvalid {
            ai: field.found.code.to_string(),
            offset: field.offset,
            value: raw.to_string(),
            source,
        })?;

    trace!(ai = field.found.code, offset = field.offset, raw, "GS1 element");
    Ok(Gs1Element {
        ai: field.found.code.to_string(),
        raw: raw.to_string(),
        value,
        offset: field.offset,
    })
}

fn check_charset(field: &PendingField<'_>, raw: &str) -> Result<(), InterpretError> {
    match first_invalid(raw, field.found.spec.kind.charset()) {
        Some((position, character)) => Err(InterpretError::InvalidCharacter {
            character,
            position,
        }),
        None => Ok(()),
    }
}

fn interpret_value(
    found: &AiMatch<'_>,
    raw: &str,
    config: &ParseConfig,
) -> Result<ElementValue, InterpretError> {
    let places = found.decimal_places().unwrap_or(0);
    let identifier = |e: ParseError| InterpretError::Identifier(Box::new(e));

    Ok(match found.spec.kind {
        FieldKind::Numeric | FieldKind::Alphanumeric => ElementValue::Text(raw.to_string()),
        FieldKind::Gtin => ElementValue::Gtin(Gtin::parse_with(raw, config).map_err(identifier)?),
        FieldKind::Sscc => ElementValue::Sscc(Sscc::parse(raw).map_err(identifier)?),
        FieldKind::Date => ElementValue::Date(interpret::date(raw, config.year_expansion)?),
        FieldKind::DateTime => ElementValue::DateTime {
            value: interpret::date_time(raw, config.year_expansion)?,
        },
        FieldKind::Decimal => ElementValue::Decimal(interpret::decimal(raw, places)?),
        FieldKind::Measure => {
            let value = interpret::decimal(raw, places)?;
            match found.spec.unit {
                Some(unit) => ElementValue::Measure { value, unit },
                None => ElementValue::Decimal(value),
            }
        }
        FieldKind::Amount => ElementValue::Amount(interpret::amount(raw, places)?),
        FieldKind::AmountWithCurrency => {
            ElementValue::Amount(interpret::amount_with_currency(raw, places)?)
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn parse(payload: &str) -> ParseResult<Gs1Message> {
        Gs1Message::parse(payload, &ParseConfig::default())
    }

    #[test]
    fn test_gtin_and_expiry() {
        let msg = parse("010950110153310317100425").unwrap();
        assert_eq!(msg.elements.len(), 2);

        let gtin = msg.get("01").unwrap();
        assert_eq!(gtin.offset, 0);
        assert_eq!(gtin.title(), "GTIN");
        match &gtin.value {
            ElementValue::Gtin(gtin) => assert_eq!(gtin.as_gtin_13(), Some("9501101533103")),
            other => panic!("expected GTIN, got {:?}", other),
        }

        let expiry = msg.get("17").unwrap();
        assert_eq!(expiry.offset, 16);
        assert_eq!(
            expiry.value,
            ElementValue::Date(Gs1Date {
                date: NaiveDate::from_ymd_opt(2010, 4, 25).unwrap(),
                day_unknown: false,
            })
        );
        assert_eq!(msg.as_hri(), "(01)09501101533103(17)100425");
    }

    #[test]
    fn test_variable_field_ends_at_separator() {
        let msg = parse("10ABC123\x1d17100425").unwrap();
        assert_eq!(msg.get("10").unwrap().value, ElementValue::Text("ABC123".to_string()));
        assert_eq!(msg.get("17").unwrap().offset, 9);
    }

    #[test]
    fn test_variable_field_last_needs_no_separator() {
        let msg = parse("1710042510ABC123").unwrap();
        assert_eq!(msg.get("10").unwrap().raw, "ABC123");
    }

    #[test]
    fn test_unknown_ai_at_start() {
        assert_eq!(
            parse("99ABC").unwrap_err(),
            ParseError::UnknownApplicationIdentifier {
                offset: 0,
                remainder: "99ABC".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_ai_after_element() {
        let err = parse("1710042599X").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownApplicationIdentifier);
        assert_eq!(err.offset(), Some(8));
    }

    #[test]
    fn test_fixed_field_too_short() {
        let err = parse("0109501101").unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldLength {
                ai: "01".to_string(),
                offset: 0,
                value: "09501101".to_string(),
                length: 8,
                min: 14,
                max: 14,
            }
        );
    }

    #[test]
    fn test_separator_inside_fixed_field() {
        let err = parse("17100\x1d425").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLength);
        assert_eq!(err.ai(), Some("17"));
    }

    #[test]
    fn test_variable_field_stops_at_max_length() {
        // AI 10 takes 20 characters; the 21st starts a new (unknown) AI
        let err = parse("10ABCDEFGHIJKLMNOPQRSTU").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownApplicationIdentifier {
                offset: 22,
                remainder: "U".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_character_names_ai() {
        let err = parse("10AB~C").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCharacter);
        assert_eq!(err.ai(), Some("10"));
        assert_eq!(err.offset(), Some(0));
        assert!(matches!(
            err,
            ParseError::FieldValueInvalid {
                source: InterpretError::InvalidCharacter {
                    character: '~',
                    position: 2,
                },
                ..
            }
        ));

        let err = parse("0109501101533103\x1d17A00425").unwrap_err();
        assert_eq!(err.ai(), Some("17"));
        assert_eq!(err.offset(), Some(17));
        assert_eq!(err.kind(), ErrorKind::InvalidCharacter);
    }

    #[test]
    fn test_field_value_invalid() {
        let err = parse("17101325").unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldValueInvalid {
                ai: "17".to_string(),
                offset: 0,
                value: "101325".to_string(),
                source: InterpretError::InvalidMonth(13),
            }
        );
    }

    #[test]
    fn test_embedded_gtin_check_digit() {
        let err = parse("0109501101533100").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldValueInvalid);
        match err {
            ParseError::FieldValueInvalid {
                source: InterpretError::Identifier(inner),
                ..
            } => assert_eq!(inner.kind(), ErrorKind::ChecksumMismatch),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_measures_and_amounts() {
        let msg = parse("3103001086\x1d3922001250\x1d39127521250").unwrap();
        assert_eq!(
            msg.get("3103").unwrap().value,
            ElementValue::Measure {
                value: ScaledDecimal::new(1086, 3),
                unit: MeasureUnit::Kilogram,
            }
        );
        match &msg.get("3922").unwrap().value {
            ElementValue::Amount(amount) => {
                assert_eq!(amount.currency, None);
                assert_eq!(amount.to_string(), "12.50");
            }
            other => panic!("expected amount, got {:?}", other),
        }
        match &msg.get("3912").unwrap().value {
            ElementValue::Amount(amount) => assert_eq!(amount.to_string(), "SEK 12.50"),
            other => panic!("expected amount, got {:?}", other),
        }
        assert_eq!(msg.filter("39").count(), 2);
    }

    #[test]
    fn test_sscc_and_date_time() {
        let msg = parse("00370446108734667147\x1d70032304251530").unwrap();
        assert!(matches!(msg.get("00").unwrap().value, ElementValue::Sscc(_)));
        match &msg.get("7003").unwrap().value {
            ElementValue::DateTime { value } => {
                assert_eq!(value.to_string(), "2023-04-25 15:30:00")
            }
            other => panic!("expected date/time, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_and_custom_separators() {
        assert!(parse("\x1d0109501101533103\x1d").is_ok());

        let config = ParseConfig::default().with_separator_chars(['|']);
        let msg = Gs1Message::parse("10ABC|21XYZ", &config).unwrap();
        assert_eq!(msg.get("21").unwrap().raw, "XYZ");
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(parse("").unwrap_err().kind(), ErrorKind::InvalidLength);
        assert_eq!(parse("\x1d").unwrap_err().kind(), ErrorKind::InvalidLength);
    }

    #[test]
    fn test_hri_round_trip() {
        let config = ParseConfig::default();
        let hri = "(01)09501101533103(10)ABC123(17)100425";
        let from_hri = Gs1Message::parse_hri(hri, &config).unwrap();
        assert_eq!(from_hri.value, "010950110153310310ABC123\x1d17100425");
        assert_eq!(from_hri.as_hri(), hri);

        let reordered = parse("1710042510ABC123\x1d0109501101533103").unwrap();
        assert!(from_hri.semantically_equals(&reordered));
        assert_ne!(from_hri, reordered);

        let different = parse("1710042610ABC123\x1d0109501101533103").unwrap();
        assert!(!from_hri.semantically_equals(&different));
    }

    #[test]
    fn test_hri_errors() {
        let config = ParseConfig::default();
        assert_eq!(
            Gs1Message::parse_hri("(99)ABC", &config).unwrap_err().kind(),
            ErrorKind::UnknownApplicationIdentifier
        );
        assert_eq!(
            Gs1Message::parse_hri("01)123", &config).unwrap_err().kind(),
            ErrorKind::InvalidCharacter
        );
    }

    #[test]
    fn test_hri_parentheses_inside_values() {
        let config = ParseConfig::default();
        let msg = Gs1Message::parse_hri("(10)AB(C)(17)100425", &config).unwrap();
        assert_eq!(msg.get("10").unwrap().raw, "AB(C)");
        assert_eq!(msg.get("17").unwrap().raw, "100425");
        assert_eq!(msg.as_hri(), "(10)AB(C)(17)100425");

        let msg = Gs1Message::parse_hri("(21)X(99)Y", &config).unwrap();
        assert_eq!(msg.elements.len(), 1);
        assert_eq!(msg.get("21").unwrap().raw, "X(99)Y");
    }
}
