//! # Error Types
//!
//! Error types for tillscan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ParseError       - every parse/convert operation                      │
//! │  ├── kind()       - ErrorKind taxonomy callers branch on               │
//! │  └── FieldValueInvalid ──► InterpretError (source)                     │
//! │                                                                         │
//! │  InterpretError   - a GS1 field interpreter rejected the content       │
//! │  ConfigError      - ParseConfig could not be loaded or validated       │
//! │                                                                         │
//! │  Flow: InterpretError → ParseError → caller picks another format       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (value, AI, offset)
//! 3. Errors are enum variants, never String
//! 4. Nothing here is fatal: every error is returned to the immediate caller

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of a [`ParseError`].
///
/// Callers branch on the kind to decide whether to retry with another
/// assumed format, e.g. try GS1 parsing after GTIN normalization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A character is not permitted for the attempted format.
    InvalidCharacter,
    /// The digit count matches no format, or a field over/underruns its spec.
    InvalidLength,
    /// A recomputed check digit differs from the supplied one.
    ChecksumMismatch,
    /// No Application Identifier matches at the scan position.
    UnknownApplicationIdentifier,
    /// A field interpreter rejected the field content.
    FieldValueInvalid,
    /// The dispatcher found no format that accepts the payload.
    Unrecognized,
}

// =============================================================================
// Parse Error
// =============================================================================

/// Errors from parsing or converting a scanned payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character outside the allowed set.
    ///
    /// `position` is a byte offset into `value`. Inside a GS1 element the
    /// same failure is a `FieldValueInvalid` carrying the AI.
    #[error("Invalid character {character:?} at position {position} in {value:?}")]
    InvalidCharacter {
        value: String,
        character: char,
        position: usize,
    },

    /// The value has a length no known format uses.
    #[error("Invalid length {length} for {value:?}, expected {expected}")]
    InvalidLength {
        value: String,
        length: usize,
        expected: String,
    },

    /// A GS1 field is shorter or longer than its AI allows.
    #[error("Field for AI ({ai}) at offset {offset} has length {length}, expected {min}..={max}: {value:?}")]
    FieldLength {
        ai: String,
        offset: usize,
        value: String,
        length: usize,
        min: usize,
        max: usize,
    },

    /// The check digit (or check symbol) does not match.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan "4006381333932"
    ///      │
    ///      ▼
    /// ChecksumMismatch { expected: '1', found: '2' }
    ///      │
    ///      ▼
    /// UI shows: "Check digit should be 1, got 2 - rescan"
    /// ```
    #[error("Invalid check digit for {value:?}: expected {expected:?}, got {found:?}")]
    ChecksumMismatch {
        value: String,
        expected: char,
        found: char,
    },

    /// No Application Identifier in the table matches at `offset`.
    #[error("Unknown GS1 Application Identifier at offset {offset}: {remainder:?}")]
    UnknownApplicationIdentifier { offset: usize, remainder: String },

    /// A field value failed type-specific interpretation.
    #[error("Invalid value for AI ({ai}) at offset {offset}: {value:?}: {source}")]
    FieldValueInvalid {
        ai: String,
        offset: usize,
        value: String,
        #[source]
        source: InterpretError,
    },

    /// Every candidate format rejected the payload.
    #[error("Failed to parse {value:?}:{}", format_attempts(.attempts))]
    Unrecognized {
        value: String,
        attempts: Vec<(String, ParseError)>,
    },
}

fn format_attempts(attempts: &[(String, ParseError)]) -> String {
    attempts
        .iter()
        .map(|(parser, error)| format!("\n- {}: {}", parser, error))
        .collect()
}

impl ParseError {
    /// Returns the taxonomy bucket of this error.
    ///
    /// A GS1 field rejected for its character set is an `InvalidCharacter`
    /// even though it is reported as `FieldValueInvalid` to keep the AI.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::InvalidCharacter { .. } => ErrorKind::InvalidCharacter,
            ParseError::InvalidLength { .. } | ParseError::FieldLength { .. } => {
                ErrorKind::InvalidLength
            }
            ParseError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            ParseError::UnknownApplicationIdentifier { .. } => {
                ErrorKind::UnknownApplicationIdentifier
            }
            ParseError::FieldValueInvalid {
                source: InterpretError::InvalidCharacter { .. },
                ..
            } => ErrorKind::InvalidCharacter,
            ParseError::FieldValueInvalid { .. } => ErrorKind::FieldValueInvalid,
            ParseError::Unrecognized { .. } => ErrorKind::Unrecognized,
        }
    }

    /// Byte offset into the payload, for errors that carry one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::InvalidCharacter { position, .. } => Some(*position),
            ParseError::FieldLength { offset, .. }
            | ParseError::UnknownApplicationIdentifier { offset, .. }
            | ParseError::FieldValueInvalid { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// The Application Identifier the error is attributed to, if any.
    pub fn ai(&self) -> Option<&str> {
        match self {
            ParseError::FieldLength { ai, .. } | ParseError::FieldValueInvalid { ai, .. } => {
                Some(ai)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Interpret Error
// =============================================================================

/// Failures of the GS1 field value interpreters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// A character the field's character set does not allow.
    ///
    /// `position` is a byte offset into the field value.
    #[error("Invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    /// Field with a digit count the format does not allow.
    #[error("Expected {expected} digits, got {length}")]
    DigitCount { expected: String, length: usize },

    /// Month outside 1..=12.
    #[error("Invalid month {0}")]
    InvalidMonth(u32),

    /// Day does not exist in the given month.
    #[error("Invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },

    /// Hour/minute/second out of range.
    #[error("Invalid time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },

    /// Implied decimal places exceed the number of digits.
    #[error("Cannot place {places} decimals in {digits} digits")]
    DecimalPlaces { places: u8, digits: usize },

    /// Number does not fit the 64-bit mantissa.
    #[error("Number {0:?} is too large")]
    Overflow(String),

    /// ISO 4217 numeric code not in the currency table.
    #[error("Unknown ISO 4217 currency code {0:?}")]
    UnknownCurrency(String),

    /// An embedded identifier (GTIN, SSCC) failed its own validation.
    #[error("{0}")]
    Identifier(Box<ParseError>),
}

// =============================================================================
// Config Error
// =============================================================================

/// Errors loading or validating a [`crate::config::ParseConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document is malformed or has wrongly typed values.
    #[error("Invalid config document: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config values are individually valid but unusable together.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with ParseError.
pub type ParseResult<T> = Result<T, ParseError>;

/// Convenience type alias for Results with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParseError::ChecksumMismatch {
            value: "4006381333932".to_string(),
            expected: '1',
            found: '2',
        };
        assert_eq!(
            err.to_string(),
            "Invalid check digit for \"4006381333932\": expected '1', got '2'"
        );
    }

    #[test]
    fn test_kind_mapping() {
        let err = ParseError::FieldLength {
            ai: "10".to_string(),
            offset: 0,
            value: String::new(),
            length: 0,
            min: 1,
            max: 20,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidLength);
        assert_eq!(err.ai(), Some("10"));
        assert_eq!(err.offset(), Some(0));

        let err = ParseError::UnknownApplicationIdentifier {
            offset: 7,
            remainder: "99".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnknownApplicationIdentifier);
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn test_unrecognized_lists_attempts() {
        let err = ParseError::Unrecognized {
            value: "abc".to_string(),
            attempts: vec![(
                "GTIN".to_string(),
                ParseError::InvalidLength {
                    value: "abc".to_string(),
                    length: 3,
                    expected: "8, 12, 13, or 14 digits".to_string(),
                },
            )],
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse \"abc\":"));
        assert!(message.contains("\n- GTIN: Invalid length 3"));
    }

    #[test]
    fn test_field_value_invalid_has_source() {
        use std::error::Error as _;

        let err = ParseError::FieldValueInvalid {
            ai: "17".to_string(),
            offset: 16,
            value: "101325".to_string(),
            source: InterpretError::InvalidMonth(13),
        };
        assert_eq!(err.kind(), ErrorKind::FieldValueInvalid);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_field_character_error_keeps_ai() {
        let err = ParseError::FieldValueInvalid {
            ai: "10".to_string(),
            offset: 0,
            value: "AB~C".to_string(),
            source: InterpretError::InvalidCharacter {
                character: '~',
                position: 2,
            },
        };
        assert_eq!(err.kind(), ErrorKind::InvalidCharacter);
        assert_eq!(err.ai(), Some("10"));
        assert_eq!(
            err.to_string(),
            "Invalid value for AI (10) at offset 0: \"AB~C\": Invalid character '~' at position 2"
        );
    }
}
