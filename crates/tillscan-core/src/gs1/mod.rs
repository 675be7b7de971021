//! # GS1 Element Strings
//!
//! - [`ai`] - Application Identifier table and lookup
//! - [`interpret`] - Field value interpreters (dates, decimals, amounts)
//! - [`message`] - Element string parser and the parsed message record

pub mod ai;
pub mod interpret;
pub mod message;

pub use ai::{AiSpec, FieldKind, MeasureUnit};
pub use interpret::{Gs1Date, YearExpansion};
pub use message::{ElementValue, Gs1Element, Gs1Message};
