//! # tillscan-core: Barcode Payload Interpretation for the Till
//!
//! This crate turns the text a barcode scanner emits into validated,
//! structured records: GTINs, UPCs, SSCCs, ISBN/ISSN numbers, in-store
//! variable-measure codes and GS1 element strings. It has zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scan Interpretation                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │         Scanner (keyboard wedge / serial / HID POS)             │   │
//! │  │              "]C1010950110153310317100425"                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ raw text                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tillscan-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   symbology ──► scan dispatch                                   │   │
//! │  │                   │                                             │   │
//! │  │      ┌────────────┼─────────────┬──────────────┐                │   │
//! │  │      ▼            ▼             ▼              ▼                │   │
//! │  │   ┌──────┐    ┌──────┐     ┌──────┐     ┌────────────┐          │   │
//! │  │   │ gtin │    │ upc  │     │ sscc │     │ gs1        │          │   │
//! │  │   │ rcn  │    └──────┘     └──────┘     │ ai table   │          │   │
//! │  │   │ isbn │                              │ message    │          │   │
//! │  │   └──┬───┘                              │ interpret  │          │   │
//! │  │      └──────────► checksum ◄────────────┴────────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ParsedBarcode                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          Product lookup / cart (outside this crate)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`scan`] - Top-level dispatch over every supported payload kind
//! - [`symbology`] - Symbology identifier (`]C1`, `]E0`, ...) stripping
//! - [`gtin`] - GTIN-8/12/13/14 normalization and classification
//! - [`rcn`] - Restricted circulation numbers and variable measures
//! - [`upc`] - UPC-A and zero-suppressed UPC-E
//! - [`sscc`] - Serial Shipping Container Codes
//! - [`isbn`] - ISBN-10/13 and ISSN conversion
//! - [`gs1`] - Application Identifier table and element string parser
//! - [`checksum`] - Mod 10, mod 11 and price check digits
//! - [`prefix`] - GS1 prefix (issuing organisation) lookup
//! - [`config`] - Parser configuration
//! - [`error`] - Error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Same input, same output. Shared tables are static.
//! 2. **No Floating Point**: Weights and prices are `ScaledDecimal`s.
//! 3. **Explicit Errors**: Every rejection says what was wrong and where.
//! 4. **Not Globally Unique Is Visible**: RCNs are flagged, never hidden.
//!
//! ## Example Usage
//!
//! ```rust
//! use tillscan_core::{parse, Payload};
//!
//! let scan = parse("]E04006381333931").unwrap();
//! let Payload::Gtin(gtin) = scan.payload else { panic!() };
//! assert_eq!(gtin.as_gtin_14(), "04006381333931");
//! assert_eq!(gtin.prefix().unwrap().usage, "GS1 Germany");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checksum;
pub mod config;
pub mod error;
pub mod gs1;
pub mod gtin;
pub mod isbn;
#[cfg(feature = "money")]
pub mod money;
pub mod prefix;
pub mod rcn;
pub mod scan;
pub mod sscc;
pub mod symbology;
pub mod types;
pub mod upc;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::ParseConfig;
pub use error::{ErrorKind, ParseError, ParseResult};
pub use gs1::{Gs1Element, Gs1Message};
pub use gtin::{Gtin, GtinClass, GtinFormat};
pub use isbn::BookNumber;
pub use rcn::{Rcn, RcnRegion};
pub use scan::{parse, parse_with, ParsedBarcode, Payload};
pub use sscc::Sscc;
pub use upc::Upc;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// ASCII group separator (GS, 0x1D), transmitted for FNC1 inside a GS1
/// element string.
pub const GROUP_SEPARATOR: char = '\x1d';

/// GTINs are stored as 14 digits regardless of their declared format.
pub const GTIN_CANONICAL_LENGTH: usize = 14;
