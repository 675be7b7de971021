//! # Application Identifier Table
//!
//! Static definitions of the GS1 Application Identifiers (AIs) this crate
//! understands.
//!
//! ## AI Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "01" 09501101533103      2-digit AI, predefined length 14              │
//! │  "10" ABC123 <GS>         2-digit AI, variable length 1..=20            │
//! │  "310" "3" 001086         indexed: family 310 (net weight, kg),         │
//! │                           4th digit = 3 implied decimal places          │
//! │  "7003" 2304251530        4-digit AI                                    │
//! │                                                                         │
//! │  No AI code is a prefix of another, so the longest match is unique.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! AIs 91-99 (company internal) are not listed: their content is private
//! to the issuing company.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use ts_rs::TS;

use crate::validation::Charset;

// =============================================================================
// Field Kinds and Units
// =============================================================================

/// Unit of a trade or logistic measure (AI families 310-369).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MeasureUnit {
    Kilogram,
    Metre,
    SquareMetre,
    Litre,
    CubicMetre,
    KilogramPerSquareMetre,
    Pound,
    TroyOunce,
    Inch,
    Foot,
    Yard,
    SquareInch,
    SquareFoot,
    SquareYard,
    FluidOunce,
    Quart,
    Gallon,
    CubicInch,
    CubicFoot,
    CubicYard,
}

impl MeasureUnit {
    pub const fn symbol(&self) -> &'static str {
        match self {
            MeasureUnit::Kilogram => "kg",
            MeasureUnit::Metre => "m",
            MeasureUnit::SquareMetre => "m2",
            MeasureUnit::Litre => "l",
            MeasureUnit::CubicMetre => "m3",
            MeasureUnit::KilogramPerSquareMetre => "kg/m2",
            MeasureUnit::Pound => "lb",
            MeasureUnit::TroyOunce => "t oz",
            MeasureUnit::Inch => "in",
            MeasureUnit::Foot => "ft",
            MeasureUnit::Yard => "yd",
            MeasureUnit::SquareInch => "in2",
            MeasureUnit::SquareFoot => "ft2",
            MeasureUnit::SquareYard => "yd2",
            MeasureUnit::FluidOunce => "oz",
            MeasureUnit::Quart => "qt",
            MeasureUnit::Gallon => "gal",
            MeasureUnit::CubicInch => "in3",
            MeasureUnit::CubicFoot => "ft3",
            MeasureUnit::CubicYard => "yd3",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Selects the interpreter for a field's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Digits kept as text (counts, location numbers, country codes).
    Numeric,
    /// GS1 CSET 82 text.
    Alphanumeric,
    /// Embedded GTIN-14, check digit verified.
    Gtin,
    /// Embedded SSCC, check digit verified.
    Sscc,
    /// `YYMMDD`, day `00` allowed.
    Date,
    /// `YYMMDDHH[MM[SS]]`.
    DateTime,
    /// Digits with implied decimals taken from the AI's 4th digit.
    Decimal,
    /// Trade or logistic measure; unit given by the AI family.
    Measure,
    /// Amount in local currency.
    Amount,
    /// ISO 4217 numeric code, then the amount.
    AmountWithCurrency,
}

impl FieldKind {
    /// Character set the raw field must satisfy.
    pub const fn charset(&self) -> Charset {
        match self {
            FieldKind::Alphanumeric => Charset::Cset82,
            _ => Charset::Numeric,
        }
    }
}

// =============================================================================
// AI Specs
// =============================================================================

/// Definition of one Application Identifier (or indexed AI family).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSpec {
    /// The AI digits, or the 3-digit family key when `indexed`.
    pub code: &'static str,
    /// GS1 data title, e.g. `BEST BEFORE or BEST BY`.
    pub title: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub min_len: usize,
    pub max_len: usize,
    /// Predefined length: the field is never followed by a separator.
    pub fixed: bool,
    /// The AI has a fourth digit that is a parameter, not part of the key.
    pub indexed: bool,
    pub unit: Option<MeasureUnit>,
}

impl AiSpec {
    /// Returns true for predefined-length AIs.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Length of the full AI code in a payload.
    pub fn ai_len(&self) -> usize {
        self.code.len() + usize::from(self.indexed)
    }
}

const fn fixed(
    code: &'static str,
    title: &'static str,
    description: &'static str,
    kind: FieldKind,
    len: usize,
) -> AiSpec {
    AiSpec {
        code,
        title,
        description,
        kind,
        min_len: len,
        max_len: len,
        fixed: true,
        indexed: false,
        unit: None,
    }
}

const fn var(
    code: &'static str,
    title: &'static str,
    description: &'static str,
    kind: FieldKind,
    min_len: usize,
    max_len: usize,
) -> AiSpec {
    AiSpec {
        code,
        title,
        description,
        kind,
        min_len,
        max_len,
        fixed: false,
        indexed: false,
        unit: None,
    }
}

const fn measure(
    family: &'static str,
    title: &'static str,
    description: &'static str,
    unit: MeasureUnit,
) -> AiSpec {
    AiSpec {
        code: family,
        title,
        description,
        kind: FieldKind::Measure,
        min_len: 6,
        max_len: 6,
        fixed: true,
        indexed: true,
        unit: Some(unit),
    }
}

const fn indexed(
    family: &'static str,
    title: &'static str,
    description: &'static str,
    kind: FieldKind,
    min_len: usize,
    max_len: usize,
) -> AiSpec {
    AiSpec {
        code: family,
        title,
        description,
        kind,
        min_len,
        max_len,
        fixed: false,
        indexed: true,
        unit: None,
    }
}

use FieldKind::*;
use MeasureUnit::*;

/// The AI table. Read-only; indexed once on first lookup.
static AI_TABLE: &[AiSpec] = &[
    // Identification keys
    fixed("00", "SSCC", "Serial Shipping Container Code (SSCC)", Sscc, 18),
    fixed("01", "GTIN", "Global Trade Item Number (GTIN)", Gtin, 14),
    fixed("02", "CONTENT", "GTIN of contained trade items", Gtin, 14),
    fixed("03", "MTO GTIN", "GTIN of a trade item made to order", Gtin, 14),
    // Batch, dates, serials
    var("10", "BATCH/LOT", "Batch or lot number", Alphanumeric, 1, 20),
    fixed("11", "PROD DATE", "Production date (YYMMDD)", Date, 6),
    fixed("12", "DUE DATE", "Due date for amount on payment slip (YYMMDD)", Date, 6),
    fixed("13", "PACK DATE", "Packaging date (YYMMDD)", Date, 6),
    fixed("15", "BEST BEFORE or BEST BY", "Best before date (YYMMDD)", Date, 6),
    fixed("16", "SELL BY", "Sell by date (YYMMDD)", Date, 6),
    fixed("17", "USE BY OR EXPIRY", "Expiration date (YYMMDD)", Date, 6),
    fixed("20", "VARIANT", "Internal product variant", Numeric, 2),
    var("21", "SERIAL", "Serial number", Alphanumeric, 1, 20),
    var("22", "CPV", "Consumer product variant", Alphanumeric, 1, 20),
    var("235", "TPX", "Third Party Controlled, Serialised Extension of GTIN", Alphanumeric, 1, 28),
    var("240", "ADDITIONAL ID", "Additional product identification assigned by the manufacturer", Alphanumeric, 1, 30),
    var("241", "CUST. PART No.", "Customer part number", Alphanumeric, 1, 30),
    var("242", "MTO VARIANT", "Made-to-Order variation number", Numeric, 1, 6),
    var("243", "PCN", "Packaging component number", Alphanumeric, 1, 20),
    var("250", "SECONDARY SERIAL", "Secondary serial number", Alphanumeric, 1, 30),
    var("251", "REF. TO SOURCE", "Reference to source entity", Alphanumeric, 1, 30),
    var("253", "GDTI", "Global Document Type Identifier (GDTI)", Alphanumeric, 13, 30),
    var("254", "GLN EXTENSION COMPONENT", "Global Location Number (GLN) extension component", Alphanumeric, 1, 20),
    var("255", "GCN", "Global Coupon Number (GCN)", Numeric, 13, 25),
    // Quantities
    var("30", "VAR. COUNT", "Variable count of items", Numeric, 1, 8),
    // Trade measures, metric
    measure("310", "NET WEIGHT (kg)", "Net weight, kilograms", Kilogram),
    measure("311", "LENGTH (m)", "Length or first dimension, metres", Metre),
    measure("312", "WIDTH (m)", "Width, diameter, or second dimension, metres", Metre),
    measure("313", "HEIGHT (m)", "Depth, thickness, height, or third dimension, metres", Metre),
    measure("314", "AREA (m2)", "Area, square metres", SquareMetre),
    measure("315", "NET VOLUME (l)", "Net volume, litres", Litre),
    measure("316", "NET VOLUME (m3)", "Net volume, cubic metres", CubicMetre),
    // Trade measures, imperial
    measure("320", "NET WEIGHT (lb)", "Net weight, pounds", Pound),
    measure("321", "LENGTH (in)", "Length or first dimension, inches", Inch),
    measure("322", "LENGTH (ft)", "Length or first dimension, feet", Foot),
    measure("323", "LENGTH (yd)", "Length or first dimension, yards", Yard),
    measure("324", "WIDTH (in)", "Width, diameter, or second dimension, inches", Inch),
    measure("325", "WIDTH (ft)", "Width, diameter, or second dimension, feet", Foot),
    measure("326", "WIDTH (yd)", "Width, diameter, or second dimension, yards", Yard),
    measure("327", "HEIGHT (in)", "Depth, thickness, height, or third dimension, inches", Inch),
    measure("328", "HEIGHT (ft)", "Depth, thickness, height, or third dimension, feet", Foot),
    measure("329", "HEIGHT (yd)", "Depth, thickness, height, or third dimension, yards", Yard),
    // Logistic measures, metric
    measure("330", "GROSS WEIGHT (kg)", "Logistic weight, kilograms", Kilogram),
    measure("331", "LENGTH (m), log", "Length or first dimension, metres", Metre),
    measure("332", "WIDTH (m), log", "Width, diameter, or second dimension, metres", Metre),
    measure("333", "HEIGHT (m), log", "Depth, thickness, height, or third dimension, metres", Metre),
    measure("334", "AREA (m2), log", "Area, square metres", SquareMetre),
    measure("335", "VOLUME (l), log", "Logistic volume, litres", Litre),
    measure("336", "VOLUME (m3), log", "Logistic volume, cubic metres", CubicMetre),
    measure("337", "KG PER m2", "Kilograms per square metre", KilogramPerSquareMetre),
    // Logistic measures, imperial
    measure("340", "GROSS WEIGHT (lb)", "Logistic weight, pounds", Pound),
    measure("341", "LENGTH (in), log", "Length or first dimension, inches", Inch),
    measure("342", "LENGTH (ft), log", "Length or first dimension, feet", Foot),
    measure("343", "LENGTH (yd), log", "Length or first dimension, yards", Yard),
    measure("344", "WIDTH (in), log", "Width, diameter, or second dimension, inches", Inch),
    measure("345", "WIDTH (ft), log", "Width, diameter, or second dimension, feet", Foot),
    measure("346", "WIDTH (yd), log", "Width, diameter, or second dimension, yards", Yard),
    measure("347", "HEIGHT (in), log", "Depth, thickness, height, or third dimension, inches", Inch),
    measure("348", "HEIGHT (ft), log", "Depth, thickness, height, or third dimension, feet", Foot),
    measure("349", "HEIGHT (yd), log", "Depth, thickness, height, or third dimension, yards", Yard),
    measure("350", "AREA (in2)", "Area, square inches", SquareInch),
    measure("351", "AREA (ft2)", "Area, square feet", SquareFoot),
    measure("352", "AREA (yd2)", "Area, square yards", SquareYard),
    measure("353", "AREA (in2), log", "Area, square inches", SquareInch),
    measure("354", "AREA (ft2), log", "Area, square feet", SquareFoot),
    measure("355", "AREA (yd2), log", "Area, square yards", SquareYard),
    measure("356", "NET WEIGHT (t oz)", "Net weight, troy ounces", TroyOunce),
    measure("357", "NET VOLUME (oz)", "Net weight or volume, ounces", FluidOunce),
    measure("360", "NET VOLUME (qt)", "Net volume, quarts", Quart),
    measure("361", "NET VOLUME (gal.)", "Net volume, gallons (U.S.)", Gallon),
    measure("362", "VOLUME (qt), log", "Logistic volume, quarts", Quart),
    measure("363", "VOLUME (gal.), log", "Logistic volume, gallons (U.S.)", Gallon),
    measure("364", "VOLUME (in3)", "Net volume, cubic inches", CubicInch),
    measure("365", "VOLUME (ft3)", "Net volume, cubic feet", CubicFoot),
    measure("366", "VOLUME (yd3)", "Net volume, cubic yards", CubicYard),
    measure("367", "VOLUME (in3), log", "Logistic volume, cubic inches", CubicInch),
    measure("368", "VOLUME (ft3), log", "Logistic volume, cubic feet", CubicFoot),
    measure("369", "VOLUME (yd3), log", "Logistic volume, cubic yards", CubicYard),
    var("37", "COUNT", "Count of trade items contained in a logistic unit", Numeric, 1, 8),
    // Amounts
    indexed("390", "AMOUNT", "Amount payable or coupon value, local currency", Amount, 1, 15),
    indexed("391", "AMOUNT", "Amount payable, with ISO currency code", AmountWithCurrency, 4, 18),
    indexed("392", "PRICE", "Amount payable for a variable measure trade item, single monetary area", Amount, 1, 15),
    indexed("393", "PRICE", "Amount payable for a variable measure trade item, with ISO currency code", AmountWithCurrency, 4, 18),
    indexed("394", "PRCNT OFF", "Percentage discount of a coupon", Decimal, 4, 4),
    indexed("395", "PRICE/UoM", "Amount payable per unit of measure", Decimal, 6, 6),
    // Shipping and locations
    var("400", "ORDER NUMBER", "Customer's purchase order number", Alphanumeric, 1, 30),
    var("401", "GINC", "Global Identification Number for Consignment (GINC)", Alphanumeric, 1, 30),
    var("402", "GSIN", "Global Shipment Identification Number (GSIN)", Numeric, 17, 17),
    var("403", "ROUTE", "Routing code", Alphanumeric, 1, 30),
    fixed("410", "SHIP TO LOC", "Ship to - Deliver to Global Location Number", Numeric, 13),
    fixed("411", "BILL TO", "Bill to - Invoice to Global Location Number", Numeric, 13),
    fixed("412", "PURCHASE FROM", "Purchased from Global Location Number", Numeric, 13),
    fixed("413", "SHIP FOR LOC", "Ship for - Deliver for - Forward to Global Location Number", Numeric, 13),
    fixed("414", "LOC No.", "Identification of a physical location - Global Location Number", Numeric, 13),
    fixed("415", "PAY TO", "Global Location Number of the invoicing party", Numeric, 13),
    fixed("416", "PROD/SERV LOC", "Global Location Number of the production or service location", Numeric, 13),
    fixed("417", "PARTY", "Party Global Location Number", Numeric, 13),
    var("420", "SHIP TO POST", "Ship to - Deliver to postal code within a single postal authority", Alphanumeric, 1, 20),
    var("421", "SHIP TO POST", "Ship to - Deliver to postal code with ISO country code", Alphanumeric, 4, 12),
    var("422", "ORIGIN", "Country of origin of a trade item", Numeric, 3, 3),
    var("423", "COUNTRY - INITIAL PROCESS.", "Country of initial processing", Numeric, 3, 15),
    var("424", "COUNTRY - PROCESS.", "Country of processing", Numeric, 3, 3),
    var("425", "COUNTRY - DISASSEMBLY", "Country of disassembly", Numeric, 3, 15),
    var("426", "COUNTRY - FULL PROCESS", "Country covering full process chain", Numeric, 3, 3),
    var("427", "ORIGIN SUBDIVISION", "Country subdivision of origin", Alphanumeric, 1, 3),
    // Product attributes
    var("7001", "NSN", "NATO Stock Number (NSN)", Numeric, 13, 13),
    var("7002", "MEAT CUT", "UN/ECE meat carcasses and cuts classification", Alphanumeric, 1, 30),
    var("7003", "EXPIRY TIME", "Expiration date and time", DateTime, 10, 10),
    var("7004", "ACTIVE POTENCY", "Active potency", Numeric, 1, 4),
    var("7005", "CATCH AREA", "Catch area", Alphanumeric, 1, 12),
    var("7006", "FIRST FREEZE DATE", "First freeze date", Date, 6, 6),
    var("7007", "HARVEST DATE", "Harvest date (YYMMDD or YYMMDDYYMMDD)", Numeric, 6, 12),
    var("7008", "AQUATIC SPECIES", "Species for fishery purposes", Alphanumeric, 1, 3),
    var("7009", "FISHING GEAR TYPE", "Fishing gear type", Alphanumeric, 1, 10),
    var("7010", "PROD METHOD", "Production method", Alphanumeric, 1, 2),
    var("7020", "REFURB LOT", "Refurbishment lot ID", Alphanumeric, 1, 20),
    var("7021", "FUNC STAT", "Functional status", Alphanumeric, 1, 20),
    var("7022", "REV STAT", "Revision status", Alphanumeric, 1, 20),
    var("7023", "GIAI - ASSEMBLY", "Global Individual Asset Identifier (GIAI) of an assembly", Alphanumeric, 1, 30),
    indexed("703", "PROCESSOR # s", "Number of processor with ISO country code", Alphanumeric, 4, 30),
    var("710", "NHRN PZN", "National Healthcare Reimbursement Number - Germany PZN", Alphanumeric, 1, 20),
    var("711", "NHRN CIP", "National Healthcare Reimbursement Number - France CIP", Alphanumeric, 1, 20),
    var("712", "NHRN CN", "National Healthcare Reimbursement Number - Spain CN", Alphanumeric, 1, 20),
    var("713", "NHRN DRN", "National Healthcare Reimbursement Number - Brasil DRN", Alphanumeric, 1, 20),
    var("714", "NHRN AIM", "National Healthcare Reimbursement Number - Portugal AIM", Alphanumeric, 1, 20),
    // Logistics and services
    var("8001", "DIMENSIONS", "Roll products (width, length, core diameter, direction, splices)", Numeric, 14, 14),
    var("8002", "CMT No.", "Cellular mobile telephone identifier", Alphanumeric, 1, 20),
    var("8003", "GRAI", "Global Returnable Asset Identifier (GRAI)", Alphanumeric, 14, 30),
    var("8004", "GIAI", "Global Individual Asset Identifier (GIAI)", Alphanumeric, 1, 30),
    var("8005", "PRICE PER UNIT", "Price per unit of measure", Numeric, 6, 6),
    var("8006", "ITIP", "Identification of an individual trade item piece (ITIP)", Numeric, 18, 18),
    var("8007", "IBAN", "International Bank Account Number (IBAN)", Alphanumeric, 1, 34),
    var("8008", "PROD TIME", "Date and time of production", DateTime, 8, 12),
    var("8010", "CPID", "Component/Part Identifier (CPID)", Alphanumeric, 1, 30),
    var("8011", "CPID SERIAL", "Component/Part Identifier serial number", Numeric, 1, 12),
    var("8012", "VERSION", "Software version", Alphanumeric, 1, 20),
    var("8013", "GMN", "Global Model Number (GMN)", Alphanumeric, 1, 25),
    var("8017", "GSRN - PROVIDER", "Global Service Relation Number to identify the relationship between an organisation offering services and the provider of services", Numeric, 18, 18),
    var("8018", "GSRN - RECIPIENT", "Global Service Relation Number to identify the relationship between an organisation offering services and the recipient of services", Numeric, 18, 18),
    var("8019", "SRIN", "Service Relation Instance Number (SRIN)", Numeric, 1, 10),
    var("8020", "REF No.", "Payment slip reference number", Alphanumeric, 1, 25),
    var("8026", "ITIP CONTENT", "Identification of pieces of a trade item (ITIP) contained in a logistic unit", Numeric, 18, 18),
    var("8110", "-", "Coupon code identification for use in North America", Alphanumeric, 1, 70),
    var("8111", "POINTS", "Loyalty points of a coupon", Numeric, 4, 4),
    var("8112", "-", "Positive offer file coupon code identification for use in North America", Alphanumeric, 1, 70),
    var("8200", "PRODUCT URL", "Extended Packaging URL", Alphanumeric, 1, 70),
    // Internal
    var("90", "INTERNAL", "Information mutually agreed between trading partners", Alphanumeric, 1, 30),
];

// =============================================================================
// Lookup
// =============================================================================

fn index() -> &'static HashMap<&'static str, &'static AiSpec> {
    static INDEX: OnceLock<HashMap<&'static str, &'static AiSpec>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let index: HashMap<_, _> = AI_TABLE.iter().map(|spec| (spec.code, spec)).collect();
        debug_assert_eq!(index.len(), AI_TABLE.len(), "duplicate AI code");
        debug_assert!(
            first_prefix_collision().is_none(),
            "AI table is not prefix-free: {:?}",
            first_prefix_collision()
        );
        index
    })
}

fn first_prefix_collision() -> Option<(&'static str, &'static str)> {
    AI_TABLE.iter().find_map(|a| {
        AI_TABLE
            .iter()
            .find(|b| b.code.len() > a.code.len() && b.code.starts_with(a.code))
            .map(|b| (a.code, b.code))
    })
}

/// All AI definitions, in table order.
pub fn all() -> &'static [AiSpec] {
    AI_TABLE
}

/// An AI recognized at the start of some input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiMatch<'a> {
    /// Full AI code as it appears in the input (4 digits for indexed AIs).
    pub code: &'a str,
    pub spec: &'static AiSpec,
}

impl AiMatch<'_> {
    /// Decimal places encoded in the fourth digit of measure, amount and
    /// decimal AIs.
    pub fn decimal_places(&self) -> Option<u8> {
        match self.spec.kind {
            FieldKind::Measure
            | FieldKind::Amount
            | FieldKind::AmountWithCurrency
            | FieldKind::Decimal
                if self.spec.indexed =>
            {
                self.code.as_bytes().get(3).map(|d| d - b'0')
            }
            _ => None,
        }
    }
}

/// Matches the AI at the start of `input`, longest code first.
///
/// ```rust
/// use tillscan_core::gs1::ai;
///
/// let found = ai::lookup("3103001086").unwrap();
/// assert_eq!(found.code, "3103");
/// assert_eq!(found.spec.title, "NET WEIGHT (kg)");
/// assert_eq!(found.decimal_places(), Some(3));
///
/// assert!(ai::lookup("99ABC").is_none());
/// ```
pub fn lookup(input: &str) -> Option<AiMatch<'_>> {
    let index = index();

    if let Some(spec) = input.get(..4).and_then(|code| index.get(code)) {
        return Some(AiMatch { code: &input[..4], spec });
    }
    if let Some(spec) = input.get(..3).and_then(|code| index.get(code)) {
        if !spec.indexed {
            return Some(AiMatch { code: &input[..3], spec });
        }
        return match input.as_bytes().get(3) {
            Some(digit) if digit.is_ascii_digit() => Some(AiMatch {
                code: &input[..4],
                spec,
            }),
            _ => None,
        };
    }
    input
        .get(..2)
        .and_then(|code| index.get(code))
        .map(|spec| AiMatch {
            code: &input[..2],
            spec,
        })
}

/// Finds the definition of a complete AI code, e.g. `"3103"` or `"17"`.
pub fn find(ai: &str) -> Option<&'static AiSpec> {
    lookup(ai)
        .filter(|found| found.code.len() == ai.len())
        .map(|found| found.spec)
}

// =============================================================================
// Unit Tests
// =============================================================================
