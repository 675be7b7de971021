//! # Restricted Circulation Numbers
//!
//! GTINs in reserved prefix ranges are only unique within one company or
//! one geographical region. Stores use them for in-store items, most often
//! weighed goods whose label embeds the price or weight.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Format    Leading digits (13-digit form)    Usage                     │
//! │  ───────   ──────────────────────────────    ─────────────────────      │
//! │  GTIN-8    0, 2                              Company                   │
//! │  GTIN-12/13  02, 20-29                       Geographical              │
//! │  GTIN-12/13  04                              Company                   │
//! │  GTIN-14   packaging level 1-9               never an RCN              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Variable Measure Layout
//! ```text
//!   Sweden "20":   2 0 1 2 3 4 5 0 1 2 5 0 9
//!                  └┬┘ └───┬───┘ └───┬───┘ └ check
//!                prefix   item     price 12.50 SEK
//!
//!   Germany "28":  2 8 1 2 3 4 5 9 1 0 8 6 3
//!                  └┬┘ └───┬───┘ │ └──┬──┘ └ check
//!                prefix   item   │  weight 1.086 kg
//!                                └ price verifier digit
//! ```
//!
//! The regional rules only apply when a region is configured: the same
//! GTIN means different things in different countries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::{debug, trace};
use ts_rs::TS;

use crate::checksum::{gs1_check_digit_unchecked, price_check_digit};
use crate::config::ParseConfig;
use crate::error::{ConfigError, ParseError, ParseResult};
use crate::gs1::interpret;
use crate::gtin::{Gtin, GtinFormat};
use crate::types::{CurrencyCode, MonetaryAmount, ScaledDecimal};

// =============================================================================
// Usage and Region
// =============================================================================

/// Who defines the meaning of an RCN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RcnUsage {
    /// Only meaningful inside the issuing company.
    Company,
    /// Defined by the GS1 member organisation of a region.
    Geographical,
}

/// Regions with known variable-measure rules.
///
/// Serialized as the lowercase ISO 3166-1 alpha-2 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RcnRegion {
    #[serde(rename = "dk")]
    Denmark,
    #[serde(rename = "ee")]
    Estonia,
    #[serde(rename = "fi")]
    Finland,
    #[serde(rename = "de")]
    Germany,
    #[serde(rename = "gb")]
    GreatBritain,
    #[serde(rename = "lv")]
    Latvia,
    #[serde(rename = "lt")]
    Lithuania,
    #[serde(rename = "no")]
    Norway,
    #[serde(rename = "se")]
    Sweden,
}

impl RcnRegion {
    /// Every supported region.
    pub const ALL: [RcnRegion; 9] = [
        RcnRegion::Denmark,
        RcnRegion::Estonia,
        RcnRegion::Finland,
        RcnRegion::Germany,
        RcnRegion::GreatBritain,
        RcnRegion::Latvia,
        RcnRegion::Lithuania,
        RcnRegion::Norway,
        RcnRegion::Sweden,
    ];

    /// Lowercase ISO 3166-1 alpha-2 code.
    pub const fn code(&self) -> &'static str {
        match self {
            RcnRegion::Denmark => "dk",
            RcnRegion::Estonia => "ee",
            RcnRegion::Finland => "fi",
            RcnRegion::Germany => "de",
            RcnRegion::GreatBritain => "gb",
            RcnRegion::Latvia => "lv",
            RcnRegion::Lithuania => "lt",
            RcnRegion::Norway => "no",
            RcnRegion::Sweden => "se",
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            RcnRegion::Denmark => "denmark",
            RcnRegion::Estonia => "estonia",
            RcnRegion::Finland => "finland",
            RcnRegion::Germany => "germany",
            RcnRegion::GreatBritain => "great_britain",
            RcnRegion::Latvia => "latvia",
            RcnRegion::Lithuania => "lithuania",
            RcnRegion::Norway => "norway",
            RcnRegion::Sweden => "sweden",
        }
    }

    const fn iso_3166_1_numeric_code(&self) -> &'static str {
        match self {
            RcnRegion::Denmark => "208",
            RcnRegion::Estonia => "233",
            RcnRegion::Finland => "246",
            RcnRegion::Germany => "276",
            RcnRegion::GreatBritain => "826",
            RcnRegion::Latvia => "428",
            RcnRegion::Lithuania => "440",
            RcnRegion::Norway => "578",
            RcnRegion::Sweden => "752",
        }
    }

    /// Looks up a region by ISO 3166-1 numeric code, e.g. `"752"`.
    pub fn from_iso_3166_1_numeric_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|region| region.iso_3166_1_numeric_code() == code)
    }

    /// Currency of prices embedded in this region's RCNs.
    pub fn currency(&self) -> CurrencyCode {
        CurrencyCode::new(match self {
            RcnRegion::Denmark => "DKK",
            RcnRegion::Estonia
            | RcnRegion::Finland
            | RcnRegion::Germany
            | RcnRegion::Latvia
            | RcnRegion::Lithuania => "EUR",
            RcnRegion::GreatBritain => "GBP",
            RcnRegion::Norway => "NOK",
            RcnRegion::Sweden => "SEK",
        })
    }
}

impl fmt::Display for RcnRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RcnRegion {
    type Err = ConfigError;

    /// Accepts the alpha-2 code or the English name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|region| region.code() == needle || region.name() == needle)
            .ok_or_else(|| {
                ConfigError::InvalidConfig(format!(
                    "Unknown RCN region '{}', expected one of: dk, ee, fi, de, gb, lv, lt, no, se",
                    s
                ))
            })
    }
}

// =============================================================================
// Variable Measure
// =============================================================================

/// A weight or price embedded in a geographical RCN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VariableMeasure {
    Weight { kilograms: ScaledDecimal },
    Price(MonetaryAmount),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeasureKind {
    Weight,
    Price,
}

/// One regional rule, keyed by the first two digits of the 13-digit form.
struct MeasureRule {
    prefix: &'static str,
    kind: MeasureKind,
    value: Range<usize>,
    decimals: u8,
    verifier: Option<usize>,
}

const fn rule(
    prefix: &'static str,
    kind: MeasureKind,
    value: Range<usize>,
    decimals: u8,
    verifier: Option<usize>,
) -> MeasureRule {
    MeasureRule {
        prefix,
        kind,
        value,
        decimals,
        verifier,
    }
}

const NORDIC_RULES: &[MeasureRule] = &[
    rule("20", MeasureKind::Price, 7..12, 2, None),
    rule("23", MeasureKind::Weight, 7..12, 3, None),
    rule("24", MeasureKind::Price, 7..12, 1, None),
    rule("25", MeasureKind::Price, 7..12, 2, None),
];

const BALTIC_RULES: &[MeasureRule] = &[
    rule("23", MeasureKind::Weight, 7..12, 3, None),
    rule("24", MeasureKind::Price, 7..12, 2, None),
];

const GERMAN_RULES: &[MeasureRule] = &[
    rule("21", MeasureKind::Price, 8..12, 2, Some(7)),
    rule("22", MeasureKind::Price, 8..12, 2, Some(7)),
    rule("28", MeasureKind::Weight, 8..12, 3, Some(7)),
    rule("29", MeasureKind::Weight, 8..12, 3, Some(7)),
];

const BRITISH_RULES: &[MeasureRule] = &[rule("20", MeasureKind::Price, 8..12, 2, Some(7))];

fn rules_for(region: RcnRegion) -> &'static [MeasureRule] {
    match region {
        RcnRegion::Denmark | RcnRegion::Finland | RcnRegion::Norway | RcnRegion::Sweden => {
            NORDIC_RULES
        }
        RcnRegion::Estonia | RcnRegion::Latvia | RcnRegion::Lithuania => BALTIC_RULES,
        RcnRegion::Germany => GERMAN_RULES,
        RcnRegion::GreatBritain => BRITISH_RULES,
    }
}

fn find_rule(region: RcnRegion, gtin13: &str) -> Option<&'static MeasureRule> {
    rules_for(region)
        .iter()
        .find(|rule| gtin13.starts_with(rule.prefix))
}

// =============================================================================
// RCN
// =============================================================================

/// Restricted circulation details of a GTIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rcn {
    usage: RcnUsage,
    region: Option<RcnRegion>,
    measure: Option<VariableMeasure>,
}

impl Rcn {
    pub fn usage(&self) -> RcnUsage {
        self.usage
    }

    /// Region whose rules were applied; `None` for company RCNs and when no
    /// region was configured.
    pub fn region(&self) -> Option<RcnRegion> {
        self.region
    }

    pub fn measure(&self) -> Option<&VariableMeasure> {
        self.measure.as_ref()
    }

    /// The embedded weight in kilograms, if any.
    pub fn weight(&self) -> Option<&ScaledDecimal> {
        match &self.measure {
            Some(VariableMeasure::Weight { kilograms }) => Some(kilograms),
            _ => None,
        }
    }

    /// The embedded price, if any.
    pub fn price(&self) -> Option<&MonetaryAmount> {
        match &self.measure {
            Some(VariableMeasure::Price(amount)) => Some(amount),
            _ => None,
        }
    }

    /// RCNs are never globally unique. Do not use them as keys in data
    /// shared across organisations.
    pub fn is_globally_unique(&self) -> bool {
        false
    }

    /// Returns `gtin` with the variable measure (and verifier) digits zeroed
    /// and the check digit recomputed.
    ///
    /// The result identifies the item regardless of the weighed amount, so
    /// it can be used as a product lookup key. Returns a clone when no rule
    /// applies.
    ///
    /// ```rust
    /// use tillscan_core::config::ParseConfig;
    /// use tillscan_core::gtin::Gtin;
    /// use tillscan_core::rcn::RcnRegion;
    ///
    /// let config = ParseConfig::default().with_rcn_region(RcnRegion::Sweden);
    /// let gtin = Gtin::parse_with("2012345012509", &config).unwrap();
    /// let item = gtin.rcn().unwrap().without_variable_measure(&gtin);
    /// assert_eq!(item.value(), "2012345000001");
    /// ```
    pub fn without_variable_measure(&self, gtin: &Gtin) -> Gtin {
        let (Some(region), Some(gtin13)) = (self.region, gtin.as_gtin_13()) else {
            return gtin.clone();
        };
        let Some(rule) = find_rule(region, gtin13) else {
            return gtin.clone();
        };

        let mut digits = gtin13.as_bytes()[..12].to_vec();
        for position in rule.value.clone().chain(rule.verifier) {
            digits[position] = b'0';
        }
        digits.push(gs1_check_digit_unchecked(&digits) as u8);
        let zeroed: String = digits.into_iter().map(char::from).collect();
        let zeroed = match gtin.format() {
            GtinFormat::Gtin12 => zeroed[1..].to_string(),
            _ => zeroed,
        };

        let config = ParseConfig::default().with_rcn_region(region);
        Gtin::parse_with(&zeroed, &config).unwrap_or_else(|_| gtin.clone())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Determines the RCN usage from the GTIN's leading digits.
///
/// GTIN-14s with packaging level 0 (as found in AI 01) are classified by
/// their 13-digit form.
pub fn usage_for(gtin: &Gtin) -> Option<RcnUsage> {
    match gtin.format() {
        GtinFormat::Gtin8 => match gtin.value().as_bytes()[0] {
            b'0' | b'2' => Some(RcnUsage::Company),
            _ => None,
        },
        // A GTIN-14 with packaging level 1-9 is a case of trade items,
        // never an RCN; level 0 is read through its 13-digit form
        GtinFormat::Gtin12 | GtinFormat::Gtin13 | GtinFormat::Gtin14 => {
            let gtin13 = gtin.as_gtin_13()?;
            match &gtin13[..2] {
                "02" => Some(RcnUsage::Geographical),
                "04" => Some(RcnUsage::Company),
                leading if leading.starts_with('2') => Some(RcnUsage::Geographical),
                _ => None,
            }
        }
    }
}

/// Classifies `gtin` and decodes its variable measure with the regional
/// rules selected by `config`.
///
/// Returns `Ok(None)` for GTINs outside the RCN ranges. Fails with
/// [`ParseError::ChecksumMismatch`] when the rule carries a price verifier
/// digit, verification is enabled, and the digit is wrong.
pub fn classify(gtin: &Gtin, config: &ParseConfig) -> ParseResult<Option<Rcn>> {
    let Some(usage) = usage_for(gtin) else {
        return Ok(None);
    };
    let region = match usage {
        RcnUsage::Geographical => config.rcn_region,
        RcnUsage::Company => None,
    };
    let measure = match region {
        Some(region) => decode_measure(gtin, region, config.rcn_verify_variable_measure)?,
        None => None,
    };
    trace!(gtin = %gtin, ?usage, ?region, "Classified RCN");
    Ok(Some(Rcn {
        usage,
        region,
        measure,
    }))
}

fn decode_measure(
    gtin: &Gtin,
    region: RcnRegion,
    verify: bool,
) -> ParseResult<Option<VariableMeasure>> {
    let Some(gtin13) = gtin.as_gtin_13() else {
        return Ok(None);
    };
    let Some(rule) = find_rule(region, gtin13) else {
        return Ok(None);
    };
    let field = &gtin13[rule.value.clone()];

    if let (Some(position), true) = (rule.verifier, verify) {
        let expected = price_check_digit(field)?;
        let found = char::from(gtin13.as_bytes()[position]);
        if expected != found {
            debug!(gtin = %gtin, %region, %expected, %found, "RCN price verifier mismatch");
            return Err(ParseError::ChecksumMismatch {
                value: gtin13.to_string(),
                expected,
                found,
            });
        }
    }

    let value = interpret::decimal(field, rule.decimals).map_err(|source| {
        ParseError::FieldValueInvalid {
            ai: rule.prefix.to_string(),
            offset: rule.value.start,
            value: field.to_string(),
            source,
        }
    })?;
    Ok(Some(match rule.kind {
        MeasureKind::Weight => VariableMeasure::Weight { kilograms: value },
        MeasureKind::Price => VariableMeasure::Price(MonetaryAmount {
            currency: Some(region.currency()),
            amount: value,
        }),
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
