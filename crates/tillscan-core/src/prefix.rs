//! # GS1 Prefix Lookup
//!
//! Maps the leading digits of a GS1 key to the organisation (or reserved
//! usage) that allocated it.
//!
//! ## What a prefix tells you
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  590 1234 12345 7                                                       │
//! │  ───                                                                    │
//! │   │                                                                     │
//! │   └── GS1 Poland issued the company prefix.                             │
//! │       It does NOT mean the product was made in Poland.                  │
//! │                                                                         │
//! │  Reserved ranges change how the rest of the number is read:            │
//! │    020-029, 040-049, 200-299  Restricted circulation (RCN)              │
//! │    977                        Serial publications (ISSN)                │
//! │    978-979                    Bookland (ISBN)                           │
//! │    980                        Refund receipts                           │
//! │    981-984, 990-999           Coupons                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Allocations by three-digit prefix of the 13-digit form, inclusive ranges.
const PREFIX_RANGES: &[(u16, u16, &str)] = &[
    (0, 19, "GS1 US"),
    (20, 29, "Restricted distribution (MO defined)"),
    (30, 39, "GS1 US"),
    (40, 49, "Restricted distribution (MO defined)"),
    (50, 59, "GS1 US reserved for future use"),
    (60, 139, "GS1 US"),
    (200, 299, "Restricted distribution (MO defined)"),
    (300, 379, "GS1 France"),
    (380, 380, "GS1 Bulgaria"),
    (383, 383, "GS1 Slovenija"),
    (385, 385, "GS1 Croatia"),
    (387, 387, "GS1 BIH (Bosnia-Herzegovina)"),
    (389, 389, "GS1 Montenegro"),
    (400, 440, "GS1 Germany"),
    (450, 459, "GS1 Japan"),
    (460, 469, "GS1 Russia"),
    (470, 470, "GS1 Kyrgyzstan"),
    (471, 471, "GS1 Chinese Taipei"),
    (474, 474, "GS1 Estonia"),
    (475, 475, "GS1 Latvia"),
    (476, 476, "GS1 Azerbaijan"),
    (477, 477, "GS1 Lithuania"),
    (478, 478, "GS1 Uzbekistan"),
    (479, 479, "GS1 Sri Lanka"),
    (480, 480, "GS1 Philippines"),
    (481, 481, "GS1 Belarus"),
    (482, 482, "GS1 Ukraine"),
    (483, 483, "GS1 Turkmenistan"),
    (484, 484, "GS1 Moldova"),
    (485, 485, "GS1 Armenia"),
    (486, 486, "GS1 Georgia"),
    (487, 487, "GS1 Kazakstan"),
    (488, 488, "GS1 Tajikistan"),
    (489, 489, "GS1 Hong Kong, China"),
    (490, 499, "GS1 Japan"),
    (500, 509, "GS1 UK"),
    (520, 521, "GS1 Association Greece"),
    (528, 528, "GS1 Lebanon"),
    (529, 529, "GS1 Cyprus"),
    (530, 530, "GS1 Albania"),
    (531, 531, "GS1 North Macedonia"),
    (535, 535, "GS1 Malta"),
    (539, 539, "GS1 Ireland"),
    (540, 549, "GS1 Belgium & Luxembourg"),
    (560, 560, "GS1 Portugal"),
    (569, 569, "GS1 Iceland"),
    (570, 579, "GS1 Denmark"),
    (590, 590, "GS1 Poland"),
    (594, 594, "GS1 Romania"),
    (599, 599, "GS1 Hungary"),
    (600, 601, "GS1 South Africa"),
    (603, 603, "GS1 Ghana"),
    (604, 604, "GS1 Senegal"),
    (608, 608, "GS1 Bahrain"),
    (609, 609, "GS1 Mauritius"),
    (611, 611, "GS1 Morocco"),
    (613, 613, "GS1 Algeria"),
    (615, 615, "GS1 Nigeria"),
    (616, 616, "GS1 Kenya"),
    (618, 618, "GS1 Ivory Coast"),
    (619, 619, "GS1 Tunisia"),
    (620, 620, "GS1 Tanzania"),
    (621, 621, "GS1 Syria"),
    (622, 622, "GS1 Egypt"),
    (624, 624, "GS1 Libya"),
    (625, 625, "GS1 Jordan"),
    (626, 626, "GS1 Iran"),
    (627, 627, "GS1 Kuwait"),
    (628, 628, "GS1 Saudi Arabia"),
    (629, 629, "GS1 Emirates"),
    (640, 649, "GS1 Finland"),
    (690, 699, "GS1 China"),
    (700, 709, "GS1 Norway"),
    (729, 729, "GS1 Israel"),
    (730, 739, "GS1 Sweden"),
    (740, 740, "GS1 Guatemala"),
    (741, 741, "GS1 El Salvador"),
    (742, 742, "GS1 Honduras"),
    (743, 743, "GS1 Nicaragua"),
    (744, 744, "GS1 Costa Rica"),
    (745, 745, "GS1 Panama"),
    (746, 746, "GS1 Republica Dominicana"),
    (750, 750, "GS1 Mexico"),
    (754, 755, "GS1 Canada"),
    (759, 759, "GS1 Venezuela"),
    (760, 769, "GS1 Switzerland"),
    (770, 771, "GS1 Colombia"),
    (773, 773, "GS1 Uruguay"),
    (775, 775, "GS1 Peru"),
    (777, 777, "GS1 Bolivia"),
    (778, 779, "GS1 Argentina"),
    (780, 780, "GS1 Chile"),
    (784, 784, "GS1 Paraguay"),
    (786, 786, "GS1 Ecuador"),
    (789, 790, "GS1 Brasil"),
    (800, 839, "GS1 Italy"),
    (840, 849, "GS1 Spain"),
    (850, 850, "GS1 Cuba"),
    (858, 858, "GS1 Slovakia"),
    (859, 859, "GS1 Czech"),
    (860, 860, "GS1 Serbia"),
    (865, 865, "GS1 Mongolia"),
    (867, 867, "GS1 North Korea"),
    (868, 869, "GS1 Turkey"),
    (870, 879, "GS1 Netherlands"),
    (880, 880, "GS1 Korea"),
    (884, 884, "GS1 Cambodia"),
    (885, 885, "GS1 Thailand"),
    (888, 888, "GS1 Singapore"),
    (890, 890, "GS1 India"),
    (893, 893, "GS1 Vietnam"),
    (896, 896, "GS1 Pakistan"),
    (899, 899, "GS1 Indonesia"),
    (900, 919, "GS1 Austria"),
    (930, 939, "GS1 Australia"),
    (940, 949, "GS1 New Zealand"),
    (950, 950, "GS1 Global Office"),
    (951, 951, "Global Office - General Manager Number for EPC Tag Data Standard"),
    (955, 955, "GS1 Malaysia"),
    (958, 958, "GS1 Macau, China"),
    (960, 969, "Global Office - GTIN-8 allocations"),
    (977, 977, "Serial publications (ISSN)"),
    (978, 979, "Bookland (ISBN)"),
    (980, 980, "Refund receipts"),
    (981, 984, "GS1 coupon identification for common currency areas"),
    (990, 999, "GS1 coupon identification"),
];

/// Usage string for GTIN-8 restricted circulation numbers.
const RCN8_USAGE: &str = "Restricted circulation number within a company (RCN-8)";

/// The GS1 prefix of an identification key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Gs1Prefix {
    /// The three prefix digits.
    pub value: String,
    /// Who allocated the prefix, or what the range is reserved for.
    pub usage: String,
}

impl Gs1Prefix {
    /// Looks up the prefix of a key in 13-digit form (GTIN-12/13, or a
    /// GTIN-14/SSCC without its leading indicator/extension digit).
    ///
    /// ```rust
    /// use tillscan_core::prefix::Gs1Prefix;
    ///
    /// let prefix = Gs1Prefix::lookup("5901234123457").unwrap();
    /// assert_eq!(prefix.value, "590");
    /// assert_eq!(prefix.usage, "GS1 Poland");
    /// ```
    pub fn lookup(digits: &str) -> Option<Self> {
        let value = digits.get(..3)?;
        let number: u16 = value.parse().ok()?;
        PREFIX_RANGES
            .iter()
            .find(|(start, end, _)| (*start..=*end).contains(&number))
            .map(|(_, _, usage)| Gs1Prefix {
                value: value.to_string(),
                usage: usage.to_string(),
            })
    }

    /// Looks up the prefix of a GTIN-8.
    ///
    /// GTIN-8s starting with `0` or `2` are company-internal restricted
    /// circulation numbers; the rest share the GTIN-13 prefix ranges.
    pub fn lookup_gtin8(gtin8: &str) -> Option<Self> {
        match gtin8.as_bytes().first() {
            Some(b'0') | Some(b'2') => Some(Gs1Prefix {
                value: gtin8.get(..1)?.to_string(),
                usage: RCN8_USAGE.to_string(),
            }),
            Some(_) => Self::lookup(gtin8),
            None => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
