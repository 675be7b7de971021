//! # Parse Configuration
//!
//! Options that change how payloads are interpreted.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILLSCAN_RCN_REGION=se                                             │
//! │     TILLSCAN_VERIFY_VARIABLE_MEASURE=false                             │
//! │     TILLSCAN_SEPARATOR_CHARS=0x1d,|                                    │
//! │                                                                         │
//! │  2. TOML document (supplied by the embedding application)              │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no RCN region, verifier checks on, <GS> separator, pivot 50        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The library never reads files itself; the application passes the TOML
//! text in.
//!
//! ## Configuration File Format
//! ```toml
//! rcn_region = "se"
//! rcn_verify_variable_measure = true
//! separator_chars = ["\u001d", "|"]
//!
//! [year_expansion]
//! mode = "sliding_window"
//! reference_year = 2025
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::gs1::interpret::YearExpansion;
use crate::rcn::RcnRegion;
use crate::validation::is_cset82;
use crate::GROUP_SEPARATOR;

/// Environment variable overriding [`ParseConfig::rcn_region`].
pub const ENV_RCN_REGION: &str = "TILLSCAN_RCN_REGION";
/// Environment variable overriding [`ParseConfig::rcn_verify_variable_measure`].
pub const ENV_VERIFY_VARIABLE_MEASURE: &str = "TILLSCAN_VERIFY_VARIABLE_MEASURE";
/// Environment variable overriding [`ParseConfig::separator_chars`].
pub const ENV_SEPARATOR_CHARS: &str = "TILLSCAN_SEPARATOR_CHARS";

// =============================================================================
// Parse Config
// =============================================================================

/// Options for parsing scanned payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Region whose RCN rules decode embedded prices and weights.
    /// Without one, RCNs are classified but not decoded.
    #[serde(default)]
    pub rcn_region: Option<RcnRegion>,

    /// Reject RCNs whose price verifier digit does not match.
    /// Default: true
    #[serde(default = "default_true")]
    pub rcn_verify_variable_measure: bool,

    /// Characters that terminate variable-length GS1 fields.
    /// Default: `<GS>` (ASCII 29)
    #[serde(default = "default_separator_chars")]
    pub separator_chars: Vec<char>,

    /// How two-digit years in GS1 dates are expanded.
    #[serde(default)]
    pub year_expansion: YearExpansion,
}

fn default_true() -> bool {
    true
}

fn default_separator_chars() -> Vec<char> {
    vec![GROUP_SEPARATOR]
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            rcn_region: None,
            rcn_verify_variable_measure: default_true(),
            separator_chars: default_separator_chars(),
            year_expansion: YearExpansion::default(),
        }
    }
}

impl ParseConfig {
    /// Sets the RCN region.
    pub fn with_rcn_region(mut self, region: RcnRegion) -> Self {
        self.rcn_region = Some(region);
        self
    }

    /// Replaces the separator characters.
    pub fn with_separator_chars(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separator_chars = separators.into_iter().collect();
        self
    }

    /// Sets the two-digit year expansion rule.
    pub fn with_year_expansion(mut self, year_expansion: YearExpansion) -> Self {
        self.year_expansion = year_expansion;
        self
    }

    /// Returns true if `c` terminates a variable-length field.
    #[inline]
    pub fn is_separator(&self, c: char) -> bool {
        self.separator_chars.contains(&c)
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(document: &str) -> ConfigResult<Self> {
        let config: ParseConfig = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration.
    ///
    /// ## Loading Order
    /// ```text
    /// defaults ──► TOML document (if any) ──► environment ──► validate()
    /// ```
    pub fn load(document: Option<&str>) -> ConfigResult<Self> {
        let mut config = match document {
            Some(document) => {
                debug!("Loading parse config from TOML document");
                toml::from_str(document)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        debug!(
            rcn_region = ?config.rcn_region,
            verify = config.rcn_verify_variable_measure,
            separators = config.separator_chars.len(),
            "Parse config loaded"
        );
        Ok(config)
    }

    /// Like [`ParseConfig::load`], falling back to defaults on error.
    pub fn load_or_default(document: Option<&str>) -> Self {
        Self::load(document).unwrap_or_else(|e| {
            warn!("Failed to load parse config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.separator_chars.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "separator_chars must not be empty".to_string(),
            ));
        }

        // Separators that can also appear in field data would be ambiguous
        if let Some(c) = self.separator_chars.iter().find(|c| is_cset82(**c)) {
            return Err(ConfigError::InvalidConfig(format!(
                "Separator {:?} is a valid GS1 data character",
                c
            )));
        }

        if let YearExpansion::Fixed { pivot } = self.year_expansion {
            if pivot > 99 {
                return Err(ConfigError::InvalidConfig(format!(
                    "Year pivot must be 0-99, got {}",
                    pivot
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in production).
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // RCN region ("none" clears it)
        if let Some(region) = lookup(ENV_RCN_REGION) {
            if region.trim().eq_ignore_ascii_case("none") {
                debug!("Clearing RCN region from environment");
                self.rcn_region = None;
            } else {
                match region.parse::<RcnRegion>() {
                    Ok(parsed) => {
                        debug!(region = %parsed, "Overriding RCN region from environment");
                        self.rcn_region = Some(parsed);
                    }
                    Err(e) => warn!(region = %region, "Ignoring RCN region: {}", e),
                }
            }
        }

        // Verifier digit checks
        if let Some(verify) = lookup(ENV_VERIFY_VARIABLE_MEASURE) {
            match verify.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.rcn_verify_variable_measure = true,
                "0" | "false" | "no" | "off" => self.rcn_verify_variable_measure = false,
                _ => warn!(value = %verify, "Unknown boolean in environment"),
            }
        }

        // Separators: comma-separated characters or 0x-prefixed code points
        if let Some(separators) = lookup(ENV_SEPARATOR_CHARS) {
            match parse_separator_list(&separators) {
                Some(parsed) => {
                    debug!(count = parsed.len(), "Overriding separators from environment");
                    self.separator_chars = parsed;
                }
                None => warn!(value = %separators, "Invalid separator list in environment"),
            }
        }
    }
}

fn parse_separator_list(list: &str) -> Option<Vec<char>> {
    list.split(',')
        .map(|item| {
            if let Some(hex) = item.strip_prefix("0x").or_else(|| item.strip_prefix("0X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else {
                let mut chars = item.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ParseConfig::default();
        assert_eq!(config.rcn_region, None);
        assert!(config.rcn_verify_variable_measure);
        assert_eq!(config.separator_chars, vec!['\x1d']);
        assert_eq!(config.year_expansion, YearExpansion::Fixed { pivot: 50 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = ParseConfig::from_toml_str(
            r#"
            rcn_region = "no"
            rcn_verify_variable_measure = false
            separator_chars = ["\u001d", "|"]

            [year_expansion]
            mode = "sliding_window"
            reference_year = 2025
            "#,
        )
        .unwrap();
        assert_eq!(config.rcn_region, Some(RcnRegion::Norway));
        assert!(!config.rcn_verify_variable_measure);
        assert!(config.is_separator('|'));
        assert_eq!(
            config.year_expansion,
            YearExpansion::SlidingWindow {
                reference_year: 2025
            }
        );
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(ParseConfig::from_toml_str("").unwrap(), ParseConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ParseConfig::from_toml_str("rcn_region = \"xx\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_data_characters_as_separators() {
        let config = ParseConfig::default().with_separator_chars(['A']);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));

        let config = ParseConfig::default().with_separator_chars(['7']);
        assert!(config.validate().is_err());

        let config = ParseConfig::default().with_separator_chars([]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = ParseConfig::default();
        config.apply_overrides(lookup_from(&[
            (ENV_RCN_REGION, "Sweden"),
            (ENV_VERIFY_VARIABLE_MEASURE, "off"),
            (ENV_SEPARATOR_CHARS, "0x1d,|"),
        ]));
        assert_eq!(config.rcn_region, Some(RcnRegion::Sweden));
        assert!(!config.rcn_verify_variable_measure);
        assert_eq!(config.separator_chars, vec!['\x1d', '|']);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = ParseConfig::default().with_rcn_region(RcnRegion::Germany);
        config.apply_overrides(lookup_from(&[
            (ENV_RCN_REGION, "atlantis"),
            (ENV_VERIFY_VARIABLE_MEASURE, "maybe"),
            (ENV_SEPARATOR_CHARS, "ab"),
        ]));
        assert_eq!(config, ParseConfig::default().with_rcn_region(RcnRegion::Germany));

        config.apply_overrides(lookup_from(&[(ENV_RCN_REGION, "none")]));
        assert_eq!(config.rcn_region, None);
    }
}
