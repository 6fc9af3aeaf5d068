// In: src/config.rs

//! The single source of truth for key-map construction settings.
//!
//! `KeyMapConfig` is created once at the application boundary (in code, or from a
//! JSON document) and passed by reference into every build. Nothing in it affects
//! lookups directly: it only steers which layout the planner is allowed to pick and
//! how hard it searches for one.

use serde::{Deserialize, Serialize};

use crate::error::KeyMapError;
use crate::kernels::group::NativeGroup;
use crate::kernels::group::GroupMatch;
use crate::planner::strategy::StrategyTag;

//==================================================================================
// 0. Constants
//==================================================================================
/// The largest table the SIMD fallback may escalate to.
pub const MAX_TABLE_SIZE: usize = 2048;
/// The smallest table in the SIMD escalation progression.
pub const MIN_TABLE_SIZE: usize = 16;

//==================================================================================
// I. The Unified KeyMapConfig
//==================================================================================

/// Construction settings for a `KeyMap`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct KeyMapConfig {
    /// The byte that terminates a key in the source buffer. Length-dependent
    /// layouts scan for it to recover the key length.
    #[serde(default = "default_delimiter")]
    pub delimiter: u8,

    /// How many seeds the SIMD fallback tries for each candidate prefix length
    /// before moving on.
    #[serde(default = "default_trials_per_prefix")]
    pub trials_per_prefix: usize,

    /// The largest table size the SIMD fallback may escalate to. Must be a power
    /// of two in `[16, 2048]`.
    #[serde(default = "default_max_table_size")]
    pub max_table_size: usize,

    /// Overrides the bucket width of the SIMD fallback. `None` uses the widest
    /// group compiled into this build.
    #[serde(default)]
    pub bucket_width: Option<usize>,

    /// Reseeds the deterministic seed sequence. `None` keeps the fixed default
    /// state, so the same key set always produces the same tables.
    #[serde(default)]
    pub prng_seed: Option<u64>,

    /// Optional cascade steps to leave out. Mostly useful for diagnostics and for
    /// exercising a specific layout in tests.
    #[serde(default)]
    pub skip_strategies: Vec<StrategyTag>,

    /// If true, an empty key set is rejected instead of producing the `Empty` layout.
    #[serde(default)]
    pub require_non_empty: bool,
}

impl Default for KeyMapConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            trials_per_prefix: default_trials_per_prefix(),
            max_table_size: default_max_table_size(),
            bucket_width: None,
            prng_seed: None,
            skip_strategies: Vec::new(),
            require_non_empty: false,
        }
    }
}

impl KeyMapConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, KeyMapError> {
        let config: KeyMapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field constraint. Builds call this before doing any work.
    pub fn validate(&self) -> Result<(), KeyMapError> {
        if self.trials_per_prefix == 0 {
            return Err(KeyMapError::InvalidConfig(
                "trials_per_prefix must be at least 1".to_string(),
            ));
        }
        if !self.max_table_size.is_power_of_two()
            || !(MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&self.max_table_size)
        {
            return Err(KeyMapError::InvalidConfig(format!(
                "max_table_size must be a power of two in [{}, {}], got {}",
                MIN_TABLE_SIZE, MAX_TABLE_SIZE, self.max_table_size
            )));
        }
        if let Some(width) = self.bucket_width {
            if !matches!(width, 8 | 16 | 32 | 64) {
                return Err(KeyMapError::InvalidConfig(format!(
                    "bucket_width must be one of 8, 16, 32 or 64, got {}",
                    width
                )));
            }
            if width > self.max_table_size {
                return Err(KeyMapError::InvalidConfig(format!(
                    "bucket_width {} exceeds max_table_size {}",
                    width, self.max_table_size
                )));
            }
        }
        if let Some(tag) = self
            .skip_strategies
            .iter()
            .find(|tag| !tag.is_optional())
        {
            return Err(KeyMapError::InvalidConfig(format!(
                "strategy {:?} cannot be skipped",
                tag
            )));
        }
        Ok(())
    }

    /// The bucket width the SIMD fallback will use under this config.
    pub fn effective_bucket_width(&self) -> usize {
        self.bucket_width.unwrap_or(NativeGroup::WIDTH)
    }

    pub(crate) fn allows(&self, tag: StrategyTag) -> bool {
        !self.skip_strategies.contains(&tag)
    }
}

/// Provides the JSON string delimiter as the default key terminator.
fn default_delimiter() -> u8 {
    b'"'
}

fn default_trials_per_prefix() -> usize {
    2
}

fn default_max_table_size() -> usize {
    MAX_TABLE_SIZE
}

//==================================================================================
// II. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = KeyMapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delimiter, b'"');
        assert_eq!(config.max_table_size, 2048);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            KeyMapConfig::from_json_str(r#"{"trials_per_prefix": 4, "prng_seed": 99}"#).unwrap();
        assert_eq!(config.trials_per_prefix, 4);
        assert_eq!(config.prng_seed, Some(99));
        assert_eq!(config.delimiter, b'"');
        assert!(config.skip_strategies.is_empty());
    }

    #[test]
    fn test_from_json_parses_skip_list() {
        let config = KeyMapConfig::from_json_str(
            r#"{"skip_strategies": ["single_byte", "first_byte_and_unique_index"]}"#,
        )
        .unwrap();
        assert!(!config.allows(StrategyTag::SingleByte));
        assert!(!config.allows(StrategyTag::FirstByteAndUniqueIndex));
        assert!(config.allows(StrategyTag::UniquePerLength));
    }

    #[test]
    fn test_rejects_mandatory_skip() {
        let config = KeyMapConfig {
            skip_strategies: vec![StrategyTag::SimdFullLength],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(KeyMapError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_table_size() {
        let config = KeyMapConfig {
            max_table_size: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = KeyMapConfig {
            max_table_size: 4096,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_bucket_width() {
        let config = KeyMapConfig {
            bucket_width: Some(12),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_serde_error() {
        let result = KeyMapConfig::from_json_str("{not json");
        assert!(matches!(result, Err(KeyMapError::SerdeJson(_))));
    }
}
