// In: src/bridge/format.rs

//! Defines the diagnostic record describing a built key map.
//!
//! A `StrategyReport` answers "which layout did this shape get, and why is it
//! that big?" without exposing the tables themselves. It is the hook for
//! external logging or metrics in place of a process-wide registry.

use serde::{Deserialize, Serialize};

use crate::error::KeyMapError;
use crate::planner::strategy::{Strategy, StrategyTag};

/// The externally visible summary of one key map.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StrategyReport {
    /// Number of keys, which is also the sentinel.
    pub key_count: usize,
    pub strategy: StrategyTag,
    pub min_len: usize,
    pub max_len: usize,

    /// The smallest column discriminating every key, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_column: Option<usize>,

    /// The full layout descriptor, enough to rebuild identical tables.
    pub descriptor: Strategy,

    /// Bytes held by the lookup tables.
    pub table_bytes: usize,
}

impl StrategyReport {
    pub fn to_json(&self) -> Result<String, KeyMapError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, KeyMapError> {
        Ok(serde_json::from_str(json)?)
    }
}
