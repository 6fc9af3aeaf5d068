// In: src/error.rs

//! This module defines the single, unified error type for the perfkey library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant here is a *build-time* failure. Once a `KeyMap` exists, lookups
//! cannot fail: "not found" is the sentinel value `N`, never an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyMapError {
    // =========================================================================
    // === Key Set Preconditions
    // =========================================================================
    #[error("Key set is empty, but a non-empty key set was required")]
    EmptyKeySet,

    #[error("Duplicate key in key set: {0:?}")]
    DuplicateKey(String),

    #[error("Origin index {index} is out of range or repeated for a key set of {count} keys")]
    InvalidOriginIndex { index: usize, count: usize },

    #[error("Key set holds {0} keys, more than the supported maximum of {1}")]
    TooManyKeys(usize, usize),

    #[error("Key {0:?} contains the key delimiter byte {1:#04x}")]
    DelimiterInKey(String, u8),

    // =========================================================================
    // === Layout Construction
    // =========================================================================
    #[error(
        "No collision-free layout found for {key_count} keys after exhausting table sizes up to {max_table_size}"
    )]
    TableExhausted {
        key_count: usize,
        max_table_size: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error from the Serde JSON library, typically while loading a config or
    /// rendering a strategy report.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// Renders a key for error messages without assuming it is valid UTF-8.
pub(crate) fn display_key(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
