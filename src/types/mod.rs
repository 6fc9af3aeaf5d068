//! This module defines the core, strongly-typed data representations consumed by
//! the planner.
//!
//! It currently includes `Key` and `KeySet`, which carry the build-time
//! preconditions (unique keys, origin indices forming a permutation), and the
//! `FieldKeys` trait through which a reflection layer hands over a shape's field
//! names.

pub mod key;

// Re-export the main type(s) for easier access.
pub use key::{FieldKeys, Key, KeySet};
