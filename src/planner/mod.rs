//! This module is the build phase: everything that runs once per key set, before
//! any input is read.
//!
//! `stats` summarizes the key set, `selector` runs the strategy cascade over it,
//! and `builder` materializes the tables of the chosen layout. The output is a
//! `Strategy` descriptor plus its `Tables`, both immutable from then on.

pub mod builder;
pub mod selector;
pub mod stats;
pub mod strategy;

#[cfg(test)]
mod selector_tests;

pub use builder::{build_tables, Tables};
pub use selector::select_strategy;
pub use stats::KeyStats;
pub use strategy::{Strategy, StrategyTag};
