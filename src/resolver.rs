// In: src/resolver.rs

//! The resolver: the one operation the parser calls per object key.
//!
//! `resolve` maps the bytes at the start of a key to a candidate origin index,
//! or to the sentinel `N` when no key can match. It only ever nominates a
//! candidate. The caller must compare the input against `keys[candidate]` before
//! trusting it, because inputs outside the key set can land on a valid index.
//!
//! A resolver holds immutable tables and never allocates, so one instance can be
//! shared by any number of threads without synchronization.

use crate::error::KeyMapError;
use crate::kernels::group::first_match;
use crate::kernels::scan::LengthWindow;
use crate::planner::builder::{build_tables, byte_length_slot, triple_slot, Tables, NO_COLUMN};
use crate::planner::stats::KeyStats;
use crate::planner::strategy::{Strategy, StrategyTag};

/// A lookup specialized to one layout.
///
/// The layout is fixed at build time, but `resolve` still selects its branch by
/// matching on the stored `Tables` on every call. For a lookup with no layout
/// branch at all, render the map with `bridge::codegen::emit` and compile the
/// generated `{name}_resolve` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    sentinel: usize,
    window: LengthWindow,
    tables: Tables,
}

impl Resolver {
    /// Builds the tables for `strategy` and wraps them.
    pub fn build(
        keys: &[&[u8]],
        stats: &KeyStats,
        strategy: &Strategy,
        delimiter: u8,
    ) -> Result<Self, KeyMapError> {
        let tables = build_tables(keys, strategy)?;
        Ok(Self {
            sentinel: keys.len(),
            window: LengthWindow::new(stats.min_len, stats.max_len, delimiter),
            tables,
        })
    }

    /// The "not found" value, `N`.
    #[inline]
    pub fn sentinel(&self) -> usize {
        self.sentinel
    }

    pub fn window(&self) -> LengthWindow {
        self.window
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn tag(&self) -> StrategyTag {
        match &self.tables {
            Tables::Empty => StrategyTag::Empty,
            Tables::SingleElement => StrategyTag::SingleElement,
            Tables::DoubleElement(_) => StrategyTag::DoubleElement,
            Tables::TripleElement(_) => StrategyTag::TripleElement,
            Tables::SingleByte(_) => StrategyTag::SingleByte,
            Tables::FirstByteAndUniqueIndex(_) => StrategyTag::FirstByteAndUniqueIndex,
            Tables::UniqueByteAndLength(_) => StrategyTag::UniqueByteAndLength,
            Tables::UniquePerLength(_) => StrategyTag::UniquePerLength,
            Tables::SimdFullLength(_) => StrategyTag::SimdFullLength,
        }
    }

    /// Resolves a key that starts at `input[0]`.
    ///
    /// `input` may run past the key end (the delimiter and whatever follows), but
    /// nothing beyond `input.len()` is ever read. Returns a candidate in `[0, N)`
    /// or the sentinel `N`.
    #[inline]
    pub fn resolve(&self, input: &[u8]) -> usize {
        let miss = self.sentinel;
        match &self.tables {
            Tables::Empty => miss,
            Tables::SingleElement => 0,
            Tables::DoubleElement(table) => match input.get(table.column) {
                Some(&byte) => {
                    let candidate = (byte & 1) as usize;
                    if byte == table.expected[candidate] {
                        candidate
                    } else {
                        miss
                    }
                }
                None => miss,
            },
            Tables::TripleElement(table) => match input.get(table.column) {
                Some(&byte) => table.slots[triple_slot(byte, table.first_char, table.seed)] as usize,
                None => miss,
            },
            Tables::SingleByte(table) => match input.get(table.column) {
                Some(&byte) => table.slots[byte as usize] as usize,
                None => miss,
            },
            Tables::FirstByteAndUniqueIndex(table) => {
                let Some(&first) = input.first() else {
                    return miss;
                };
                let column = table.columns[first as usize];
                if column == NO_COLUMN {
                    return miss;
                }
                match input.get(column as usize) {
                    Some(&byte) => table.slots[((first as usize) << 8) | byte as usize] as usize,
                    None => miss,
                }
            }
            Tables::UniqueByteAndLength(table) => {
                let Some(len) = self.window.key_len(input) else {
                    return miss;
                };
                match input.get(table.column) {
                    Some(&byte) => table.slots[byte_length_slot(byte, len)] as usize,
                    None => miss,
                }
            }
            Tables::UniquePerLength(table) => {
                let Some(len) = self.window.key_len(input) else {
                    return miss;
                };
                let column = table.columns[len];
                if column == NO_COLUMN {
                    return miss;
                }
                match input.get(column as usize) {
                    Some(&byte) => table.slots[(len << 8) | byte as usize] as usize,
                    None => miss,
                }
            }
            Tables::SimdFullLength(table) => {
                let Some(len) = self.window.key_len(input) else {
                    return miss;
                };
                let hash = table.hasher.hash_prefix(input, len.min(table.prefix_len));
                let (group, fingerprint) = table.locate(hash);
                let base = group * table.bucket_width;
                match first_match(&table.control[base..base + table.bucket_width], fingerprint) {
                    Some(lane) => table.slots[base + lane] as usize,
                    None => miss,
                }
            }
        }
    }

    /// Resolves with an explicit bound: only `input[..available]` is visible.
    #[inline]
    pub fn resolve_bounded(&self, input: &[u8], available: usize) -> usize {
        self.resolve(&input[..available.min(input.len())])
    }
}
