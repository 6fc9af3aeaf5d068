// In: src/bridge/key_map.rs

//! `KeyMap`: the public face of one shape's key resolution.
//!
//! It owns the key set (needed for the mandatory verification), the chosen
//! strategy, and the resolver. `resolve` is the raw candidate lookup; `find` and
//! `find_in_buffer` add the exact comparison and are what a parser should call
//! unless it verifies candidates itself.

use crate::bridge::format::StrategyReport;
use crate::config::KeyMapConfig;
use crate::error::KeyMapError;
use crate::planner::selector::select_strategy;
use crate::planner::stats::KeyStats;
use crate::planner::strategy::Strategy;
use crate::resolver::Resolver;
use crate::types::{FieldKeys, KeySet};

/// A built, immutable key-to-index map for one fixed key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    keys: KeySet,
    stats: KeyStats,
    strategy: Strategy,
    resolver: Resolver,
    delimiter: u8,
}

impl KeyMap {
    /// Runs the whole build phase: precondition checks, statistics, the strategy
    /// cascade and table construction.
    pub fn build(keys: KeySet, config: &KeyMapConfig) -> Result<Self, KeyMapError> {
        config.validate()?;
        if config.require_non_empty && keys.is_empty() {
            return Err(KeyMapError::EmptyKeySet);
        }
        keys.ensure_no_delimiter(config.delimiter)?;

        let slices: Vec<&[u8]> = keys.iter().collect();
        let stats = KeyStats::of(&slices);
        let strategy = select_strategy(&slices, &stats, config)?;
        let resolver = Resolver::build(&slices, &stats, &strategy, config.delimiter)?;

        log::debug!(
            "Built key map: {} keys | strategy '{}' | {} table bytes",
            slices.len(),
            strategy.tag(),
            resolver.tables().footprint()
        );

        Ok(Self {
            keys,
            stats,
            strategy,
            resolver,
            delimiter: config.delimiter,
        })
    }

    /// Builds from names in declaration order.
    pub fn from_names<I, K>(names: I, config: &KeyMapConfig) -> Result<Self, KeyMapError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        Self::build(KeySet::from_names(names)?, config)
    }

    /// Builds from the field names a reflection layer declares for `T`.
    pub fn for_type<T: FieldKeys>(config: &KeyMapConfig) -> Result<Self, KeyMapError> {
        Self::build(T::key_set()?, config)
    }

    //==============================================================================
    // Lookup
    //==============================================================================

    /// Candidate lookup. Returns an index in `[0, N)` or the sentinel `N`; a
    /// candidate must be checked against `key(candidate)` before use.
    #[inline]
    pub fn resolve(&self, input: &[u8]) -> usize {
        self.resolver.resolve(input)
    }

    /// Candidate lookup that sees only `input[..available]`.
    #[inline]
    pub fn resolve_bounded(&self, input: &[u8], available: usize) -> usize {
        self.resolver.resolve_bounded(input, available)
    }

    /// Verified lookup of a complete key.
    #[inline]
    pub fn find(&self, key: &[u8]) -> Option<usize> {
        let candidate = self.resolve(key);
        match self.keys.get(candidate) {
            Some(stored) if stored == key => Some(candidate),
            _ => None,
        }
    }

    /// Verified lookup of a key still embedded in the source buffer. The stored
    /// key must be followed by the delimiter or by the end of `input`.
    #[inline]
    pub fn find_in_buffer(&self, input: &[u8]) -> Option<usize> {
        let candidate = self.resolve(input);
        let stored = self.keys.get(candidate)?;
        let rest = input.strip_prefix(stored)?;
        match rest.first() {
            None => Some(candidate),
            Some(&byte) if byte == self.delimiter => Some(candidate),
            Some(_) => None,
        }
    }

    //==============================================================================
    // Accessors
    //==============================================================================

    /// The stored key for an index, for post-lookup verification.
    #[inline]
    pub fn key(&self, index: usize) -> Option<&[u8]> {
        self.keys.get(index)
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The "not found" value, equal to `len()`.
    #[inline]
    pub fn sentinel(&self) -> usize {
        self.resolver.sentinel()
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn stats(&self) -> &KeyStats {
        &self.stats
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn report(&self) -> StrategyReport {
        StrategyReport {
            key_count: self.keys.len(),
            strategy: self.strategy.tag(),
            min_len: self.stats.min_len,
            max_len: self.stats.max_len,
            unique_column: self.stats.unique_column,
            descriptor: self.strategy.clone(),
            table_bytes: self.resolver.tables().footprint(),
        }
    }
}
