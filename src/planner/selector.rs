// In: src/planner/selector.rs

//! The strategy selection cascade.
//!
//! Layouts are tried from cheapest to most general. Each `try_*` step either
//! returns the descriptor of a layout that provably separates every key, or
//! `None` to hand the key set on to the next step. The last step, the SIMD
//! bucketed hash, accepts any key set that fits the largest table, and failing
//! even that is a hard build error.

use std::time::Instant;

use crate::config::{KeyMapConfig, MIN_TABLE_SIZE};
use crate::error::KeyMapError;
use crate::kernels::hash::KeyHasher;
use crate::kernels::prng::Xoshiro256;
use crate::planner::builder::{byte_length_slot, place_keys, triple_slot, BYTE_LENGTH_SLOTS};
use crate::planner::stats::{find_unique_column, group_by_first_byte, group_by_length, KeyStats};
use crate::planner::strategy::{Strategy, StrategyTag};

/// Seeds tried per candidate column by the three-key layout.
const TRIPLE_TRIALS_PER_COLUMN: usize = 4;
/// Per-group layouts index a 256-wide row per group and store columns as bytes.
const MAX_GROUPED_KEY_LEN: usize = 256;

//==================================================================================
// 1. The Cascade
//==================================================================================

/// Runs the cascade over `keys` (`keys[i]` has origin index `i`).
pub fn select_strategy(
    keys: &[&[u8]],
    stats: &KeyStats,
    config: &KeyMapConfig,
) -> Result<Strategy, KeyMapError> {
    let start = Instant::now();
    let mut rng = config
        .prng_seed
        .map_or_else(Xoshiro256::new, Xoshiro256::with_seed);

    log::debug!(
        "--- STRATEGY CASCADE: {} keys | lengths [{}, {}] | unique column {:?} ---",
        keys.len(),
        stats.min_len,
        stats.max_len,
        stats.unique_column
    );

    let strategy = match keys.len() {
        0 => Strategy::Empty,
        1 => Strategy::SingleElement,
        n => {
            let mut chosen = None;
            if n == 2 && config.allows(StrategyTag::DoubleElement) {
                chosen = attempt(StrategyTag::DoubleElement, try_double_element(keys, stats));
            }
            if chosen.is_none() && n == 3 && config.allows(StrategyTag::TripleElement) {
                chosen = attempt(
                    StrategyTag::TripleElement,
                    try_triple_element(keys, stats, &mut rng),
                );
            }
            if chosen.is_none() && config.allows(StrategyTag::SingleByte) {
                chosen = attempt(StrategyTag::SingleByte, try_single_byte(stats));
            }
            if chosen.is_none() && config.allows(StrategyTag::FirstByteAndUniqueIndex) {
                chosen = attempt(
                    StrategyTag::FirstByteAndUniqueIndex,
                    try_first_byte_and_unique_index(keys, stats),
                );
            }
            if chosen.is_none() && config.allows(StrategyTag::UniqueByteAndLength) {
                chosen = attempt(
                    StrategyTag::UniqueByteAndLength,
                    try_unique_byte_and_length(keys, stats),
                );
            }
            if chosen.is_none() && config.allows(StrategyTag::UniquePerLength) {
                chosen = attempt(
                    StrategyTag::UniquePerLength,
                    try_unique_per_length(keys, stats),
                );
            }
            match chosen {
                Some(strategy) => strategy,
                None => try_simd_full_length(keys, stats, config, &mut rng)?,
            }
        }
    };

    log::info!(
        "Selected strategy '{}' for {} keys in {:.2?}",
        strategy.tag(),
        keys.len(),
        start.elapsed()
    );
    log_metric!(
        "event" = "select_strategy",
        "strategy" = strategy.tag(),
        "keys" = keys.len(),
        "unique_index" = format!("{:?}", strategy.unique_index())
    );
    Ok(strategy)
}

fn attempt(tag: StrategyTag, result: Option<Strategy>) -> Option<Strategy> {
    match &result {
        Some(strategy) => log::debug!("  - Candidate: {:<28} | ACCEPTED {:?}", tag, strategy),
        None => log::debug!("  - Candidate: {:<28} | rejected", tag),
    }
    result
}

//==================================================================================
// 2. Column Layouts
//==================================================================================

/// Two keys: a discriminating column where key 0's byte is even and key 1's odd.
fn try_double_element(keys: &[&[u8]], stats: &KeyStats) -> Option<Strategy> {
    let mut column = stats.unique_column;
    while let Some(c) = column {
        if keys[0][c] & 1 == 0 && keys[1][c] & 1 == 1 {
            return Some(Strategy::DoubleElement { column: c });
        }
        column = find_unique_column(keys, stats.min_len, c + 1);
    }
    None
}

/// Three keys: the 2-bit hash must send them to slots 2, 1 and 0.
///
/// Relative to `first_char`, key 0 always hashes to slot 0, so this layout is
/// never accepted. The trial still runs, consuming seeds as it always has.
fn try_triple_element(keys: &[&[u8]], stats: &KeyStats, rng: &mut Xoshiro256) -> Option<Strategy> {
    let mut column = stats.unique_column;
    while let Some(c) = column {
        let first_char = keys[0][c];
        for _ in 0..TRIPLE_TRIALS_PER_COLUMN {
            let seed = rng.next_seed();
            let slots = [
                triple_slot(keys[0][c], first_char, seed),
                triple_slot(keys[1][c], first_char, seed),
                triple_slot(keys[2][c], first_char, seed),
            ];
            if slots == [2, 1, 0] {
                return Some(Strategy::TripleElement {
                    column: c,
                    first_char,
                    seed,
                });
            }
        }
        column = find_unique_column(keys, stats.min_len, c + 1);
    }
    None
}

fn try_single_byte(stats: &KeyStats) -> Option<Strategy> {
    stats
        .unique_column
        .map(|column| Strategy::SingleByte { column })
}

/// Partitions by first byte and needs a discriminating column in every partition.
fn try_first_byte_and_unique_index(keys: &[&[u8]], stats: &KeyStats) -> Option<Strategy> {
    if stats.max_len >= MAX_GROUPED_KEY_LEN {
        return None;
    }
    let groups = group_by_first_byte(keys)?;
    let columns = groups
        .iter()
        .map(|group| {
            let column = group.unique_column(keys)?;
            Some((group.value, u8::try_from(column).ok()?))
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Strategy::FirstByteAndUniqueIndex { columns })
}

/// The first column where `key[column] ^ key.len()` is collision-free mod 2048.
fn try_unique_byte_and_length(keys: &[&[u8]], stats: &KeyStats) -> Option<Strategy> {
    (0..stats.min_len)
        .find(|&column| {
            let mut taken = vec![false; BYTE_LENGTH_SLOTS];
            keys.iter().all(|key| {
                let slot = byte_length_slot(key[column], key.len());
                !std::mem::replace(&mut taken[slot], true)
            })
        })
        .map(|column| Strategy::UniqueByteAndLength { column })
}

/// Partitions by length and needs a discriminating column in every partition.
fn try_unique_per_length(keys: &[&[u8]], stats: &KeyStats) -> Option<Strategy> {
    if stats.max_len >= MAX_GROUPED_KEY_LEN {
        return None;
    }
    let columns = group_by_length(keys)
        .iter()
        .map(|group| {
            let column = group.unique_column(keys)?;
            Some((group.value, u8::try_from(column).ok()?))
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Strategy::UniquePerLength { columns })
}

//==================================================================================
// 3. The SIMD Fallback
//==================================================================================

/// Searches table sizes from 16 up to `max_table_size`; within a size, every
/// prefix length in `[min_len, max_len]` gets `trials_per_prefix` fresh seeds.
fn try_simd_full_length(
    keys: &[&[u8]],
    stats: &KeyStats,
    config: &KeyMapConfig,
    rng: &mut Xoshiro256,
) -> Result<Strategy, KeyMapError> {
    let bucket_width = config.effective_bucket_width();
    let mut table_size = MIN_TABLE_SIZE;
    let mut trials = 0usize;

    while table_size <= config.max_table_size {
        if table_size < bucket_width || table_size < keys.len() {
            log::debug!("  - SIMD table size {:>5} | skipped", table_size);
            table_size *= 2;
            continue;
        }
        for prefix_len in stats.min_len..=stats.max_len {
            for _ in 0..config.trials_per_prefix {
                trials += 1;
                let seed = rng.next_seed();
                let hasher = KeyHasher::new(seed);
                if place_keys(keys, &hasher, prefix_len, table_size, bucket_width).is_some() {
                    log::debug!(
                        "  - SIMD table size {:>5} | prefix {} | seed {:#018x} | placed after {} trials",
                        table_size,
                        prefix_len,
                        seed,
                        trials
                    );
                    return Ok(Strategy::SimdFullLength {
                        prefix_len,
                        seed,
                        table_size,
                        bucket_width,
                    });
                }
            }
        }
        log::debug!("  - SIMD table size {:>5} | no collision-free seed", table_size);
        table_size *= 2;
    }

    Err(KeyMapError::TableExhausted {
        key_count: keys.len(),
        max_table_size: config.max_table_size,
    })
}
