// In: src/planner/builder.rs

//! The table builder.
//!
//! Given the key set and the strategy the selector settled on, this module
//! allocates and fills the fixed-capacity lookup tables. Every unoccupied slot
//! holds the sentinel `N`, so a failed lookup is just a value that is not a
//! valid index. Building is deterministic: the same keys and strategy always
//! produce identical tables.

use crate::error::KeyMapError;
use crate::kernels::hash::KeyHasher;
use crate::planner::strategy::Strategy;

//==================================================================================
// 0. Constants
//==================================================================================
/// Marks "no column" in the per-group column tables.
pub const NO_COLUMN: u8 = 0xFF;
/// Slot count of the byte-xor-length table.
pub const BYTE_LENGTH_SLOTS: usize = 2048;
/// Control byte of an unoccupied SIMD slot.
pub const EMPTY_CONTROL: u8 = 0xFF;

//==================================================================================
// 1. Table Shapes
//==================================================================================

/// DoubleElement: the parity of one byte picks the candidate, and the byte
/// itself confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityTable {
    pub column: usize,
    /// `expected[p]` is the byte key `p` holds at `column`.
    pub expected: [u8; 2],
}

/// TripleElement: a 2-bit multiplicative hash of one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripleTable {
    pub column: usize,
    pub first_char: u8,
    pub seed: u64,
    pub slots: [u16; 4],
}

/// SingleByte: one 256-entry table indexed by the byte at `column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteTable {
    pub column: usize,
    pub slots: Box<[u16; 256]>,
}

/// FirstByteAndUniqueIndex: `columns[first]` names the column to read for keys
/// starting with `first`; `slots[(first << 8) | byte]` is the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstByteTable {
    pub columns: Box<[u8; 256]>,
    pub slots: Box<[u16]>,
}

/// UniqueByteAndLength: `slots[(key[column] ^ len) & 2047]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteLengthTable {
    pub column: usize,
    pub slots: Box<[u16]>,
}

/// UniquePerLength: `columns[len]` names the column to read for keys of length
/// `len`; `slots[(len << 8) | byte]` is the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerLengthTable {
    pub columns: Box<[u8]>,
    pub slots: Box<[u16]>,
}

/// SimdFullLength: `num_groups` buckets of `bucket_width` slots, each slot with
/// a one-byte fingerprint in `control` and a candidate in `slots`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimdTable {
    pub prefix_len: usize,
    pub hasher: KeyHasher,
    pub bucket_width: usize,
    pub num_groups: usize,
    pub control: Box<[u8]>,
    pub slots: Box<[u16]>,
}

impl SimdTable {
    /// Group index and fingerprint of a hash.
    #[inline(always)]
    pub fn locate(&self, hash: u64) -> (usize, u8) {
        simd_locate(hash, self.num_groups)
    }
}

#[inline(always)]
pub(crate) fn simd_locate(hash: u64, num_groups: usize) -> (usize, u8) {
    (((hash >> 8) as usize) & (num_groups - 1), hash as u8)
}

/// The materialized tables of one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tables {
    Empty,
    SingleElement,
    DoubleElement(ParityTable),
    TripleElement(TripleTable),
    SingleByte(ByteTable),
    FirstByteAndUniqueIndex(FirstByteTable),
    UniqueByteAndLength(ByteLengthTable),
    UniquePerLength(PerLengthTable),
    SimdFullLength(SimdTable),
}

impl Tables {
    /// Bytes held by the lookup tables, for reporting.
    pub fn footprint(&self) -> usize {
        let u16s = |slots: &[u16]| slots.len() * std::mem::size_of::<u16>();
        match self {
            Tables::Empty | Tables::SingleElement => 0,
            Tables::DoubleElement(_) => 2,
            Tables::TripleElement(table) => u16s(&table.slots),
            Tables::SingleByte(table) => u16s(&table.slots[..]),
            Tables::FirstByteAndUniqueIndex(table) => table.columns.len() + u16s(&table.slots),
            Tables::UniqueByteAndLength(table) => u16s(&table.slots),
            Tables::UniquePerLength(table) => table.columns.len() + u16s(&table.slots),
            Tables::SimdFullLength(table) => table.control.len() + u16s(&table.slots),
        }
    }
}

//==================================================================================
// 2. Builders
//==================================================================================

/// Materializes the tables for `strategy`. `keys[i]` must be the key with origin
/// index `i`.
pub fn build_tables(keys: &[&[u8]], strategy: &Strategy) -> Result<Tables, KeyMapError> {
    let sentinel = sentinel_of(keys)?;
    let tables = match strategy {
        Strategy::Empty => Tables::Empty,
        Strategy::SingleElement => Tables::SingleElement,
        Strategy::DoubleElement { column } => {
            let [first, second] = keys else {
                return Err(KeyMapError::InternalError(format!(
                    "double_element layout requested for {} keys",
                    keys.len()
                )));
            };
            Tables::DoubleElement(ParityTable {
                column: *column,
                expected: [byte_at(first, *column)?, byte_at(second, *column)?],
            })
        }
        Strategy::TripleElement {
            column,
            first_char,
            seed,
        } => {
            let mut slots = [sentinel; 4];
            for (index, key) in keys.iter().enumerate() {
                let slot = triple_slot(byte_at(key, *column)?, *first_char, *seed);
                claim(&mut slots, slot, index, sentinel)?;
            }
            Tables::TripleElement(TripleTable {
                column: *column,
                first_char: *first_char,
                seed: *seed,
                slots,
            })
        }
        Strategy::SingleByte { column } => {
            let mut slots = Box::new([sentinel; 256]);
            for (index, key) in keys.iter().enumerate() {
                let slot = byte_at(key, *column)? as usize;
                claim(&mut slots[..], slot, index, sentinel)?;
            }
            Tables::SingleByte(ByteTable {
                column: *column,
                slots,
            })
        }
        Strategy::FirstByteAndUniqueIndex { columns: pairs } => {
            let mut columns = Box::new([NO_COLUMN; 256]);
            for &(first, column) in pairs {
                columns[first as usize] = column;
            }
            let max_first = pairs.iter().map(|&(first, _)| first).max().unwrap_or(0);
            let mut slots = vec![sentinel; (max_first as usize + 1) * 256].into_boxed_slice();
            for (index, key) in keys.iter().enumerate() {
                let first = byte_at(key, 0)?;
                let column = columns[first as usize];
                if column == NO_COLUMN {
                    return Err(KeyMapError::InternalError(format!(
                        "no column recorded for first byte {:#04x}",
                        first
                    )));
                }
                let slot = ((first as usize) << 8) | byte_at(key, column as usize)? as usize;
                claim(&mut slots, slot, index, sentinel)?;
            }
            Tables::FirstByteAndUniqueIndex(FirstByteTable { columns, slots })
        }
        Strategy::UniqueByteAndLength { column } => {
            let mut slots = vec![sentinel; BYTE_LENGTH_SLOTS].into_boxed_slice();
            for (index, key) in keys.iter().enumerate() {
                let slot = byte_length_slot(byte_at(key, *column)?, key.len());
                claim(&mut slots, slot, index, sentinel)?;
            }
            Tables::UniqueByteAndLength(ByteLengthTable {
                column: *column,
                slots,
            })
        }
        Strategy::UniquePerLength { columns: pairs } => {
            let max_len = keys.iter().map(|key| key.len()).max().unwrap_or(0);
            let mut columns = vec![NO_COLUMN; max_len + 1].into_boxed_slice();
            for &(len, column) in pairs {
                if len > max_len {
                    return Err(KeyMapError::InternalError(format!(
                        "column recorded for length {} beyond the longest key",
                        len
                    )));
                }
                columns[len] = column;
            }
            let mut slots = vec![sentinel; (max_len + 1) * 256].into_boxed_slice();
            for (index, key) in keys.iter().enumerate() {
                let column = columns[key.len()];
                if column == NO_COLUMN {
                    return Err(KeyMapError::InternalError(format!(
                        "no column recorded for length {}",
                        key.len()
                    )));
                }
                let slot = (key.len() << 8) | byte_at(key, column as usize)? as usize;
                claim(&mut slots, slot, index, sentinel)?;
            }
            Tables::UniquePerLength(PerLengthTable { columns, slots })
        }
        Strategy::SimdFullLength {
            prefix_len,
            seed,
            table_size,
            bucket_width,
        } => {
            let hasher = KeyHasher::new(*seed);
            let placed = place_keys(keys, &hasher, *prefix_len, *table_size, *bucket_width)
                .ok_or_else(|| {
                    KeyMapError::InternalError(format!(
                        "seed {:#x} no longer places the keys without collision",
                        seed
                    ))
                })?;
            Tables::SimdFullLength(SimdTable {
                prefix_len: *prefix_len,
                hasher,
                bucket_width: *bucket_width,
                num_groups: table_size / bucket_width,
                control: placed.control,
                slots: placed.slots,
            })
        }
    };
    Ok(tables)
}

/// Control bytes and candidate slots of one successful SIMD placement.
pub(crate) struct Placement {
    pub control: Box<[u8]>,
    pub slots: Box<[u16]>,
}

/// Scatters every key into its bucket. Returns `None` if a bucket overflows, two
/// keys in one bucket share a fingerprint, or a fingerprint equals the empty
/// control byte.
pub(crate) fn place_keys(
    keys: &[&[u8]],
    hasher: &KeyHasher,
    prefix_len: usize,
    table_size: usize,
    bucket_width: usize,
) -> Option<Placement> {
    let sentinel = keys.len() as u16;
    let num_groups = table_size / bucket_width;
    let mut control = vec![EMPTY_CONTROL; table_size].into_boxed_slice();
    let mut slots = vec![sentinel; table_size].into_boxed_slice();
    let mut fill = vec![0usize; num_groups];

    for (index, key) in keys.iter().enumerate() {
        let (group, fingerprint) = simd_locate(hasher.hash_prefix(key, prefix_len), num_groups);
        let base = group * bucket_width;
        let lane = fill[group];
        if lane >= bucket_width || control[base..base + bucket_width].contains(&fingerprint) {
            return None;
        }
        control[base + lane] = fingerprint;
        slots[base + lane] = index as u16;
        fill[group] += 1;
    }
    Some(Placement { control, slots })
}

//==================================================================================
// 3. Helpers
//==================================================================================

#[inline]
pub(crate) fn byte_length_slot(byte: u8, len: usize) -> usize {
    (byte as usize ^ len) & (BYTE_LENGTH_SLOTS - 1)
}

#[inline]
pub(crate) fn triple_slot(byte: u8, first_char: u8, seed: u64) -> usize {
    ((byte ^ first_char) as u64).wrapping_mul(seed) as usize & 3
}

fn sentinel_of(keys: &[&[u8]]) -> Result<u16, KeyMapError> {
    u16::try_from(keys.len())
        .ok()
        .filter(|&n| n < u16::MAX)
        .ok_or(KeyMapError::TooManyKeys(keys.len(), u16::MAX as usize - 1))
}

fn byte_at(key: &[u8], column: usize) -> Result<u8, KeyMapError> {
    key.get(column).copied().ok_or_else(|| {
        KeyMapError::InternalError(format!(
            "column {} is out of range for a key of length {}",
            column,
            key.len()
        ))
    })
}

/// Writes `index` into an unoccupied slot; an occupied slot is a planner bug.
fn claim(slots: &mut [u16], slot: usize, index: usize, sentinel: u16) -> Result<(), KeyMapError> {
    match slots.get_mut(slot) {
        Some(entry) if *entry == sentinel => {
            *entry = index as u16;
            Ok(())
        }
        Some(_) => Err(KeyMapError::InternalError(format!(
            "slot {} claimed twice while building tables",
            slot
        ))),
        None => Err(KeyMapError::InternalError(format!(
            "slot {} is outside a table of {} entries",
            slot,
            slots.len()
        ))),
    }
}
