// In: src/planner/stats.rs

//! Key-set statistics and the discriminating-column search.
//!
//! A discriminating (or unique) column is a byte offset at which every key of a
//! group holds a different byte. Finding one turns a lookup into a plain array
//! index, which is why every cheap layout is built on `find_unique_column`.

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-key-set aggregates, computed once before the cascade runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    pub min_len: usize,
    pub max_len: usize,
    /// The smallest column below `min_len` that discriminates every key.
    pub unique_column: Option<usize>,
}

impl KeyStats {
    /// Computes the statistics of `keys`. An empty set has both lengths at zero.
    pub fn of(keys: &[&[u8]]) -> Self {
        let min_len = keys.iter().map(|key| key.len()).min().unwrap_or(0);
        let max_len = keys.iter().map(|key| key.len()).max().unwrap_or(0);
        Self {
            min_len,
            max_len,
            unique_column: find_unique_column(keys, min_len, 0),
        }
    }
}

/// Returns the smallest column in `[start, max_index)` at which all `keys` differ.
///
/// Every key must be at least `max_index` bytes long.
pub fn find_unique_column(keys: &[&[u8]], max_index: usize, start: usize) -> Option<usize> {
    (start..max_index).find(|&column| {
        let mut seen = [false; 256];
        keys.iter().all(|key| {
            let byte = key[column] as usize;
            !std::mem::replace(&mut seen[byte], true)
        })
    })
}

/// A subset of the key set sharing one property, by origin index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGroup<T> {
    pub value: T,
    pub members: Vec<usize>,
}

impl<T> KeyGroup<T> {
    /// The member keys, in member order.
    pub fn keys<'a>(&self, keys: &[&'a [u8]]) -> Vec<&'a [u8]> {
        self.members.iter().map(|&i| keys[i]).collect()
    }

    /// The smallest column discriminating the members, below their shortest length.
    pub fn unique_column(&self, keys: &[&[u8]]) -> Option<usize> {
        let members = self.keys(keys);
        let min_len = members.iter().map(|key| key.len()).min().unwrap_or(0);
        find_unique_column(&members, min_len, 0)
    }
}

/// Groups keys by their first byte, ordered by that byte. `None` if any key is
/// empty, since an empty key has no first byte.
pub fn group_by_first_byte(keys: &[&[u8]]) -> Option<Vec<KeyGroup<u8>>> {
    let mut groups: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        let first = *key.first()?;
        groups.entry(first).or_default().push(index);
    }
    Some(
        groups
            .into_iter()
            .map(|(value, members)| KeyGroup { value, members })
            .collect(),
    )
}

/// Groups keys by length, ordered by length.
pub fn group_by_length(keys: &[&[u8]]) -> Vec<KeyGroup<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        groups.entry(key.len()).or_default().push(index);
    }
    groups
        .into_iter()
        .map(|(value, members)| KeyGroup { value, members })
        .collect()
}
