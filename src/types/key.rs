// In: src/types/key.rs

//! Keys and key sets: the input handed over by the schema layer.
//!
//! A `KeySet` is the only way into the planner, and constructing one enforces the
//! build-time preconditions. After construction, `keys()[i]` is always the key
//! whose origin index is `i`, so an origin index doubles as a table value and as
//! the position to verify against.

use hashbrown::HashSet;

use crate::error::{display_key, KeyMapError};

/// Index storage in the lookup tables is `u16` and the sentinel is `N` itself,
/// so at most `u16::MAX - 1` keys fit.
pub const MAX_KEYS: usize = u16::MAX as usize - 1;

/// An immutable key and the position of its field in the declaring structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    bytes: Box<[u8]>,
    origin: usize,
}

impl Key {
    pub fn new(bytes: impl AsRef<[u8]>, origin: usize) -> Self {
        Self {
            bytes: bytes.as_ref().into(),
            origin,
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A validated set of unique keys, ordered by origin index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySet {
    keys: Vec<Key>,
}

impl KeySet {
    /// Builds a key set from `(key, origin_index)` pairs in any order.
    ///
    /// Fails if a key repeats, if the origin indices are not exactly `0..N`, or if
    /// there are more than `MAX_KEYS` keys.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, KeyMapError>
    where
        I: IntoIterator<Item = (K, usize)>,
        K: AsRef<[u8]>,
    {
        let keys: Vec<Key> = pairs
            .into_iter()
            .map(|(bytes, origin)| Key::new(bytes, origin))
            .collect();
        Self::from_keys(keys)
    }

    /// Builds a key set whose origin indices follow declaration order.
    pub fn from_names<I, K>(names: I) -> Result<Self, KeyMapError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        Self::from_pairs(names.into_iter().enumerate().map(|(i, name)| (name, i)))
    }

    pub fn from_keys(mut keys: Vec<Key>) -> Result<Self, KeyMapError> {
        let count = keys.len();
        if count > MAX_KEYS {
            return Err(KeyMapError::TooManyKeys(count, MAX_KEYS));
        }

        // `seen_bytes` borrows `keys`; it must be gone before the sort.
        {
            let mut seen_bytes: HashSet<&[u8]> = HashSet::with_capacity(count);
            let mut seen_origin = vec![false; count];
            for key in &keys {
                if !seen_bytes.insert(key.bytes()) {
                    return Err(KeyMapError::DuplicateKey(display_key(key.bytes())));
                }
                match seen_origin.get_mut(key.origin) {
                    Some(slot) if !*slot => *slot = true,
                    _ => {
                        return Err(KeyMapError::InvalidOriginIndex {
                            index: key.origin,
                            count,
                        })
                    }
                }
            }
        }

        keys.sort_unstable_by_key(|key| key.origin);
        Ok(Self { keys })
    }

    /// Rejects any key that contains `delimiter`.
    pub fn ensure_no_delimiter(&self, delimiter: u8) -> Result<(), KeyMapError> {
        match self.keys.iter().find(|key| key.bytes().contains(&delimiter)) {
            Some(key) => Err(KeyMapError::DelimiterInKey(
                display_key(key.bytes()),
                delimiter,
            )),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The keys, `keys()[i].origin() == i`.
    #[inline]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// The bytes of the key with origin index `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.keys.get(index).map(Key::bytes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.keys.iter().map(Key::bytes)
    }
}

/// Implemented by a reflection layer for every shape it serializes.
///
/// `FIELD_NAMES[i]` is the JSON member name of the field with origin index `i`.
pub trait FieldKeys {
    const FIELD_NAMES: &'static [&'static str];

    fn key_set() -> Result<KeySet, KeyMapError> {
        KeySet::from_names(Self::FIELD_NAMES.iter().map(|name| name.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_orders_by_origin() {
        let set = KeySet::from_pairs([("gamma", 2), ("alpha", 0), ("beta", 1)]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(0), Some(&b"alpha"[..]));
        assert_eq!(set.get(2), Some(&b"gamma"[..]));
        for (i, key) in set.keys().iter().enumerate() {
            assert_eq!(key.origin(), i);
        }
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let result = KeySet::from_names(["id", "name", "id"]);
        assert!(matches!(result, Err(KeyMapError::DuplicateKey(ref k)) if k == "id"));
    }

    #[test]
    fn test_origin_indices_must_be_a_permutation() {
        let gap = KeySet::from_pairs([("a", 0), ("b", 2)]);
        assert!(matches!(
            gap,
            Err(KeyMapError::InvalidOriginIndex { index: 2, count: 2 })
        ));

        let repeat = KeySet::from_pairs([("a", 1), ("b", 1)]);
        assert!(matches!(
            repeat,
            Err(KeyMapError::InvalidOriginIndex { index: 1, .. })
        ));
    }

    #[test]
    fn test_empty_set_is_valid() {
        let set = KeySet::from_names(Vec::<&str>::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn test_delimiter_check() {
        let set = KeySet::from_names(["ok", "no\"pe"]).unwrap();
        assert!(matches!(
            set.ensure_no_delimiter(b'"'),
            Err(KeyMapError::DelimiterInKey(_, b'"'))
        ));
        assert!(set.ensure_no_delimiter(b':').is_ok());
    }

    #[test]
    fn test_field_keys_collects_declared_names() {
        struct User;
        impl FieldKeys for User {
            const FIELD_NAMES: &'static [&'static str] = &["id", "name", "email"];
        }
        let set = User::key_set().unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![&b"id"[..], &b"name"[..], &b"email"[..]]);
    }
}
