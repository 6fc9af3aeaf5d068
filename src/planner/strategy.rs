// In: src/planner/strategy.rs

//! The strategy descriptor: which of the nine layouts was chosen, and the
//! parameters needed to rebuild its tables exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The nine layouts, in cascade order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    Empty,
    SingleElement,
    DoubleElement,
    TripleElement,
    SingleByte,
    FirstByteAndUniqueIndex,
    UniqueByteAndLength,
    UniquePerLength,
    SimdFullLength,
}

impl StrategyTag {
    /// Every tag, in the order the cascade tries them.
    pub const CASCADE: [StrategyTag; 9] = [
        StrategyTag::Empty,
        StrategyTag::SingleElement,
        StrategyTag::DoubleElement,
        StrategyTag::TripleElement,
        StrategyTag::SingleByte,
        StrategyTag::FirstByteAndUniqueIndex,
        StrategyTag::UniqueByteAndLength,
        StrategyTag::UniquePerLength,
        StrategyTag::SimdFullLength,
    ];

    /// `Empty` and `SingleElement` are the only layouts for their set sizes and
    /// `SimdFullLength` is the universal fallback; everything else may be skipped.
    pub fn is_optional(self) -> bool {
        !matches!(
            self,
            StrategyTag::Empty | StrategyTag::SingleElement | StrategyTag::SimdFullLength
        )
    }

    /// Layouts that recover the key length with a delimiter scan.
    pub fn is_length_dependent(self) -> bool {
        matches!(
            self,
            StrategyTag::UniqueByteAndLength
                | StrategyTag::UniquePerLength
                | StrategyTag::SimdFullLength
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyTag::Empty => "empty",
            StrategyTag::SingleElement => "single_element",
            StrategyTag::DoubleElement => "double_element",
            StrategyTag::TripleElement => "triple_element",
            StrategyTag::SingleByte => "single_byte",
            StrategyTag::FirstByteAndUniqueIndex => "first_byte_and_unique_index",
            StrategyTag::UniqueByteAndLength => "unique_byte_and_length",
            StrategyTag::UniquePerLength => "unique_per_length",
            StrategyTag::SimdFullLength => "simd_full_length",
        }
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The immutable record of the chosen layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    Empty,
    SingleElement,
    /// The byte at `column` is even for key 0 and odd for key 1.
    DoubleElement { column: usize },
    /// `((byte ^ first_char) * seed) & 3` separates the three keys at `column`.
    TripleElement {
        column: usize,
        first_char: u8,
        seed: u64,
    },
    SingleByte { column: usize },
    /// One discriminating column per first byte, as `(first_byte, column)`.
    FirstByteAndUniqueIndex { columns: Vec<(u8, u8)> },
    UniqueByteAndLength { column: usize },
    /// One discriminating column per key length, as `(length, column)`.
    UniquePerLength { columns: Vec<(usize, u8)> },
    SimdFullLength {
        prefix_len: usize,
        seed: u64,
        table_size: usize,
        bucket_width: usize,
    },
}

impl Strategy {
    pub fn tag(&self) -> StrategyTag {
        match self {
            Strategy::Empty => StrategyTag::Empty,
            Strategy::SingleElement => StrategyTag::SingleElement,
            Strategy::DoubleElement { .. } => StrategyTag::DoubleElement,
            Strategy::TripleElement { .. } => StrategyTag::TripleElement,
            Strategy::SingleByte { .. } => StrategyTag::SingleByte,
            Strategy::FirstByteAndUniqueIndex { .. } => StrategyTag::FirstByteAndUniqueIndex,
            Strategy::UniqueByteAndLength { .. } => StrategyTag::UniqueByteAndLength,
            Strategy::UniquePerLength { .. } => StrategyTag::UniquePerLength,
            Strategy::SimdFullLength { .. } => StrategyTag::SimdFullLength,
        }
    }

    /// The single column the layout reads, or the hashed prefix length for the
    /// SIMD layout. Per-group layouts have no single column.
    pub fn unique_index(&self) -> Option<usize> {
        match *self {
            Strategy::DoubleElement { column }
            | Strategy::TripleElement { column, .. }
            | Strategy::SingleByte { column }
            | Strategy::UniqueByteAndLength { column } => Some(column),
            Strategy::SimdFullLength { prefix_len, .. } => Some(prefix_len),
            _ => None,
        }
    }

    /// The seed that made the layout collision-free, for seeded layouts.
    pub fn seed(&self) -> Option<u64> {
        match *self {
            Strategy::TripleElement { seed, .. } | Strategy::SimdFullLength { seed, .. } => {
                Some(seed)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandatory_tags() {
        let mandatory: Vec<_> = StrategyTag::CASCADE
            .iter()
            .filter(|tag| !tag.is_optional())
            .collect();
        assert_eq!(
            mandatory,
            vec![
                &StrategyTag::Empty,
                &StrategyTag::SingleElement,
                &StrategyTag::SimdFullLength
            ]
        );
    }

    #[test]
    fn test_length_dependent_tags() {
        let scanning: Vec<_> = StrategyTag::CASCADE
            .iter()
            .filter(|tag| tag.is_length_dependent())
            .collect();
        assert_eq!(
            scanning,
            vec![
                &StrategyTag::UniqueByteAndLength,
                &StrategyTag::UniquePerLength,
                &StrategyTag::SimdFullLength
            ]
        );
    }

    #[test]
    fn test_tag_names_match_serde() {
        for tag in StrategyTag::CASCADE {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag));
        }
    }

    #[test]
    fn test_descriptor_accessors() {
        let simd = Strategy::SimdFullLength {
            prefix_len: 6,
            seed: 99,
            table_size: 64,
            bucket_width: 16,
        };
        assert_eq!(simd.tag(), StrategyTag::SimdFullLength);
        assert_eq!(simd.unique_index(), Some(6));
        assert_eq!(simd.seed(), Some(99));

        let per_length = Strategy::UniquePerLength {
            columns: vec![(1, 0), (2, 1)],
        };
        assert_eq!(per_length.unique_index(), None);
        assert_eq!(per_length.seed(), None);
    }

    #[test]
    fn test_descriptor_serializes_with_tag() {
        let json = serde_json::to_string(&Strategy::SingleByte { column: 3 }).unwrap();
        assert_eq!(json, r#"{"strategy":"single_byte","column":3}"#);
    }
}
