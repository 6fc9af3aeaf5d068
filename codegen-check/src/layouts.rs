// In: codegen-check/src/layouts.rs

//! One key set per layout the cascade can select. Shared by `build.rs`, which
//! emits a resolver for each, and by the tests, which rebuild the same maps at
//! run time to compare against.

use perfkey::{KeyMapConfig, StrategyTag};

pub struct Layout {
    /// Module and item prefix of the generated code.
    pub name: &'static str,
    pub keys: &'static [&'static str],
    /// The layout the cascade must pick for `keys`.
    pub tag: StrategyTag,
    /// Skip every optional step so the SIMD fallback is used.
    pub force_simd: bool,
}

impl Layout {
    pub fn config(&self) -> KeyMapConfig {
        let skip_strategies = if self.force_simd {
            StrategyTag::CASCADE
                .into_iter()
                .filter(|tag| tag.is_optional())
                .collect()
        } else {
            Vec::new()
        };
        KeyMapConfig {
            skip_strategies,
            ..Default::default()
        }
    }
}

pub const LAYOUTS: &[Layout] = &[
    Layout {
        name: "none",
        keys: &[],
        tag: StrategyTag::Empty,
        force_simd: false,
    },
    Layout {
        name: "one",
        keys: &["only"],
        tag: StrategyTag::SingleElement,
        force_simd: false,
    },
    Layout {
        name: "pair",
        keys: &["bx", "ay"],
        tag: StrategyTag::DoubleElement,
        force_simd: false,
    },
    Layout {
        name: "byte",
        keys: &["id", "name", "email"],
        tag: StrategyTag::SingleByte,
        force_simd: false,
    },
    Layout {
        name: "first",
        keys: &["aa", "ab", "ba", "bb"],
        tag: StrategyTag::FirstByteAndUniqueIndex,
        force_simd: false,
    },
    Layout {
        name: "blen",
        keys: &["ab", "abc"],
        tag: StrategyTag::UniqueByteAndLength,
        force_simd: false,
    },
    Layout {
        name: "plen",
        keys: &["a", "ab", "ba"],
        tag: StrategyTag::UniquePerLength,
        force_simd: false,
    },
    Layout {
        name: "simd",
        keys: &["xab", "xba", "xaa", "xbb", "xac"],
        tag: StrategyTag::SimdFullLength,
        force_simd: false,
    },
    Layout {
        name: "forced",
        keys: &[
            "id",
            "name",
            "email",
            "created_at",
            "updated_at",
            "is_active",
            "tags",
            "profile_url",
        ],
        tag: StrategyTag::SimdFullLength,
        force_simd: true,
    },
];
