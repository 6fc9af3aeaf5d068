use crate::config::KeyMapConfig;
use crate::error::KeyMapError;
use crate::planner::builder::{build_tables, Tables};
use crate::planner::selector::select_strategy;
use crate::planner::stats::KeyStats;
use crate::planner::strategy::{Strategy, StrategyTag};

// Test Helpers
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn select(names: &[&str]) -> Strategy {
    select_with(names, &KeyMapConfig::default()).expect("selection should succeed")
}

fn select_with(names: &[&str], config: &KeyMapConfig) -> Result<Strategy, KeyMapError> {
    init_logger();
    let keys: Vec<&[u8]> = names.iter().map(|n| n.as_bytes()).collect();
    let stats = KeyStats::of(&keys);
    select_strategy(&keys, &stats, config)
}

fn skipping(tags: &[StrategyTag]) -> KeyMapConfig {
    KeyMapConfig {
        skip_strategies: tags.to_vec(),
        ..Default::default()
    }
}

//==================================================================================
// Cascade order, one key set per layout
//==================================================================================

#[test]
fn test_empty_set_selects_empty() {
    assert_eq!(select(&[]), Strategy::Empty);
}

#[test]
fn test_one_key_selects_single_element() {
    assert_eq!(select(&["only"]), Strategy::SingleElement);
}

#[test]
fn test_two_keys_with_even_odd_column_select_double_element() {
    // 'b' (0x62) is even, 'a' (0x61) is odd.
    assert_eq!(select(&["bx", "ay"]), Strategy::DoubleElement { column: 0 });
}

#[test]
fn test_double_element_keeps_scanning_past_wrong_parity() {
    // Column 0: 'i' and 'a' are both odd. Column 1: 'd' even, 'g' odd.
    assert_eq!(select(&["id", "age"]), Strategy::DoubleElement { column: 1 });
}

#[test]
fn test_double_element_falls_back_to_single_byte() {
    // {"a","bb"}: key 0 is odd at the only column.
    assert_eq!(select(&["a", "bb"]), Strategy::SingleByte { column: 0 });
    // {"id","at"}: odd/odd at column 0, even/even at column 1.
    assert_eq!(select(&["id", "at"]), Strategy::SingleByte { column: 0 });
}

#[test]
fn test_triple_element_never_accepts() {
    let strategy = select(&["x", "y", "z"]);
    assert_eq!(strategy, Strategy::SingleByte { column: 0 });

    // Whatever the seed sequence, the result is the same.
    for seed in 0..32 {
        let config = KeyMapConfig {
            prng_seed: Some(seed),
            ..Default::default()
        };
        let strategy = select_with(&["cat", "dog", "emu"], &config).unwrap();
        assert_ne!(strategy.tag(), StrategyTag::TripleElement);
    }
}

#[test]
fn test_many_keys_with_unique_column_select_single_byte() {
    assert_eq!(
        select(&["apple", "banana", "cherry", "date"]),
        Strategy::SingleByte { column: 0 }
    );
    assert_eq!(
        select(&["user_id", "user_name", "user_age", "user_bio"]),
        Strategy::SingleByte { column: 5 }
    );
}

#[test]
fn test_first_byte_partitions() {
    assert_eq!(
        select(&["aa", "ab", "ba", "bb"]),
        Strategy::FirstByteAndUniqueIndex {
            columns: vec![(b'a', 1), (b'b', 1)]
        }
    );
}

#[test]
fn test_unique_byte_and_length() {
    // No column discriminates and the 'a' partition has none either, but
    // 'a' ^ 2 != 'a' ^ 3.
    assert_eq!(
        select(&["ab", "abc"]),
        Strategy::UniqueByteAndLength { column: 0 }
    );
}

#[test]
fn test_unique_per_length() {
    // 'a'^1 == 'b'^2, so byte-xor-length collides; per length it separates.
    assert_eq!(
        select(&["a", "ab", "ba"]),
        Strategy::UniquePerLength {
            columns: vec![(1, 0), (2, 0)]
        }
    );
}

#[test]
fn test_simd_fallback_for_hard_key_sets() {
    let strategy = select(&["xab", "xba", "xaa"]);
    match strategy {
        Strategy::SimdFullLength {
            prefix_len,
            table_size,
            bucket_width,
            ..
        } => {
            assert_eq!(prefix_len, 3);
            assert!(table_size >= bucket_width);
            assert!(table_size.is_power_of_two());
        }
        other => panic!("expected simd_full_length, got {:?}", other),
    }
}

#[test]
fn test_grouped_layouts_reject_long_keys() {
    let long_x = format!("a{}", "x".repeat(300));
    let long_y = format!("a{}", "y".repeat(300));
    // No column separates all three, and a 301-byte key rules out the per-group
    // tables, so the byte-xor-length layout has to take it.
    assert_eq!(
        select(&[long_x.as_str(), long_y.as_str(), "ax"]),
        Strategy::UniqueByteAndLength { column: 1 }
    );
}

//==================================================================================
// Configuration
//==================================================================================

#[test]
fn test_skip_list_forces_later_layouts() {
    let names = ["apple", "banana", "cherry", "date"];
    let config = skipping(&[StrategyTag::SingleByte]);
    assert_eq!(
        select_with(&names, &config).unwrap().tag(),
        StrategyTag::FirstByteAndUniqueIndex
    );

    let config = skipping(&[
        StrategyTag::SingleByte,
        StrategyTag::FirstByteAndUniqueIndex,
        StrategyTag::UniqueByteAndLength,
        StrategyTag::UniquePerLength,
    ]);
    assert_eq!(
        select_with(&names, &config).unwrap().tag(),
        StrategyTag::SimdFullLength
    );
}

#[test]
fn test_selection_is_deterministic() {
    let names = ["xab", "xba", "xaa", "xbb", "xac"];
    let first = select(&names);
    for _ in 0..5 {
        assert_eq!(select(&names), first);
    }
}

#[test]
fn test_prng_seed_changes_simd_seed_only() {
    let names = ["xab", "xba", "xaa"];
    let a = select_with(&names, &KeyMapConfig::default()).unwrap();
    let b = select_with(
        &names,
        &KeyMapConfig {
            prng_seed: Some(7),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(a.tag(), StrategyTag::SimdFullLength);
    assert_eq!(b.tag(), StrategyTag::SimdFullLength);
    assert_ne!(a.seed(), b.seed());
}

#[test]
fn test_narrow_buckets() {
    let names = ["xab", "xba", "xaa", "xbb"];
    let config = KeyMapConfig {
        bucket_width: Some(8),
        ..Default::default()
    };
    match select_with(&names, &config).unwrap() {
        Strategy::SimdFullLength { bucket_width, .. } => assert_eq!(bucket_width, 8),
        other => panic!("expected simd_full_length, got {:?}", other),
    }
}

#[test]
fn test_exhausted_table_progression_is_an_error() {
    // Seventeen keys can never fit a single 16-slot table.
    let names: Vec<String> = (0..17).map(|i| format!("key_{:02}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let config = KeyMapConfig {
        max_table_size: 16,
        bucket_width: Some(16),
        skip_strategies: vec![
            StrategyTag::SingleByte,
            StrategyTag::FirstByteAndUniqueIndex,
            StrategyTag::UniqueByteAndLength,
            StrategyTag::UniquePerLength,
        ],
        ..Default::default()
    };
    let result = select_with(&refs, &config);
    assert!(matches!(
        result,
        Err(KeyMapError::TableExhausted {
            key_count: 17,
            max_table_size: 16
        })
    ));
}

//==================================================================================
// Selected layouts always build
//==================================================================================

#[test]
fn test_every_selected_layout_builds() {
    let sets: &[&[&str]] = &[
        &[],
        &["only"],
        &["bx", "ay"],
        &["x", "y", "z"],
        &["aa", "ab", "ba", "bb"],
        &["ab", "abc"],
        &["a", "ab", "ba"],
        &["xab", "xba", "xaa"],
    ];
    for names in sets {
        let keys: Vec<&[u8]> = names.iter().map(|n| n.as_bytes()).collect();
        let strategy = select(names);
        let tables = build_tables(&keys, &strategy).unwrap();
        let matches_tag = matches!(
            (&tables, strategy.tag()),
            (Tables::Empty, StrategyTag::Empty)
                | (Tables::SingleElement, StrategyTag::SingleElement)
                | (Tables::DoubleElement(_), StrategyTag::DoubleElement)
                | (Tables::SingleByte(_), StrategyTag::SingleByte)
                | (Tables::FirstByteAndUniqueIndex(_), StrategyTag::FirstByteAndUniqueIndex)
                | (Tables::UniqueByteAndLength(_), StrategyTag::UniqueByteAndLength)
                | (Tables::UniquePerLength(_), StrategyTag::UniquePerLength)
                | (Tables::SimdFullLength(_), StrategyTag::SimdFullLength)
        );
        assert!(matches_tag, "{:?} built the wrong tables", names);
    }
}
