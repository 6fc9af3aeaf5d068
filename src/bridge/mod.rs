// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public face of the perfkey library. It wraps the planner
// (strategy selection and table construction) and the resolver (the per-key
// lookup) behind one value type, `KeyMap`, and adds the two ways a parser obtains
// one: lazily at run time, or as generated source at build time.
//
// Build Phase (once per shape):
//
//   1. [KeyMap::build]            -> Receives a `KeySet` and a `KeyMapConfig`
//         |
//         `-> a. Precondition checks (empty set, delimiter inside a key)
//         |
//         `-> b. `planner::stats`    -> min/max length, unique column
//         |
//         `-> c. `planner::selector` -> the strategy cascade, first accept wins
//         |
//         `-> d. `Resolver::build`   -> immutable lookup tables
//
//   2. [KeyMapCell / static_key_map!] -> Runs step 1 on first use, then shares the
//                                        result process-wide.
//
//   3. [codegen::emit]            -> Renders the built tables and a dispatch-free
//                                    resolve function as Rust source.
//
// Lookup Phase (per object key):
//
//   [KeyMap::resolve]   -> candidate index or the sentinel N
//   [KeyMap::find*]     -> candidate plus the exact comparison
//
// ====================================================================================
pub mod codegen;
pub mod format;
pub mod key_map;
pub mod static_map;

// --- High-Level API ---
pub use key_map::KeyMap;
pub use static_map::KeyMapCell;

// --- Diagnostics and Build-Time Generation ---
pub use codegen::{emit, CodegenOptions};
pub use format::StrategyReport;
