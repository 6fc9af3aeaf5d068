//! This file is the root of the `perfkey` Rust crate.
//!
//! perfkey maps the member names of a fixed JSON object shape to dense field
//! indices. For every shape it picks, once, the cheapest lookup layout that
//! separates that shape's keys (a single byte, a byte plus the key length, or a
//! SIMD-probed hash table) and then resolves each object key with a handful of
//! table reads.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`planner`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types a JSON codec needs.
//!
//! ```
//! use perfkey::{KeyMap, KeyMapConfig};
//!
//! let map = KeyMap::from_names(["id", "name", "email"], &KeyMapConfig::default()).unwrap();
//! assert_eq!(map.find_in_buffer(b"email\": \"a@b.c\""), Some(2));
//! assert_eq!(map.find(b"phone"), None);
//! ```

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod planner;
pub mod resolver;
pub mod types;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use bridge::{KeyMap, KeyMapCell, StrategyReport};
pub use config::KeyMapConfig;
pub use error::KeyMapError;
pub use kernels::KeyHasher;
pub use observability::enable_verbose_logging;
pub use planner::{Strategy, StrategyTag};
pub use resolver::Resolver;
pub use types::{FieldKeys, Key, KeySet};
