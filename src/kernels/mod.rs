//! This module contains the pure, stateless leaf kernels used by the planner and
//! the resolver.
//!
//! Nothing in here knows about key sets or strategies. Each kernel is a small,
//! independently testable building block:
//! - `hash`: the seeded `const fn` key hash.
//! - `prng`: the deterministic seed sequence for layout search.
//! - `group`: bulk control-byte comparison (`GroupMatch`).
//! - `scan`: the bounded key-end scan.

pub mod group;
pub mod hash;
pub mod prng;
pub mod scan;

pub use group::{first_match, GroupMatch, NativeGroup, ScalarGroup};
pub use hash::KeyHasher;
pub use prng::Xoshiro256;
pub use scan::LengthWindow;
