//! This module contains the deterministic seed sequence used by the SIMD fallback
//! layout search.
//!
//! The generator is a xoshiro256 variant with a fixed default state, so a given
//! key set always walks the same seed sequence and always produces the same
//! tables. It implements `rand`'s `RngCore` and `SeedableRng`, which lets tests and
//! tools drive it through the usual `rand` APIs.

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};

const DEFAULT_STATE_SEED: u64 = 7_185_499_250_578_500_046;

/// Returns `(output, next_state)`.
#[inline(always)]
const fn splitmix64(state: u64) -> (u64, u64) {
    let next = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = next;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), next)
}

/// A small, fast, fully deterministic 64-bit generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xoshiro256 {
    state: [u64; 4],
}

impl Xoshiro256 {
    /// The fixed default state.
    pub const fn new() -> Self {
        Self::from_state_seed(DEFAULT_STATE_SEED)
    }

    /// A reseeded sequence. `with_seed(s)` for distinct `s` yields unrelated
    /// sequences; none of them equals the default one.
    pub const fn with_seed(seed: u64) -> Self {
        Self::from_state_seed(DEFAULT_STATE_SEED ^ splitmix64(seed).0)
    }

    const fn from_state_seed(seed: u64) -> Self {
        let mut x = seed >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        let mut s = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        let mut state = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            let (value, next) = splitmix64(s);
            state[i] = value;
            s = next;
            i += 1;
        }
        Self { state }
    }

    /// Advances the sequence and returns the next value.
    #[inline]
    pub fn next_seed(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;

        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];

        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);

        result
    }
}

impl Default for Xoshiro256 {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for Xoshiro256 {
    fn next_u32(&mut self) -> u32 {
        (self.next_seed() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_seed()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for Xoshiro256 {
    type Seed = [u8; 32];

    /// An all-zero seed would lock the generator at zero forever; it maps to the
    /// default state instead.
    fn from_seed(seed: Self::Seed) -> Self {
        if seed.iter().all(|&b| b == 0) {
            return Self::new();
        }
        let mut state = [0u64; 4];
        for (word, chunk) in state.iter_mut().zip(seed.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_le_bytes(bytes);
        }
        Self { state }
    }

    fn seed_from_u64(seed: u64) -> Self {
        Self::with_seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default_sequence_is_reproducible() {
        let mut a = Xoshiro256::new();
        let mut b = Xoshiro256::default();
        for _ in 0..64 {
            assert_eq!(a.next_seed(), b.next_seed());
        }
    }

    #[test]
    fn test_const_construction_matches_runtime() {
        const DEFAULT: Xoshiro256 = Xoshiro256::new();
        let mut a = DEFAULT.clone();
        let mut b = Xoshiro256::new();
        assert_eq!(a.next_seed(), b.next_seed());
    }

    #[test]
    fn test_reseeding_changes_sequence() {
        let mut a = Xoshiro256::new();
        let mut b = Xoshiro256::with_seed(1);
        let mut c = Xoshiro256::seed_from_u64(2);
        let (x, y, z) = (a.next_seed(), b.next_seed(), c.next_seed());
        assert_ne!(x, y);
        assert_ne!(y, z);
    }

    #[test]
    fn test_zero_seed_is_not_stuck() {
        let mut rng = Xoshiro256::from_seed([0u8; 32]);
        let values: Vec<u64> = (0..4).map(|_| rng.next_u64()).collect();
        assert!(values.iter().any(|&v| v != 0));
    }

    #[test]
    fn test_works_through_rand_api() {
        let mut rng = Xoshiro256::new();
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
        let roll: u8 = rng.random_range(0..6);
        assert!(roll < 6);
    }
}
