//! This module contains the seeded 64-bit key hash used by the SIMD fallback layout.
//!
//! Every function here is a `const fn`. The planner evaluates the hash while
//! searching for a collision-free seed, the resolver evaluates it per lookup, and
//! generated code may evaluate it inside a `const` item. All three run this one
//! body, so a table laid out at build time is reproduced bit-for-bit at run time.
//!
//! Inputs are read little-endian byte by byte, so results do not depend on the
//! host's endianness either.
//!
//! The mixing follows the xxh3 family: short inputs take an FNV-style multiply
//! chain, medium inputs mix 16-byte lanes against a seed-derived secret, and every
//! path ends in the xxh3 avalanche so the low 8-11 bits used for buckets and
//! fingerprints are well distributed.

//==================================================================================
// 0. Constants
//==================================================================================
const PRIME64_1: u64 = 0x9E37_79B1_85EB_CA87;
const PRIME64_2: u64 = 0xC2B2_AE3D_27D4_EB4F;
const PRIME_MX1: u64 = 0x1656_6791_9E37_79F9;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Size of the default secret in 64-bit words (192 bytes).
const SECRET_WORDS: usize = 24;

/// The xxh3 default secret, as little-endian 64-bit words.
const DEFAULT_SECRET: [u64; SECRET_WORDS] = [
    0xbe4b_a423_396c_feb8,
    0x1cad_21f7_2c81_017c,
    0xdb97_9083_e96d_d4de,
    0x1f67_b3b7_a4a4_4072,
    0x78e5_c0cc_4ee6_79cb,
    0x2172_ffcc_7dd0_5a82,
    0x8e24_43f7_7446_08b8,
    0x4c26_3a81_e690_35e0,
    0xcb00_c391_bb52_283c,
    0xa32e_531b_8b65_d088,
    0x4ef9_0da2_9748_6471,
    0xd8ac_dea9_46ef_1938,
    0x3f34_9ce3_3f76_faa8,
    0x1d4f_0bc7_c7bb_dcf9,
    0x3159_b4cd_4be0_518a,
    0x6478_73d9_c97e_9fc8,
    0x8334_acc5_ea64_3d7b,
    0x13fa_ffa0_81c5_c3eb,
    0xdab7_51dd_0d17_eb63,
    0x2955_1655_d349_f0ee,
    0xbe16_2bd4_68d4_2926,
    0xf8fc_a147_7d58_be16,
    0x31d0_7ad1_b8f8_8fd1,
    0x0416_958f_3acb_45ce,
];

//==================================================================================
// 1. Byte Readers & Mixers
//==================================================================================

#[inline(always)]
const fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut value = 0u64;
    let mut i = 0;
    while i < 8 {
        value |= (bytes[at + i] as u64) << (8 * i);
        i += 1;
    }
    value
}

#[inline(always)]
const fn read_u32(bytes: &[u8], at: usize) -> u64 {
    let mut value = 0u64;
    let mut i = 0;
    while i < 4 {
        value |= (bytes[at + i] as u64) << (8 * i);
        i += 1;
    }
    value
}

#[inline(always)]
const fn read_u16(bytes: &[u8], at: usize) -> u64 {
    (bytes[at] as u64) | ((bytes[at + 1] as u64) << 8)
}

/// Multiplies two 64-bit values to 128 bits and folds the halves together.
#[inline(always)]
const fn mul128_fold64(lhs: u64, rhs: u64) -> u64 {
    let product = (lhs as u128).wrapping_mul(rhs as u128);
    (product as u64) ^ ((product >> 64) as u64)
}

/// The xxh3 avalanche: a final xor-shift / multiply / xor-shift.
#[inline(always)]
pub const fn avalanche(mut h64: u64) -> u64 {
    h64 ^= h64 >> 37;
    h64 = h64.wrapping_mul(PRIME_MX1);
    h64 ^ (h64 >> 32)
}

//==================================================================================
// 2. The Seeded Hasher
//==================================================================================

/// A seeded key hasher. Two hashers built from the same seed always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHasher {
    seed: u64,
    secret: [u64; SECRET_WORDS],
}

impl KeyHasher {
    /// Derives the per-seed secret: the low word of each 16-byte lane is shifted
    /// up by the seed, the high word down.
    pub const fn new(seed: u64) -> Self {
        let mut secret = DEFAULT_SECRET;
        let mut i = 0;
        while i < SECRET_WORDS {
            secret[i] = if i % 2 == 0 {
                DEFAULT_SECRET[i].wrapping_add(seed)
            } else {
                DEFAULT_SECRET[i].wrapping_sub(seed)
            };
            i += 1;
        }
        Self { seed, secret }
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Hashes all of `bytes`.
    #[inline]
    pub const fn hash(&self, bytes: &[u8]) -> u64 {
        self.hash_prefix(bytes, bytes.len())
    }

    /// Hashes the first `len` bytes of `bytes` (all of them if `len` is larger).
    #[inline]
    pub const fn hash_prefix(&self, bytes: &[u8], len: usize) -> u64 {
        let len = if len > bytes.len() { bytes.len() } else { len };
        if len <= 8 {
            self.hash_short(bytes, len)
        } else if len <= 16 {
            self.hash_9_to_16(bytes, len)
        } else if len <= 128 {
            self.hash_17_to_128(bytes, len)
        } else {
            self.hash_long(bytes, len)
        }
    }

    #[inline(always)]
    const fn hash_short(&self, bytes: &[u8], len: usize) -> u64 {
        let mut h = self.seed ^ (len as u64).wrapping_mul(PRIME64_1);
        let mut at = 0;
        let mut remaining = len;
        if remaining == 8 {
            h = (h ^ read_u64(bytes, at)).wrapping_mul(FNV_PRIME);
            at += 8;
            remaining -= 8;
        }
        if remaining >= 4 {
            h = (h ^ read_u32(bytes, at)).wrapping_mul(FNV_PRIME);
            at += 4;
            remaining -= 4;
        }
        if remaining >= 2 {
            h = (h ^ read_u16(bytes, at)).wrapping_mul(FNV_PRIME);
            at += 2;
            remaining -= 2;
        }
        if remaining == 1 {
            h = (h ^ bytes[at] as u64).wrapping_mul(FNV_PRIME);
        }
        avalanche(h)
    }

    #[inline(always)]
    const fn hash_9_to_16(&self, bytes: &[u8], len: usize) -> u64 {
        let bitflip = (self.secret[5] ^ self.secret[6]).wrapping_sub(self.seed);
        let input_lo = read_u64(bytes, 0) ^ bitflip;
        let input_hi = read_u64(bytes, len - 8) ^ bitflip;
        let acc = (len as u64)
            .wrapping_add(input_lo.swap_bytes())
            .wrapping_add(input_hi)
            .wrapping_add(mul128_fold64(input_lo, input_hi));
        avalanche(acc)
    }

    #[inline(always)]
    const fn mix16(&self, bytes: &[u8], at: usize, secret_word: usize) -> u64 {
        let input_lo = read_u64(bytes, at);
        let input_hi = read_u64(bytes, at + 8);
        mul128_fold64(
            input_lo ^ self.secret[secret_word].wrapping_add(self.seed),
            input_hi ^ self.secret[secret_word + 1].wrapping_sub(self.seed),
        )
    }

    const fn hash_17_to_128(&self, bytes: &[u8], len: usize) -> u64 {
        let mut acc = (len as u64).wrapping_mul(PRIME64_1);
        if len > 32 {
            if len > 64 {
                if len > 96 {
                    acc = acc.wrapping_add(self.mix16(bytes, 48, 12));
                    acc = acc.wrapping_add(self.mix16(bytes, len - 64, 14));
                }
                acc = acc.wrapping_add(self.mix16(bytes, 32, 8));
                acc = acc.wrapping_add(self.mix16(bytes, len - 48, 10));
            }
            acc = acc.wrapping_add(self.mix16(bytes, 16, 4));
            acc = acc.wrapping_add(self.mix16(bytes, len - 32, 6));
        }
        acc = acc.wrapping_add(self.mix16(bytes, 0, 0));
        acc = acc.wrapping_add(self.mix16(bytes, len - 16, 2));
        avalanche(acc)
    }

    /// Keys longer than 128 bytes: every 16-byte stripe is mixed against the
    /// secret in turn, with a scramble after each full pass over the secret.
    const fn hash_long(&self, bytes: &[u8], len: usize) -> u64 {
        const LANES: usize = SECRET_WORDS / 2 - 1;
        let mut acc = (len as u64).wrapping_mul(PRIME64_1);
        let stripes = (len - 1) / 16;
        let mut stripe = 0;
        while stripe < stripes {
            let lane = stripe % LANES;
            acc = acc.wrapping_add(self.mix16(bytes, stripe * 16, lane * 2));
            if lane == LANES - 1 {
                acc ^= acc >> 47;
                acc = acc.wrapping_mul(PRIME64_2);
            }
            stripe += 1;
        }
        acc = acc.wrapping_add(self.mix16(bytes, len - 16, SECRET_WORDS - 2));
        avalanche(acc)
    }
}
