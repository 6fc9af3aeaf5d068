//! This module contains the bucket-compare kernels for the SIMD fallback layout.
//!
//! A bucket is a run of one-byte control tags. Looking a key up means comparing
//! every tag in its bucket against the key's fingerprint at once and taking the
//! first hit. `GroupMatch` is that capability: a portable SWAR implementation
//! that works everywhere, plus width-specific implementations picked by `cfg`
//! at build time. `NativeGroup` names the widest one compiled in.

/// Compares a fixed-width group of control bytes against one broadcast tag.
pub trait GroupMatch: Copy {
    /// Number of control bytes in one group.
    const WIDTH: usize;

    /// Loads the first `WIDTH` bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than `WIDTH`.
    fn load(bytes: &[u8]) -> Self;

    /// Lane index of the first control byte equal to `tag`.
    fn first_match(self, tag: u8) -> Option<usize>;
}

//==================================================================================
// 1. Portable SWAR (8 lanes)
//==================================================================================
const LOW_SEVEN: u64 = 0x7F7F_7F7F_7F7F_7F7F;
const LANE_ONES: u64 = 0x0101_0101_0101_0101;

/// Eight control bytes packed into a `u64`, lane 0 in the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarGroup(u64);

impl ScalarGroup {
    /// High bit of each byte set exactly where the lane equals `tag`.
    #[inline(always)]
    fn match_high_bits(self, tag: u8) -> u64 {
        let x = self.0 ^ LANE_ONES.wrapping_mul(tag as u64);
        let y = (x & LOW_SEVEN).wrapping_add(LOW_SEVEN);
        !(y | x | LOW_SEVEN)
    }

    /// One bit per lane: bit `i` is set when lane `i` equals `tag`.
    #[inline]
    pub fn match_mask(self, tag: u8) -> u8 {
        let bits = self.match_high_bits(tag) >> 7;
        (bits.wrapping_mul(0x0102_0408_1020_4080) >> 56) as u8
    }
}

impl GroupMatch for ScalarGroup {
    const WIDTH: usize = 8;

    #[inline(always)]
    fn load(bytes: &[u8]) -> Self {
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[..Self::WIDTH]);
        ScalarGroup(u64::from_le_bytes(word))
    }

    #[inline(always)]
    fn first_match(self, tag: u8) -> Option<usize> {
        let hits = self.match_high_bits(tag);
        if hits == 0 {
            None
        } else {
            Some(hits.trailing_zeros() as usize / 8)
        }
    }
}

//==================================================================================
// 2. x86_64: SSE2 (16 lanes) and AVX2 (32 lanes)
//==================================================================================
#[cfg(target_arch = "x86_64")]
pub use x86::Sse2Group;

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
pub use x86::Avx2Group;

#[cfg(target_arch = "x86_64")]
mod x86 {
    use super::GroupMatch;
    use std::arch::x86_64::*;

    #[derive(Debug, Clone, Copy)]
    pub struct Sse2Group(__m128i);

    impl GroupMatch for Sse2Group {
        const WIDTH: usize = 16;

        #[inline(always)]
        fn load(bytes: &[u8]) -> Self {
            let bytes = &bytes[..Self::WIDTH];
            // SAFETY: SSE2 is part of the x86_64 baseline and the slice above holds
            // exactly 16 readable bytes; the load is unaligned.
            unsafe { Sse2Group(_mm_loadu_si128(bytes.as_ptr() as *const __m128i)) }
        }

        #[inline(always)]
        fn first_match(self, tag: u8) -> Option<usize> {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            let mask = unsafe {
                let eq = _mm_cmpeq_epi8(self.0, _mm_set1_epi8(tag as i8));
                _mm_movemask_epi8(eq) as u32
            };
            if mask == 0 {
                None
            } else {
                Some(mask.trailing_zeros() as usize)
            }
        }
    }

    #[cfg(target_feature = "avx2")]
    #[derive(Debug, Clone, Copy)]
    pub struct Avx2Group(__m256i);

    #[cfg(target_feature = "avx2")]
    impl GroupMatch for Avx2Group {
        const WIDTH: usize = 32;

        #[inline(always)]
        fn load(bytes: &[u8]) -> Self {
            let bytes = &bytes[..Self::WIDTH];
            // SAFETY: this impl only exists when AVX2 is enabled at build time, and
            // the slice above holds exactly 32 readable bytes.
            unsafe { Avx2Group(_mm256_loadu_si256(bytes.as_ptr() as *const __m256i)) }
        }

        #[inline(always)]
        fn first_match(self, tag: u8) -> Option<usize> {
            // SAFETY: AVX2 is enabled at build time.
            let mask = unsafe {
                let eq = _mm256_cmpeq_epi8(self.0, _mm256_set1_epi8(tag as i8));
                _mm256_movemask_epi8(eq) as u32
            };
            if mask == 0 {
                None
            } else {
                Some(mask.trailing_zeros() as usize)
            }
        }
    }
}

//==================================================================================
// 3. aarch64: NEON (16 lanes)
//==================================================================================
#[cfg(target_arch = "aarch64")]
pub use arm::NeonGroup;

#[cfg(target_arch = "aarch64")]
mod arm {
    use super::GroupMatch;
    use std::arch::aarch64::*;

    #[derive(Debug, Clone, Copy)]
    pub struct NeonGroup(uint8x16_t);

    impl GroupMatch for NeonGroup {
        const WIDTH: usize = 16;

        #[inline(always)]
        fn load(bytes: &[u8]) -> Self {
            let bytes = &bytes[..Self::WIDTH];
            // SAFETY: NEON is part of the aarch64 baseline and the slice above holds
            // exactly 16 readable bytes.
            unsafe { NeonGroup(vld1q_u8(bytes.as_ptr())) }
        }

        #[inline(always)]
        fn first_match(self, tag: u8) -> Option<usize> {
            // NEON has no movemask; narrowing by 4 leaves one nibble per lane.
            // SAFETY: NEON is part of the aarch64 baseline.
            let nibbles = unsafe {
                let eq = vceqq_u8(self.0, vdupq_n_u8(tag));
                let narrowed = vshrn_n_u16::<4>(vreinterpretq_u16_u8(eq));
                vget_lane_u64::<0>(vreinterpret_u64_u8(narrowed))
            };
            if nibbles == 0 {
                None
            } else {
                Some(nibbles.trailing_zeros() as usize / 4)
            }
        }
    }
}

//==================================================================================
// 4. Native Selection & Generic Bucket Scan
//==================================================================================

/// The widest group compiled into this build.
#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
pub type NativeGroup = Avx2Group;

/// The widest group compiled into this build.
#[cfg(all(target_arch = "x86_64", not(target_feature = "avx2")))]
pub type NativeGroup = Sse2Group;

/// The widest group compiled into this build.
#[cfg(target_arch = "aarch64")]
pub type NativeGroup = NeonGroup;

/// The widest group compiled into this build.
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub type NativeGroup = ScalarGroup;

/// Index of the first byte in `bucket` equal to `tag`.
///
/// `bucket.len()` must be a multiple of 8. Buckets at least as wide as the native
/// group are scanned with it; whatever remains goes through the SWAR group.
#[inline]
pub fn first_match(bucket: &[u8], tag: u8) -> Option<usize> {
    let mut offset = 0;
    while bucket.len() - offset >= NativeGroup::WIDTH {
        if let Some(lane) = NativeGroup::load(&bucket[offset..]).first_match(tag) {
            return Some(offset + lane);
        }
        offset += NativeGroup::WIDTH;
    }
    while bucket.len() - offset >= ScalarGroup::WIDTH {
        if let Some(lane) = ScalarGroup::load(&bucket[offset..]).first_match(tag) {
            return Some(offset + lane);
        }
        offset += ScalarGroup::WIDTH;
    }
    debug_assert_eq!(offset, bucket.len(), "bucket width must be a multiple of 8");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive(bytes: &[u8], tag: u8) -> Option<usize> {
        bytes.iter().position(|&b| b == tag)
    }

    fn check_group<G: GroupMatch>() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        for _ in 0..2000 {
            // Small alphabet so matches are common and often repeated.
            let bytes: Vec<u8> = (0..G::WIDTH).map(|_| rng.random_range(0..6u8) * 51).collect();
            let tag = rng.random_range(0..6u8) * 51;
            assert_eq!(G::load(&bytes).first_match(tag), naive(&bytes, tag), "{:?} / {}", bytes, tag);
        }
    }

    #[test]
    fn test_scalar_group_matches_naive_scan() {
        check_group::<ScalarGroup>();
    }

    #[test]
    fn test_native_group_matches_naive_scan() {
        check_group::<NativeGroup>();
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse2_group_matches_naive_scan() {
        check_group::<Sse2Group>();
    }

    #[test]
    fn test_scalar_mask_has_one_bit_per_lane() {
        let group = ScalarGroup::load(&[7, 0xFF, 7, 0x80, 0x00, 7, 0x7F, 7]);
        assert_eq!(group.match_mask(7), 0b1010_0101);
        assert_eq!(group.match_mask(0xFF), 0b0000_0010);
        assert_eq!(group.match_mask(0x00), 0b0001_0000);
        assert_eq!(group.match_mask(0x42), 0);
    }

    #[test]
    fn test_swar_has_no_false_positive_above_a_match() {
        // 0x01 followed by 0x00: the borrow trick would flag the 0x01 lane too.
        let group = ScalarGroup::load(&[0x00, 0x01, 0x00, 0x01, 0x80, 0x81, 0xFF, 0xFE]);
        assert_eq!(group.match_mask(0x00), 0b0000_0101);
        assert_eq!(group.match_mask(0xFF), 0b0100_0000);
    }

    #[test]
    fn test_first_match_across_wide_buckets() {
        for width in [8usize, 16, 32, 64] {
            let mut bucket = vec![0xFFu8; width];
            assert_eq!(first_match(&bucket, 0x12), None);
            bucket[width - 1] = 0x12;
            assert_eq!(first_match(&bucket, 0x12), Some(width - 1));
            bucket[width / 2] = 0x12;
            assert_eq!(first_match(&bucket, 0x12), Some(width / 2));
        }
    }
}
