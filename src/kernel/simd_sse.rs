//! x86_64 lane kernels for the RGB difference metrics.
//!
//! Each iteration processes 8 RGBA pixels (32 bytes, two 128-bit loads
//! per image) under an `X64V3Token`; the per-row remainder of
//! `width mod 8` pixels goes through the scalar helpers.
//!
//! Alpha exclusion is mask-before-square: the alpha byte of *both*
//! operands is zeroed before any widening or arithmetic, so pairwise
//! primitives can never leak an alpha term into the total. In
//! particular `_mm_madd_epi16` sums the widened index pairs
//! (0,1),(2,3),... — per pixel that is (dr²+dg²) and (db²+da²), and the
//! mask makes the second pair exactly db².

use archmage::{arcane, X64V3Token};
use core::arch::x86_64::*;
use safe_unaligned_simd::x86_64 as simd_mem;

use super::scalar;

/// Pixels per SIMD iteration.
const LANE_PIXELS: usize = 8;

/// Sum of squared R/G/B differences, 8 pixels per iteration.
#[arcane]
pub(crate) fn ssd_x64(
    _token: X64V3Token,
    a: &[u8],
    b: &[u8],
    stride: usize,
    width: usize,
    height: usize,
) -> f64 {
    let zero = _mm_setzero_si128();
    // RGBA bytes read little-endian as u32 put alpha in the high byte.
    let rgb_mask = _mm_set1_epi32(0x00FF_FFFF);
    let full = width - width % LANE_PIXELS;

    // Two u64 lanes; widened into every iteration so the 32-bit partial
    // sums never accumulate across iterations.
    let mut acc = _mm_setzero_si128();
    let mut tail = 0u64;

    for y in 0..height {
        let row = y * stride;
        let mut x = 0;
        while x < full {
            let i = row + x * 4;
            let a0 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&a[i..][..16]).unwrap());
            let a1 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&a[i + 16..][..16]).unwrap());
            let b0 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&b[i..][..16]).unwrap());
            let b1 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&b[i + 16..][..16]).unwrap());

            let a0 = _mm_and_si128(a0, rgb_mask);
            let a1 = _mm_and_si128(a1, rgb_mask);
            let b0 = _mm_and_si128(b0, rgb_mask);
            let b1 = _mm_and_si128(b1, rgb_mask);

            // Widen to i16 and subtract; alpha lanes are zero on both sides.
            let d0 = _mm_sub_epi16(_mm_unpacklo_epi8(a0, zero), _mm_unpacklo_epi8(b0, zero));
            let d1 = _mm_sub_epi16(_mm_unpackhi_epi8(a0, zero), _mm_unpackhi_epi8(b0, zero));
            let d2 = _mm_sub_epi16(_mm_unpacklo_epi8(a1, zero), _mm_unpacklo_epi8(b1, zero));
            let d3 = _mm_sub_epi16(_mm_unpackhi_epi8(a1, zero), _mm_unpackhi_epi8(b1, zero));

            // madd pairs (dr²+dg²) and (db²+0) into i32 lanes.
            let sq = _mm_add_epi32(
                _mm_add_epi32(_mm_madd_epi16(d0, d0), _mm_madd_epi16(d1, d1)),
                _mm_add_epi32(_mm_madd_epi16(d2, d2), _mm_madd_epi16(d3, d3)),
            );

            // Lane maximum here is 4 * 2 * 255² < 2^31; zero-extend the
            // non-negative i32 lanes into the u64 accumulator.
            acc = _mm_add_epi64(acc, _mm_unpacklo_epi32(sq, zero));
            acc = _mm_add_epi64(acc, _mm_unpackhi_epi32(sq, zero));

            x += LANE_PIXELS;
        }
        if full < width {
            tail += scalar::ssd_pixels(a, b, row + full * 4, width - full);
        }
    }

    let lo = _mm_cvtsi128_si64(acc) as u64;
    let hi = _mm_cvtsi128_si64(_mm_unpackhi_epi64(acc, acc)) as u64;
    (lo + hi + tail) as f64
}

/// Quadratically weighted SAD cost, 8 pixels per iteration.
///
/// The per-pixel `value * (255 + 9 * value)` terms are exact in i32
/// (value ≤ 765, weight ≤ 7140), so the integer total matches the scalar
/// kernel and the final scaled `f64` is bit-identical.
#[arcane]
pub(crate) fn sad_weighted_x64(
    _token: X64V3Token,
    a: &[u8],
    b: &[u8],
    stride: usize,
    width: usize,
    height: usize,
) -> f64 {
    let zero = _mm_setzero_si128();
    let rgb_mask = _mm_set1_epi32(0x00FF_FFFF);
    let ones = _mm_set1_epi16(1);
    let nine = _mm_set1_epi32(9);
    let bias = _mm_set1_epi32(255);
    let full = width - width % LANE_PIXELS;

    let mut acc = _mm_setzero_si128();
    let mut tail = 0u64;

    for y in 0..height {
        let row = y * stride;
        let mut x = 0;
        while x < full {
            let i = row + x * 4;
            let a0 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&a[i..][..16]).unwrap());
            let a1 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&a[i + 16..][..16]).unwrap());
            let b0 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&b[i..][..16]).unwrap());
            let b1 = simd_mem::_mm_loadu_si128(<&[u8; 16]>::try_from(&b[i + 16..][..16]).unwrap());

            let a0 = _mm_and_si128(a0, rgb_mask);
            let a1 = _mm_and_si128(a1, rgb_mask);
            let b0 = _mm_and_si128(b0, rgb_mask);
            let b1 = _mm_and_si128(b1, rgb_mask);

            // |a - b| per byte via the saturating-subtract-both-ways trick;
            // alpha bytes stay zero.
            let d0 = _mm_or_si128(_mm_subs_epu8(a0, b0), _mm_subs_epu8(b0, a0));
            let d1 = _mm_or_si128(_mm_subs_epu8(a1, b1), _mm_subs_epu8(b1, a1));

            // Per-pixel value = |dr|+|dg|+|db|: madd against ones sums the
            // channel pairs (|dr|+|dg|, |db|+0), hadd folds the pairs.
            let p01 = _mm_madd_epi16(_mm_unpacklo_epi8(d0, zero), ones);
            let p23 = _mm_madd_epi16(_mm_unpackhi_epi8(d0, zero), ones);
            let p45 = _mm_madd_epi16(_mm_unpacklo_epi8(d1, zero), ones);
            let p67 = _mm_madd_epi16(_mm_unpackhi_epi8(d1, zero), ones);
            let v03 = _mm_hadd_epi32(p01, p23);
            let v47 = _mm_hadd_epi32(p45, p67);

            // weighted = value * (255 + 9 * value), exact in i32.
            let w03 = _mm_mullo_epi32(v03, _mm_add_epi32(_mm_mullo_epi32(v03, nine), bias));
            let w47 = _mm_mullo_epi32(v47, _mm_add_epi32(_mm_mullo_epi32(v47, nine), bias));

            let sum32 = _mm_add_epi32(w03, w47);
            acc = _mm_add_epi64(acc, _mm_unpacklo_epi32(sum32, zero));
            acc = _mm_add_epi64(acc, _mm_unpackhi_epi32(sum32, zero));

            x += LANE_PIXELS;
        }
        if full < width {
            tail += scalar::sad_weighted_pixels(a, b, row + full * 4, width - full);
        }
    }

    let lo = _mm_cvtsi128_si64(acc) as u64;
    let hi = _mm_cvtsi128_si64(_mm_unpackhi_epi64(acc, acc)) as u64;
    (lo + hi + tail) as f64 * scalar::SAD_WEIGHT_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use archmage::SimdToken;

    fn fill_pattern(buf: &mut [u8], mul: usize, add: usize) {
        for (i, v) in buf.iter_mut().enumerate() {
            *v = ((i * mul + add) % 256) as u8;
        }
    }

    #[test]
    fn lane_kernels_match_scalar() {
        let Some(token) = X64V3Token::summon() else {
            return;
        };

        for width in [8usize, 9, 10, 16, 23, 64] {
            let height = 4;
            let stride = width * 4 + 4;
            let mut a = vec![0u8; stride * height];
            let mut b = vec![0u8; stride * height];
            fill_pattern(&mut a, 37, 11);
            fill_pattern(&mut b, 41, 5);

            assert_eq!(
                ssd_x64(token, &a, &b, stride, width, height),
                scalar::ssd_scalar(&a, &b, stride, width, height),
                "ssd width {width}"
            );
            assert_eq!(
                sad_weighted_x64(token, &a, &b, stride, width, height),
                scalar::sad_weighted_scalar(&a, &b, stride, width, height),
                "sad width {width}"
            );
        }
    }

    #[test]
    fn lane_kernel_excludes_alpha() {
        let Some(token) = X64V3Token::summon() else {
            return;
        };

        // One full lane where only alpha differs.
        let a = [50u8, 60, 70, 255].repeat(8);
        let b = [50u8, 60, 70, 0].repeat(8);
        assert_eq!(ssd_x64(token, &a, &b, 32, 8, 1), 0.0);
        assert_eq!(sad_weighted_x64(token, &a, &b, 32, 8, 1), 0.0);
    }
}
