//! aarch64 NEON lane kernels for the RGB difference metrics.
//!
//! Ported from the x86 versions in `simd_sse.rs`; each iteration
//! processes 4 RGBA pixels (one 16-byte load per image), with the scalar
//! helpers covering the per-row remainder. Alpha exclusion is the same
//! mask-before-square strategy: alpha bytes are zeroed before the
//! absolute difference, so every widened product involving them is zero.

use archmage::{arcane, NeonToken};
use core::arch::aarch64::*;
use safe_unaligned_simd::aarch64 as simd_mem;

use super::scalar;

/// Pixels per SIMD iteration.
const LANE_PIXELS: usize = 4;

/// Sum of squared R/G/B differences, 4 pixels per iteration.
#[arcane]
pub(crate) fn ssd_neon(
    _token: NeonToken,
    a: &[u8],
    b: &[u8],
    stride: usize,
    width: usize,
    height: usize,
) -> f64 {
    // RGBA bytes read little-endian as u32 put alpha in the high byte.
    let rgb_mask = vreinterpretq_u8_u32(vdupq_n_u32(0x00FF_FFFF));
    let full = width - width % LANE_PIXELS;

    let mut acc = vdupq_n_u64(0);
    let mut tail = 0u64;

    for y in 0..height {
        let row = y * stride;
        let mut x = 0;
        while x < full {
            let i = row + x * 4;
            let av = simd_mem::vld1q_u8(<&[u8; 16]>::try_from(&a[i..][..16]).unwrap());
            let bv = simd_mem::vld1q_u8(<&[u8; 16]>::try_from(&b[i..][..16]).unwrap());
            let av = vandq_u8(av, rgb_mask);
            let bv = vandq_u8(bv, rgb_mask);

            // |a - b| with alpha already zeroed; |d|² == d².
            let d = vabdq_u8(av, bv);
            let d_lo = vmovl_u8(vget_low_u8(d));
            let d_hi = vmovl_u8(vget_high_u8(d));

            let sq = vaddq_u32(
                vaddq_u32(
                    vmull_u16(vget_low_u16(d_lo), vget_low_u16(d_lo)),
                    vmull_u16(vget_high_u16(d_lo), vget_high_u16(d_lo)),
                ),
                vaddq_u32(
                    vmull_u16(vget_low_u16(d_hi), vget_low_u16(d_hi)),
                    vmull_u16(vget_high_u16(d_hi), vget_high_u16(d_hi)),
                ),
            );

            // Pairwise widen into the u64 accumulator every iteration so
            // the 32-bit lanes never accumulate across iterations.
            acc = vpadalq_u32(acc, sq);

            x += LANE_PIXELS;
        }
        if full < width {
            tail += scalar::ssd_pixels(a, b, row + full * 4, width - full);
        }
    }

    (vaddvq_u64(acc) + tail) as f64
}

/// Quadratically weighted SAD cost, 4 pixels per iteration.
#[arcane]
pub(crate) fn sad_weighted_neon(
    _token: NeonToken,
    a: &[u8],
    b: &[u8],
    stride: usize,
    width: usize,
    height: usize,
) -> f64 {
    let rgb_mask = vreinterpretq_u8_u32(vdupq_n_u32(0x00FF_FFFF));
    let bias = vdupq_n_u32(255);
    let full = width - width % LANE_PIXELS;

    let mut acc = vdupq_n_u64(0);
    let mut tail = 0u64;

    for y in 0..height {
        let row = y * stride;
        let mut x = 0;
        while x < full {
            let i = row + x * 4;
            let av = simd_mem::vld1q_u8(<&[u8; 16]>::try_from(&a[i..][..16]).unwrap());
            let bv = simd_mem::vld1q_u8(<&[u8; 16]>::try_from(&b[i..][..16]).unwrap());
            let av = vandq_u8(av, rgb_mask);
            let bv = vandq_u8(bv, rgb_mask);

            let d = vabdq_u8(av, bv);
            let d_lo = vmovl_u8(vget_low_u8(d));
            let d_hi = vmovl_u8(vget_high_u8(d));

            // Per-pixel value = |dr|+|dg|+|db|: pairwise adds fold the
            // channel pairs (|dr|+|dg|, |db|+0), then the pairs.
            let v = vpaddq_u32(vpaddlq_u16(d_lo), vpaddlq_u16(d_hi));

            // weighted = value * (255 + 9 * value), exact in u32.
            let weighted = vmulq_u32(v, vmlaq_n_u32(bias, v, 9));
            acc = vpadalq_u32(acc, weighted);

            x += LANE_PIXELS;
        }
        if full < width {
            tail += scalar::sad_weighted_pixels(a, b, row + full * 4, width - full);
        }
    }

    (vaddvq_u64(acc) + tail) as f64 * scalar::SAD_WEIGHT_SCALE
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
        let Some(token) = NeonToken::summon() else {
            return;
        };

        for width in [4usize, 5, 7, 8, 13, 64] {
            let height = 4;
            let stride = width * 4 + 4;
            let mut a = vec![0u8; stride * height];
            let mut b = vec![0u8; stride * height];
            fill_pattern(&mut a, 37, 11);
            fill_pattern(&mut b, 41, 5);

            assert_eq!(
                ssd_neon(token, &a, &b, stride, width, height),
                scalar::ssd_scalar(&a, &b, stride, width, height),
                "ssd width {width}"
            );
            assert_eq!(
                sad_weighted_neon(token, &a, &b, stride, width, height),
                scalar::sad_weighted_scalar(&a, &b, stride, width, height),
                "sad width {width}"
            );
        }
    }

    #[test]
    fn lane_kernel_excludes_alpha() {
        let Some(token) = NeonToken::summon() else {
            return;
        };

        let a = [50u8, 60, 70, 255].repeat(4);
        let b = [50u8, 60, 70, 0].repeat(4);
        assert_eq!(ssd_neon(token, &a, &b, 16, 4, 1), 0.0);
        assert_eq!(sad_weighted_neon(token, &a, &b, 16, 4, 1), 0.0);
    }
}
