//! Scalar reference kernels.
//!
//! Ground truth for the SIMD paths, the fallback on targets without SIMD
//! support, and the tail loop for rows whose width is not a multiple of
//! the lane size.

/// Normalization factor applied to the integer weighted-SAD total.
///
/// Brings the quadratically weighted cost into a workable range; the
/// constant is inherited from the original cost function this metric
/// reproduces.
pub const SAD_WEIGHT_SCALE: f64 = 1.5378700499807766e-6;

/// Sum of squared R/G/B differences, scalar reference implementation.
///
/// Visits every pixel in row-major order, computes `i32` channel deltas
/// for R, G and B (alpha is never read), and accumulates the squares in
/// a `u64` that is converted to `f64` once at the end. Preconditions as
/// documented on [`crate::kernel`].
pub fn ssd_scalar(a: &[u8], b: &[u8], stride: usize, width: usize, height: usize) -> f64 {
    let mut sum = 0u64;
    for y in 0..height {
        sum += ssd_pixels(a, b, y * stride, width);
    }
    sum as f64
}

/// Squared R/G/B differences of `count` consecutive pixels starting at
/// byte offset `offset`. Shared between the scalar kernel and the SIMD
/// remainder loops.
pub(crate) fn ssd_pixels(a: &[u8], b: &[u8], offset: usize, count: usize) -> u64 {
    let mut sum = 0u64;
    for x in 0..count {
        let i = offset + x * 4;
        let dr = i32::from(a[i]) - i32::from(b[i]);
        let dg = i32::from(a[i + 1]) - i32::from(b[i + 1]);
        let db = i32::from(a[i + 2]) - i32::from(b[i + 2]);
        sum += (dr * dr + dg * dg + db * db) as u64;
    }
    sum
}

/// Quadratically weighted SAD cost, scalar reference implementation.
///
/// Per pixel, `value = |dr| + |dg| + |db|` contributes
/// `value * (255 + 9 * value)` to an integer total which is scaled by
/// [`SAD_WEIGHT_SCALE`] at the end. Both factors stay exact in 64 bits,
/// so scalar and SIMD totals agree bit-for-bit after the single final
/// floating-point multiply.
pub fn sad_weighted_scalar(a: &[u8], b: &[u8], stride: usize, width: usize, height: usize) -> f64 {
    let mut total = 0u64;
    for y in 0..height {
        total += sad_weighted_pixels(a, b, y * stride, width);
    }
    total as f64 * SAD_WEIGHT_SCALE
}

/// Integer weighted-SAD contribution of `count` consecutive pixels
/// starting at byte offset `offset`.
pub(crate) fn sad_weighted_pixels(a: &[u8], b: &[u8], offset: usize, count: usize) -> u64 {
    let mut sum = 0u64;
    for x in 0..count {
        let i = offset + x * 4;
        let dr = (i32::from(a[i]) - i32::from(b[i])).abs();
        let dg = (i32::from(a[i + 1]) - i32::from(b[i + 1])).abs();
        let db = (i32::from(a[i + 2]) - i32::from(b[i + 2])).abs();
        let value = dr + dg + db;
        sum += (value * (255 + 9 * value)) as u64;
    }
    sum
}
