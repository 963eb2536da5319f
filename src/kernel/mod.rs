//! Unchecked difference kernels with runtime SIMD dispatch.
//!
//! Every kernel takes two flat RGBA8 buffers plus `stride` (bytes per
//! row), `width` and `height` (pixels), and reduces to a single `f64`.
//!
//! Contract, checked by the callers in the crate root and *not* here:
//! each buffer holds at least `stride * height` bytes and
//! `stride >= width * 4`. The kernels index the slices directly, so a
//! violated contract panics on an out-of-range access rather than
//! reading out of bounds.
//!
//! The SIMD kernels are exact: for any valid input they return the same
//! `f64` as the scalar reference, because both sides accumulate the same
//! integers in 64 bits and convert once at the end.

pub mod scalar;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod simd_sse;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod simd_neon;

use core::fmt;

pub use scalar::SAD_WEIGHT_SCALE;

/// Kernel implementation selected by the runtime dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Portable scalar fallback.
    Scalar,
    /// 128-bit integer SIMD on an x86-64-v3 (AVX2-class) CPU.
    X64V3,
    /// 128-bit NEON on aarch64.
    Neon,
}

impl Backend {
    /// The backend the dispatcher will select on this machine.
    pub fn active() -> Backend {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            use archmage::SimdToken;
            if archmage::X64V3Token::summon().is_some() {
                return Backend::X64V3;
            }
        }
        #[cfg(all(feature = "simd", target_arch = "aarch64"))]
        {
            use archmage::SimdToken;
            if archmage::NeonToken::summon().is_some() {
                return Backend::Neon;
            }
        }
        Backend::Scalar
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Scalar => "scalar",
            Backend::X64V3 => "x86-64-v3",
            Backend::Neon => "NEON",
        };
        f.write_str(name)
    }
}

/// Sum of squared R/G/B differences between two RGBA8 buffers.
///
/// Alpha is excluded. Dispatches to the fastest available kernel; the
/// result is exactly equal to [`scalar::ssd_scalar`] on every input.
pub fn ssd(a: &[u8], b: &[u8], stride: usize, width: usize, height: usize) -> f64 {
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        use archmage::SimdToken;
        if let Some(token) = archmage::X64V3Token::summon() {
            return simd_sse::ssd_x64(token, a, b, stride, width, height);
        }
    }
    #[cfg(all(feature = "simd", target_arch = "aarch64"))]
    {
        use archmage::SimdToken;
        if let Some(token) = archmage::NeonToken::summon() {
            return simd_neon::ssd_neon(token, a, b, stride, width, height);
        }
    }
    scalar::ssd_scalar(a, b, stride, width, height)
}

/// Quadratically weighted SAD cost between two RGBA8 buffers.
///
/// Alpha is excluded. Dispatches like [`ssd`] and is exactly equal to
/// [`scalar::sad_weighted_scalar`] on every input.
pub fn sad_weighted(a: &[u8], b: &[u8], stride: usize, width: usize, height: usize) -> f64 {
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        use archmage::SimdToken;
        if let Some(token) = archmage::X64V3Token::summon() {
            return simd_sse::sad_weighted_x64(token, a, b, stride, width, height);
        }
    }
    #[cfg(all(feature = "simd", target_arch = "aarch64"))]
    {
        use archmage::SimdToken;
        if let Some(token) = archmage::NeonToken::summon() {
            return simd_neon::sad_weighted_neon(token, a, b, stride, width, height);
        }
    }
    scalar::sad_weighted_scalar(a, b, stride, width, height)
}
