//! Validated entry points over the unchecked kernels.
//!
//! The kernels in [`crate::kernel`] use a precondition-based contract and
//! perform no geometry checks of their own. This module checks geometry
//! once at the API boundary and then delegates to the dispatched kernel.

use thiserror::Error;

use crate::kernel;

/// Errors reported by the validated comparison API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiffError {
    /// `stride` is smaller than the `width * 4` bytes one row occupies.
    #[error("stride {stride} is too small for width {width} (rows occupy width * 4 bytes)")]
    InvalidStride {
        /// Offending stride, in bytes.
        stride: usize,
        /// Image width, in pixels.
        width: u32,
    },

    /// The pixel buffer does not cover `stride * height` bytes.
    #[error("buffer holds {actual} bytes but the geometry requires {required}")]
    BufferTooSmall {
        /// Bytes required by the declared geometry.
        required: usize,
        /// Bytes actually present in the buffer.
        actual: usize,
    },

    /// The two images do not share the same width and height.
    #[error("image dimensions differ: {0}x{1} vs {2}x{3}")]
    DimensionMismatch(u32, u32, u32, u32),

    /// The two images use different row strides.
    ///
    /// The comparison contract applies a single stride to both buffers;
    /// callers with differing strides must normalize before comparing.
    #[error("image strides differ: {0} vs {1}")]
    StrideMismatch(usize, usize),
}

/// Borrowed, read-only view of an RGBA8 pixel buffer.
///
/// The layout is row-major with 4 interleaved bytes per pixel in R, G, B,
/// A order and `stride` bytes between row starts. Construction validates
/// the geometry against the buffer length, so every `ImageRef` handed to
/// the metric functions is known to cover `stride * height` bytes.
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a> {
    pixels: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> ImageRef<'a> {
    /// Create a view over `pixels` with an explicit row stride in bytes.
    pub fn new(
        pixels: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, DiffError> {
        if stride < width as usize * 4 {
            return Err(DiffError::InvalidStride { stride, width });
        }
        let required = stride
            .checked_mul(height as usize)
            .ok_or(DiffError::BufferTooSmall {
                required: usize::MAX,
                actual: pixels.len(),
            })?;
        if pixels.len() < required {
            return Err(DiffError::BufferTooSmall {
                required,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
            stride,
        })
    }

    /// Create a view with tightly packed rows (`stride == width * 4`).
    pub fn packed(pixels: &'a [u8], width: u32, height: u32) -> Result<Self, DiffError> {
        Self::new(pixels, width, height, width as usize * 4)
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the start of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The underlying pixel buffer.
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }
}

fn check_pair(a: &ImageRef<'_>, b: &ImageRef<'_>) -> Result<(), DiffError> {
    if a.width != b.width || a.height != b.height {
        return Err(DiffError::DimensionMismatch(
            a.width, a.height, b.width, b.height,
        ));
    }
    if a.stride != b.stride {
        return Err(DiffError::StrideMismatch(a.stride, b.stride));
    }
    Ok(())
}

/// Sum of squared R/G/B differences between two images.
///
/// Returns Σ(dr² + dg² + db²) over all pixels; the alpha channel is
/// excluded. The result is an exact integer (every total representable
/// for supported image sizes fits in 2^53) and is identical between the
/// scalar and SIMD kernels.
pub fn ssd(a: &ImageRef<'_>, b: &ImageRef<'_>) -> Result<f64, DiffError> {
    check_pair(a, b)?;
    Ok(kernel::ssd(
        a.pixels,
        b.pixels,
        a.stride,
        a.width as usize,
        a.height as usize,
    ))
}

/// Mean squared error over the R/G/B channels of two images.
///
/// Equal to [`ssd`] divided by `width * height * 3`. Returns `0.0` for
/// zero-area images.
pub fn mse(a: &ImageRef<'_>, b: &ImageRef<'_>) -> Result<f64, DiffError> {
    let sum = ssd(a, b)?;
    let samples = a.width as f64 * a.height as f64 * 3.0;
    if samples == 0.0 {
        return Ok(0.0);
    }
    Ok(sum / samples)
}

/// Quadratically weighted SAD cost between two images.
///
/// Per pixel, `value = |dr| + |dg| + |db|` (alpha excluded) contributes
/// `value * (255 + 9 * value)`; the integer total is scaled by
/// [`kernel::SAD_WEIGHT_SCALE`]. The quadratic term weights large
/// differences disproportionately, which tracks perceived error better
/// than a plain SAD.
pub fn weighted_sad(a: &ImageRef<'_>, b: &ImageRef<'_>) -> Result<f64, DiffError> {
    check_pair(a, b)?;
    Ok(kernel::sad_weighted(
        a.pixels,
        b.pixels,
        a.stride,
        a.width as usize,
        a.height as usize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_stride() {
        let buf = [0u8; 64];
        assert_eq!(
            ImageRef::new(&buf, 4, 4, 12).unwrap_err(),
            DiffError::InvalidStride { stride: 12, width: 4 }
        );
    }

    #[test]
    fn rejects_short_buffer() {
        let buf = [0u8; 60];
        assert_eq!(
            ImageRef::packed(&buf, 4, 4).unwrap_err(),
            DiffError::BufferTooSmall {
                required: 64,
                actual: 60
            }
        );
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let a = [0u8; 64];
        let b = [0u8; 32];
        let a = ImageRef::packed(&a, 4, 4).unwrap();
        let b = ImageRef::packed(&b, 4, 2).unwrap();
        assert_eq!(
            ssd(&a, &b).unwrap_err(),
            DiffError::DimensionMismatch(4, 4, 4, 2)
        );
    }

    #[test]
    fn rejects_mismatched_strides() {
        let a = [0u8; 64];
        let b = [0u8; 80];
        let a = ImageRef::new(&a, 4, 4, 16).unwrap();
        let b = ImageRef::new(&b, 4, 4, 20).unwrap();
        assert_eq!(ssd(&a, &b).unwrap_err(), DiffError::StrideMismatch(16, 20));
    }

    #[test]
    fn stride_padding_is_ignored() {
        // Same pixels, one view padded with junk between rows.
        let packed = [7u8; 4 * 2 * 4];
        let mut padded = [0xEEu8; 20 * 2];
        for y in 0..2 {
            padded[y * 20..y * 20 + 16].copy_from_slice(&packed[y * 16..(y + 1) * 16]);
        }
        let zero_packed = [0u8; 4 * 2 * 4];
        let mut zero_padded = [0xA5u8; 20 * 2];
        for y in 0..2 {
            zero_padded[y * 20..y * 20 + 16].fill(0);
        }

        let a1 = ImageRef::packed(&packed, 4, 2).unwrap();
        let b1 = ImageRef::packed(&zero_packed, 4, 2).unwrap();
        let a2 = ImageRef::new(&padded, 4, 2, 20).unwrap();
        let b2 = ImageRef::new(&zero_padded, 4, 2, 20).unwrap();

        assert_eq!(ssd(&a1, &b1).unwrap(), ssd(&a2, &b2).unwrap());
    }

    #[test]
    fn mse_normalizes_over_rgb_samples() {
        // Red differs by 3 everywhere: ssd = w*h*9, mse = 9/3 = 3.
        let a = [3u8, 0, 0, 255].repeat(16);
        let b = [0u8, 0, 0, 0].repeat(16);
        let a = ImageRef::packed(&a, 4, 4).unwrap();
        let b = ImageRef::packed(&b, 4, 4).unwrap();
        assert_eq!(mse(&a, &b).unwrap(), 3.0);
    }

    #[test]
    fn mse_of_empty_image_is_zero() {
        let a = ImageRef::packed(&[], 0, 0).unwrap();
        let b = ImageRef::packed(&[], 0, 0).unwrap();
        assert_eq!(mse(&a, &b).unwrap(), 0.0);
    }
}
