//! RGB difference metrics for RGBA8 pixel buffers.
//!
//! This crate computes pixel-difference metrics between two equally-sized
//! RGBA8 images at high throughput, for image regression testing and
//! perceptual-diff pipelines:
//!
//! - [`ssd`]: Sum of Squared Differences over the R, G, B channels.
//! - [`mse`]: Mean Squared Error (SSD normalized over all RGB samples).
//! - [`weighted_sad`]: quadratically weighted Sum of Absolute Differences.
//!
//! The alpha channel never contributes to any metric.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support.
//! - `simd` (default): Enable SIMD kernels with runtime CPU dispatch.
//!
//! # Kernels
//!
//! Every metric has a scalar reference kernel and, with the `simd` feature,
//! lane-parallel kernels for x86_64 (8 pixels per iteration) and aarch64
//! (4 pixels per iteration). The SIMD kernels return results *exactly*
//! equal to the scalar reference: all intermediate sums are small integers
//! held in 64-bit accumulators, and only the final total is promoted to
//! `f64`. [`Backend::active`] reports which kernel the dispatcher selects.
//!
//! # Example
//!
//! ```rust
//! use zendiff::{ssd, ImageRef};
//!
//! let a = vec![0u8; 4 * 8];                   // 8x1, all zero
//! let b = [10u8, 20, 30, 255].repeat(8);      // 8x1, constant delta
//! let a = ImageRef::packed(&a, 8, 1)?;
//! let b = ImageRef::packed(&b, 8, 1)?;
//! assert_eq!(ssd(&a, &b)?, 8.0 * (100 + 400 + 900) as f64);
//! # Ok::<(), zendiff::DiffError>(())
//! ```
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`. When the `simd` feature is
//! enabled, SIMD intrinsics go through the [`archmage`] crate's
//! token-based safety model (the `#[arcane]` proc macro generates the
//! unsafe blocks internally) and all vector loads use
//! `safe_unaligned_simd`, so no target-feature or alignment contract is
//! left to manual review.
//!
//! [`archmage`]: https://docs.rs/archmage

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod api;
pub mod kernel;

pub use api::{mse, ssd, weighted_sad, DiffError, ImageRef};
pub use kernel::Backend;
