//! Complex spectral transform backend
//!
//! Abstracts the forward/inverse transform pair used by the balanced
//! autocorrelation so the FFT implementation is chosen once, at construction,
//! rather than branching throughout the analysis code.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Fixed-length forward/inverse complex transform
///
/// Implementations must follow the usual unnormalized DFT convention: applying
/// `forward` then `inverse` scales the signal by the transform length. The
/// autocorrelation accounts for that scaling itself.
pub trait SpectralTransform {
    /// Transform length in bins
    fn len(&self) -> usize;

    /// Returns `true` if the transform length is zero
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-place forward transform
    fn forward(&self, buffer: &mut [Complex<f32>]);

    /// In-place inverse (unnormalized) transform
    fn inverse(&self, buffer: &mut [Complex<f32>]);
}

/// Default transform backend built on `rustfft`
pub struct RustFftTransform {
    len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl RustFftTransform {
    /// Plan a forward/inverse transform pair of the given length
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);

        Self {
            len,
            forward,
            inverse,
        }
    }
}

impl SpectralTransform for RustFftTransform {
    fn len(&self) -> usize {
        self.len
    }

    fn forward(&self, buffer: &mut [Complex<f32>]) {
        self.forward.process(buffer);
    }

    fn inverse(&self, buffer: &mut [Complex<f32>]) {
        self.inverse.process(buffer);
    }
}

impl std::fmt::Debug for RustFftTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustFftTransform")
            .field("len", &self.len)
            .finish()
    }
}
