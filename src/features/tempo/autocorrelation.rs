//! Balanced autocorrelation of the onset curve
//!
//! Computes the autocorrelation via the power-spectrum method:
//! `ACF = |IFFT(|FFT(zero-padded signal)|^2)|`, which is O(n log n) instead of
//! the O(n^2) time-domain formula. Each lag is then divided by its remaining
//! lag count to remove the bias towards small lags inherent in finite-window
//! autocorrelation ("balancing").

use crate::adapters::SpectralTransform;
use crate::error::TrackerError;
use rustfft::num_complex::Complex;

/// Length of the onset curve fed into the autocorrelation
pub const ONSET_CURVE_LEN: usize = 512;

/// Transform length used for the power-spectrum method (zero-padded to 2x)
pub const ACF_TRANSFORM_LEN: usize = 1024;

/// Compute the balanced autocorrelation of a 512-sample onset curve
///
/// A pure function of its input: identical curves produce identical
/// autocorrelations. The first `ONSET_CURVE_LEN` lags are written to `acf`.
///
/// The final division by the transform length compensates for the
/// unnormalized inverse transform, and keeps the output identical to the
/// equivalent time-domain formula.
///
/// # Errors
///
/// Returns `TrackerError::InvalidInput` if the curve or output length does
/// not match, or if the transform backend has the wrong length.
pub fn balanced_autocorrelation(
    onset_curve: &[f32],
    transform: &dyn SpectralTransform,
    acf: &mut [f32],
) -> Result<(), TrackerError> {
    if onset_curve.len() != ONSET_CURVE_LEN || acf.len() != ONSET_CURVE_LEN {
        return Err(TrackerError::InvalidInput(format!(
            "Autocorrelation expects {}-sample curves, got {} in / {} out",
            ONSET_CURVE_LEN,
            onset_curve.len(),
            acf.len()
        )));
    }

    if transform.len() != ACF_TRANSFORM_LEN {
        return Err(TrackerError::InvalidInput(format!(
            "Autocorrelation requires a {}-point transform, got {}",
            ACF_TRANSFORM_LEN,
            transform.len()
        )));
    }

    // Zero-pad to the transform length
    let mut buffer: Vec<Complex<f32>> = Vec::with_capacity(ACF_TRANSFORM_LEN);
    buffer.extend(onset_curve.iter().map(|&x| Complex::new(x, 0.0)));
    buffer.resize(ACF_TRANSFORM_LEN, Complex::new(0.0, 0.0));

    transform.forward(&mut buffer);

    // Replace each bin with its squared magnitude
    for bin in buffer.iter_mut() {
        *bin = Complex::new(bin.norm_sqr(), 0.0);
    }

    transform.inverse(&mut buffer);

    // Balance by the remaining lag count, then undo the transform scaling
    let mut lag = ONSET_CURVE_LEN as f32;
    for (i, out) in acf.iter_mut().enumerate() {
        *out = buffer[i].norm() / lag / ACF_TRANSFORM_LEN as f32;
        lag -= 1.0;
    }

    Ok(())
}
