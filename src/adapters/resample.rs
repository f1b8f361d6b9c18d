//! Resampling backend for onset-history normalization
//!
//! The tempo estimator analyses a fixed 512-sample onset curve regardless of
//! the hop size, so the variable-length onset history has to be mapped onto
//! that length once per beat. The interpolation quality matters less than its
//! smoothness: the downstream autocorrelation only needs the periodicity of
//! the curve to survive.

use crate::error::TrackerError;

/// Maps an arbitrary-length real sequence onto a fixed target length
pub trait Resampler {
    /// Resample `input` to exactly `target_len` samples
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the input is empty or the target length is
    /// zero.
    fn resample(&self, input: &[f32], target_len: usize) -> Result<Vec<f32>, TrackerError>;
}

/// Windowed-sinc interpolating resampler
///
/// Band-limited interpolation with a Hann-windowed sinc kernel. Kernel weights
/// are renormalized per output sample so constant signals pass through
/// unchanged even near the sequence boundaries. When input and output lengths
/// match, the kernel collapses to the identity.
#[derive(Debug, Clone)]
pub struct SincResampler {
    /// Kernel half-width in input samples
    half_width: usize,
}

impl SincResampler {
    /// Create a resampler with the given kernel half-width
    pub fn new(half_width: usize) -> Self {
        Self {
            half_width: half_width.max(1),
        }
    }
}

impl Default for SincResampler {
    fn default() -> Self {
        Self::new(16)
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-9 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

impl Resampler for SincResampler {
    fn resample(&self, input: &[f32], target_len: usize) -> Result<Vec<f32>, TrackerError> {
        if input.is_empty() {
            return Err(TrackerError::InvalidInput(
                "Empty input sequence for resampling".to_string(),
            ));
        }

        if target_len == 0 {
            return Err(TrackerError::InvalidInput(
                "Target length must be > 0".to_string(),
            ));
        }

        let n = input.len();
        if n == target_len {
            return Ok(input.to_vec());
        }

        let ratio = n as f64 / target_len as f64;

        // When decimating, the kernel cutoff drops to the output Nyquist so
        // energy between output samples is spread rather than lost
        let cutoff = if ratio > 1.0 { 1.0 / ratio } else { 1.0 };
        let support = self.half_width as f64 / cutoff;

        let mut output = Vec::with_capacity(target_len);

        for j in 0..target_len {
            // Position of output sample j in input coordinates
            let pos = j as f64 * ratio;

            let k_min = (pos - support).ceil().max(0.0) as usize;
            let k_max = ((pos + support).floor() as usize).min(n - 1);

            let mut acc = 0.0f64;
            let mut weight_sum = 0.0f64;

            for k in k_min..=k_max {
                let t = pos - k as f64;
                // Hann-windowed sinc kernel
                let window = 0.5 + 0.5 * (std::f64::consts::PI * t / support).cos();
                let weight = sinc(cutoff * t) * window;
                acc += input[k] as f64 * weight;
                weight_sum += weight;
            }

            if weight_sum.abs() > 1e-12 {
                output.push((acc / weight_sum) as f32);
            } else {
                output.push(0.0);
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_when_lengths_match() {
        let resampler = SincResampler::default();
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();

        let output = resampler.resample(&input, 64).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_constant_signal_preserved() {
        let resampler = SincResampler::default();
        let input = vec![0.75f32; 200];

        let output = resampler.resample(&input, 512).unwrap();

        assert_eq!(output.len(), 512);
        for &v in &output {
            assert!(
                (v - 0.75).abs() < 1e-3,
                "Constant signal should survive resampling, got {}",
                v
            );
        }
    }

    #[test]
    fn test_periodicity_survives_resampling() {
        // Pulse train with period 16 in a 256-sample sequence, stretched to 512:
        // the period should stretch to 32 output samples
        let mut input = vec![0.0f32; 256];
        for i in (0..256).step_by(16) {
            input[i] = 1.0;
        }

        let resampler = SincResampler::default();
        let output = resampler.resample(&input, 512).unwrap();

        assert_eq!(output.len(), 512);

        // Energy should concentrate near multiples of 32
        for pulse in (64..448).step_by(32) {
            let near: f32 = output[pulse - 2..=pulse + 2].iter().copied().fold(0.0, f32::max);
            let far: f32 = output[pulse + 12..=pulse + 20]
                .iter()
                .copied()
                .fold(0.0, f32::max);
            assert!(
                near > far,
                "Pulse near output index {} should exceed midpoint energy ({} vs {})",
                pulse,
                near,
                far
            );
        }
    }

    #[test]
    fn test_periodicity_survives_decimation() {
        // Pulse train with period 86 in a 1024-sample sequence, decimated to
        // 512. The pulses sit at odd input indices, so they fall between
        // output samples; the reduced-cutoff kernel has to spread their
        // energy rather than drop it.
        let mut input = vec![0.0f32; 1024];
        let mut i = 1;
        while i < 1024 {
            input[i] = 1.0;
            i += 86;
        }

        let resampler = SincResampler::default();
        let output = resampler.resample(&input, 512).unwrap();

        assert_eq!(output.len(), 512);

        // Energy should concentrate near multiples of 43
        for pulse in (86..430).step_by(43) {
            let near: f32 = output[pulse - 3..=pulse + 3].iter().copied().fold(0.0, f32::max);
            let far: f32 = output[pulse + 15..=pulse + 28]
                .iter()
                .copied()
                .fold(f32::MIN, f32::max);
            assert!(
                near > 2.0 * far.max(1e-6),
                "Pulse near output index {} should exceed midpoint energy ({} vs {})",
                pulse,
                near,
                far
            );
        }
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        let resampler = SincResampler::default();
        assert!(resampler.resample(&[], 512).is_err());
        assert!(resampler.resample(&[1.0], 0).is_err());
    }
}
