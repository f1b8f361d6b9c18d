//! Streaming energy flux onset detection
//!
//! Measures the frame-to-frame increase in RMS energy:
//! `flux[n] = max(0, E[n] - E[n-1])`. Fast, stateless apart from the previous
//! frame's energy, and effective for percussive material.
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., &
//! Sandler, M. B. (2005). A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use super::OnsetDetector;

/// Energy-flux onset detection function
///
/// The default ODF provider: half-wave rectified RMS energy derivative.
#[derive(Debug, Clone)]
pub struct EnergyFluxDetector {
    previous_energy: f32,
}

impl EnergyFluxDetector {
    /// Create a detector with no energy history
    pub fn new() -> Self {
        Self {
            previous_energy: 0.0,
        }
    }
}

impl Default for EnergyFluxDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl OnsetDetector for EnergyFluxDetector {
    fn process_frame(&mut self, frame: &[f32]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }

        let sum_sq: f32 = frame.iter().map(|&x| x * x).sum();
        let rms = (sum_sq / frame.len() as f32).sqrt();

        let flux = (rms - self.previous_energy).max(0.0);
        self.previous_energy = rms;

        flux
    }

    fn initialise(&mut self, _hop_size: usize, _frame_size: usize) {
        self.previous_energy = 0.0;
    }
}
