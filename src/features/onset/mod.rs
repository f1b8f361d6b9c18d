//! Onset detection function providers
//!
//! The tracker itself consumes one onset-strength value per frame; where that
//! value comes from is pluggable. Implementations are push-driven and keep
//! whatever state they need between frames.

pub mod energy_flux;

pub use energy_flux::EnergyFluxDetector;

/// Streaming onset detection function provider
///
/// One call per audio hop; the returned value should be non-negative and
/// large on percussive/onset-heavy frames. The tracker rectifies and floors
/// the value, so providers do not need to guard against small negatives.
pub trait OnsetDetector {
    /// Compute the onset-strength value for one audio frame
    fn process_frame(&mut self, frame: &[f32]) -> f32;

    /// Reinitialize for new hop and frame sizes, discarding internal state
    fn initialise(&mut self, hop_size: usize, frame_size: usize);
}
