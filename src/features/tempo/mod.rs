//! Tempo estimation modules
//!
//! Runs once per beat rather than once per frame:
//! - Adaptive thresholding and shared numeric utilities
//! - Balanced autocorrelation (power-spectrum method)
//! - Harmonic comb filterbank with Rayleigh weighting
//! - Discrete tempo-state belief update across analysis cycles

pub mod autocorrelation;
pub mod comb_filter;
pub mod state;
pub mod threshold;

pub use state::TempoState;
