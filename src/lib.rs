//! # Cadence DSP
//!
//! A real-time beat tracking engine: streaming tempo estimation and beat
//! prediction from per-frame onset-strength values.
//!
//! ## Features
//!
//! - **Streaming operation**: one call per audio hop, no lookahead
//! - **Tempo estimation**: balanced autocorrelation + harmonic comb
//!   filterbank with a discrete probabilistic tempo-state update
//! - **Beat prediction**: cumulative-score induction with forward
//!   extrapolation to the next beat instant
//! - **Pluggable backends**: onset detection, resampling and the spectral
//!   transform sit behind traits selected at construction
//!
//! ## Quick Start
//!
//! ```no_run
//! use cadence_dsp::BeatTracker;
//!
//! let mut tracker = BeatTracker::new(512, 1024)?;
//!
//! // One onset-strength sample per audio hop
//! for &sample in &[0.9f32, 0.0, 0.1, 0.0] {
//!     tracker.process_onset_sample(sample);
//!
//!     if tracker.beat_due_in_current_frame() {
//!         println!("beat! tempo: {:.1} BPM", tracker.current_tempo_estimate());
//!     }
//! }
//! # Ok::<(), cadence_dsp::TrackerError>(())
//! ```
//!
//! ## Architecture
//!
//! Per-frame flow:
//!
//! ```text
//! onset sample → score induction → (each half beat) beat prediction
//!                                → (each beat) tempo re-estimation
//! ```
//!
//! The tracker is single-threaded and push-driven; re-parameterization must
//! be serialized by the caller against processing calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod error;
pub mod features;
pub mod tracker;

// Re-export main types
pub use adapters::{Resampler, RustFftTransform, SincResampler, SpectralTransform};
pub use config::TrackerConfig;
pub use error::TrackerError;
pub use features::onset::{EnergyFluxDetector, OnsetDetector};
pub use tracker::{beat_time_in_seconds, BeatTracker};
