//! Real-time beat tracker
//!
//! Push-driven, single-threaded pipeline: one call per audio hop feeds the
//! onset buffer and cumulative-score induction; every half beat period the
//! next beat is predicted by forward score extrapolation; every full beat
//! period the tempo is re-estimated from the onset history (resampling,
//! balanced autocorrelation, comb filterbank, belief update), and the new
//! beat period feeds back into the score windows for subsequent frames.
//!
//! # Reference
//!
//! Stark, A. M., Davies, M. E. P., & Plumbley, M. D. (2009). Real-Time
//! Beat-Synchronous Analysis of Musical Audio. *Proceedings of the 12th
//! International Conference on Digital Audio Effects (DAFx-09)*.
//!
//! # Example
//!
//! ```no_run
//! use cadence_dsp::BeatTracker;
//!
//! let mut tracker = BeatTracker::new(512, 1024)?;
//!
//! let hop = vec![0.0f32; 1024]; // your audio frame
//! tracker.process_audio_frame(&hop);
//!
//! if tracker.beat_due_in_current_frame() {
//!     println!("beat at {:.2} BPM", tracker.current_tempo_estimate());
//! }
//! # Ok::<(), cadence_dsp::TrackerError>(())
//! ```

use crate::adapters::{Resampler, RustFftTransform, SincResampler, SpectralTransform};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::features::onset::{EnergyFluxDetector, OnsetDetector};
use crate::features::tempo::autocorrelation::{
    balanced_autocorrelation, ACF_TRANSFORM_LEN, ONSET_CURVE_LEN,
};
use crate::features::tempo::comb_filter::{comb_filter_bank, rayleigh_weighting, COMB_BANK_LEN};
use crate::features::tempo::threshold::adaptive_threshold;
use crate::features::tempo::TempoState;
use crate::features::tracking::predictor::predict_next_beat;
use crate::features::tracking::ScoreTracker;

/// Small positive floor added to every onset sample
///
/// Keeps samples strictly positive so later logarithms and divisions stay
/// defined.
const ONSET_SAMPLE_FLOOR: f32 = 0.0001;

/// Frames until the first beat prediction attempt after construction
const INITIAL_PREDICTION_COUNTDOWN: i64 = 10;

/// Convert a frame count to seconds for the given hop size and sample rate
pub fn beat_time_in_seconds(frame_number: u64, hop_size: usize, sample_rate: f32) -> f64 {
    (hop_size as f64 / sample_rate as f64) * frame_number as f64
}

/// Streaming tempo estimator and beat predictor
///
/// One instance owns all of its buffers exclusively; instances never share
/// state. Configuration changes (`set_tempo`, `update_hop_and_frame_size`)
/// mutate internal buffers and must be serialized by the caller against
/// in-flight processing calls.
pub struct BeatTracker {
    config: TrackerConfig,
    score_tracker: ScoreTracker,
    tempo_state: TempoState,
    onset_detector: Box<dyn OnsetDetector>,
    resampler: Box<dyn Resampler>,
    transform: Box<dyn SpectralTransform>,

    // Scratch buffers reused every analysis cycle
    weighting: Vec<f32>,
    acf: Vec<f32>,
    comb_output: Vec<f32>,

    /// Frames until the next beat prediction attempt
    m0: i64,
    /// Frames until the predicted beat
    beat_counter: i64,
    beat_due_in_frame: bool,
}

impl BeatTracker {
    /// Create a tracker with the default backends
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if `hop_size` or `frame_size` is
    /// zero.
    pub fn new(hop_size: usize, frame_size: usize) -> Result<Self, TrackerError> {
        Self::with_components(
            TrackerConfig::new(hop_size, frame_size),
            Box::new(EnergyFluxDetector::new()),
            Box::new(SincResampler::default()),
            Box::new(RustFftTransform::new(ACF_TRANSFORM_LEN)),
        )
    }

    /// Create a tracker with explicit backend implementations
    ///
    /// The spectral transform must be planned for the autocorrelation length
    /// (1024); alternative FFT backends are selected here, once, rather than
    /// branched on during processing.
    pub fn with_components(
        config: TrackerConfig,
        onset_detector: Box<dyn OnsetDetector>,
        resampler: Box<dyn Resampler>,
        transform: Box<dyn SpectralTransform>,
    ) -> Result<Self, TrackerError> {
        config.validate()?;

        if transform.len() != ACF_TRANSFORM_LEN {
            return Err(TrackerError::InvalidInput(format!(
                "Spectral transform must be planned for {} bins, got {}",
                ACF_TRANSFORM_LEN,
                transform.len()
            )));
        }

        log::debug!(
            "Creating beat tracker: hop={}, frame={}, sample_rate={}",
            config.hop_size,
            config.frame_size,
            config.sample_rate
        );

        Ok(Self {
            score_tracker: ScoreTracker::new(config.hop_size, config.sample_rate),
            tempo_state: TempoState::new(),
            onset_detector,
            resampler,
            transform,
            weighting: rayleigh_weighting(),
            acf: vec![0.0; ONSET_CURVE_LEN],
            comb_output: vec![0.0; COMB_BANK_LEN],
            m0: INITIAL_PREDICTION_COUNTDOWN,
            beat_counter: -1,
            beat_due_in_frame: false,
            config,
        })
    }

    /// Process one audio frame through the onset detector and the tracker
    pub fn process_audio_frame(&mut self, frame: &[f32]) {
        let sample = self.onset_detector.process_frame(frame);
        self.process_onset_sample(sample);
    }

    /// Process one precomputed onset-strength sample
    ///
    /// The sample is rectified to its absolute value and floored above zero
    /// before use; degenerate inputs are repaired rather than rejected.
    pub fn process_onset_sample(&mut self, sample: f32) {
        let sample = sample.abs() + ONSET_SAMPLE_FLOOR;

        self.m0 -= 1;
        self.beat_counter -= 1;
        self.beat_due_in_frame = false;

        self.score_tracker.process_sample(sample);

        // Halfway between beats: predict the next one
        if self.m0 == 0 {
            self.predict_beat();
        }

        // At the beat: flag it and re-estimate the tempo
        if self.beat_counter == 0 {
            self.beat_due_in_frame = true;

            if let Err(err) = self.run_analysis_cycle() {
                log::warn!(
                    "Analysis cycle skipped, retaining tempo {:.2} BPM: {}",
                    self.tempo_state.estimated_tempo(),
                    err
                );
            }
        }
    }

    /// Returns `true` if a beat fell in the most recently processed frame
    pub fn beat_due_in_current_frame(&self) -> bool {
        self.beat_due_in_frame
    }

    /// Current tempo estimate in BPM
    pub fn current_tempo_estimate(&self) -> f32 {
        self.tempo_state.estimated_tempo()
    }

    /// Most recent cumulative score value
    pub fn latest_cumulative_score_value(&self) -> f32 {
        self.score_tracker.latest_score()
    }

    /// Hop size in samples between consecutive frames
    pub fn hop_size(&self) -> usize {
        self.config.hop_size
    }

    /// Resynchronize phase and belief state to a caller-supplied tempo
    ///
    /// The tempo is folded into [80, 160] by repeated halving/doubling, the
    /// belief is forced to a one-hot distribution at the matching bin, and
    /// both histories are overwritten with a synthetic pulse train at the new
    /// beat period. The current frame is treated as a beat instant and the
    /// next prediction is scheduled half a beat period ahead.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if `bpm` is not strictly positive
    /// and finite.
    pub fn set_tempo(&mut self, bpm: f32) -> Result<(), TrackerError> {
        validate_tempo(bpm)?;

        self.tempo_state.set_tempo(bpm);

        let folded = crate::features::tempo::state::fold_tempo(bpm);
        let new_period = (60.0
            / ((self.config.hop_size as f32 / self.config.sample_rate) * folded))
            .round()
            .max(1.0);

        self.score_tracker.seed_pulse_train(new_period as usize);

        // Beat is now; the offbeat is half a period away
        self.beat_counter = 0;
        self.m0 = (new_period / 2.0).round() as i64;

        log::debug!(
            "Tempo reset to {:.2} BPM (folded {:.2}), period {} frames",
            bpm,
            folded,
            new_period
        );

        Ok(())
    }

    /// Pin the tempo so every analysis cycle starts from the given value
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if `bpm` is not strictly positive
    /// and finite.
    pub fn fix_tempo(&mut self, bpm: f32) -> Result<(), TrackerError> {
        validate_tempo(bpm)?;
        self.tempo_state.fix_tempo(bpm);
        Ok(())
    }

    /// Release a pinned tempo
    pub fn unfix_tempo(&mut self) {
        self.tempo_state.unfix_tempo();
    }

    /// Reinitialize for new hop and frame sizes
    ///
    /// Resizes and reseeds both histories atomically and reinitializes the
    /// onset detector. Must not be called concurrently with a processing
    /// call.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if either size is zero.
    pub fn update_hop_and_frame_size(
        &mut self,
        hop_size: usize,
        frame_size: usize,
    ) -> Result<(), TrackerError> {
        let mut config = self.config.clone();
        config.hop_size = hop_size;
        config.frame_size = frame_size;
        config.validate()?;

        self.onset_detector.initialise(hop_size, frame_size);
        self.score_tracker = ScoreTracker::new(hop_size, config.sample_rate);
        self.config = config;

        log::debug!(
            "Reinitialized for hop={}, frame={}: {} history frames",
            hop_size,
            frame_size,
            self.score_tracker.len()
        );

        Ok(())
    }

    fn predict_beat(&mut self) {
        let score = self.score_tracker.cumulative_score();
        let beat_period = self.score_tracker.beat_period();

        let offset = predict_next_beat(&score, beat_period);

        self.beat_counter = offset as i64;
        self.m0 = self.beat_counter + (beat_period / 2.0).round() as i64;
    }

    /// One full tempo-analysis cycle, run at each beat instant
    ///
    /// A failing resample or transform aborts only this cycle; the last good
    /// tempo and beat period are retained.
    fn run_analysis_cycle(&mut self) -> Result<(), TrackerError> {
        let history = self.score_tracker.onset_history();

        let mut onset_curve = self.resampler.resample(&history, ONSET_CURVE_LEN)?;
        if onset_curve.len() != ONSET_CURVE_LEN {
            return Err(TrackerError::ProcessingError(format!(
                "Resampler returned {} samples, expected {}",
                onset_curve.len(),
                ONSET_CURVE_LEN
            )));
        }

        adaptive_threshold(&mut onset_curve);

        balanced_autocorrelation(&onset_curve, self.transform.as_ref(), &mut self.acf)?;

        comb_filter_bank(&self.acf, &self.weighting, &mut self.comb_output);
        adaptive_threshold(&mut self.comb_output);

        if let Some(period) =
            self.tempo_state
                .update(&self.comb_output, self.config.hop_size, self.config.sample_rate)
        {
            self.score_tracker.set_beat_period(period);
        }

        Ok(())
    }
}

fn validate_tempo(bpm: f32) -> Result<(), TrackerError> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(TrackerError::InvalidInput(format!(
            "Tempo must be a positive finite BPM value, got {}",
            bpm
        )));
    }
    Ok(())
}

impl std::fmt::Debug for BeatTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeatTracker")
            .field("config", &self.config)
            .field("tempo", &self.tempo_state)
            .field("beat_counter", &self.beat_counter)
            .field("m0", &self.m0)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_defaults() {
        let tracker = BeatTracker::new(512, 1024).unwrap();

        assert_eq!(tracker.hop_size(), 512);
        assert_eq!(tracker.current_tempo_estimate(), 120.0);
        assert!(!tracker.beat_due_in_current_frame());
        assert_eq!(tracker.latest_cumulative_score_value(), 0.0);
        assert_eq!(tracker.score_tracker.len(), 512);
    }

    #[test]
    fn test_invalid_construction_rejected() {
        assert!(BeatTracker::new(0, 1024).is_err());
        assert!(BeatTracker::new(512, 0).is_err());
    }

    #[test]
    fn test_wrong_transform_length_rejected() {
        let result = BeatTracker::with_components(
            TrackerConfig::new(512, 1024),
            Box::new(EnergyFluxDetector::new()),
            Box::new(SincResampler::default()),
            Box::new(RustFftTransform::new(512)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_set_tempo_folds_and_resets() {
        let mut tracker = BeatTracker::new(512, 1024).unwrap();

        // 200 BPM folds to 100; beat period round(51.68) = 52 frames
        tracker.set_tempo(200.0).unwrap();

        assert_eq!(tracker.beat_counter, 0);
        assert_eq!(tracker.m0, 26);

        let belief = tracker.tempo_state.belief();
        assert_eq!(belief[10], 1.0); // (100 - 80) / 2
        assert_eq!(belief.iter().filter(|&&v| v != 0.0).count(), 1);

        let history = tracker.score_tracker.onset_history();
        let score = tracker.score_tracker.cumulative_score();
        assert!(history.iter().all(|&v| v == 10.0 || v == 150.0));
        assert!(score.iter().all(|&v| v == 10.0 || v == 150.0));
    }

    #[test]
    fn test_set_tempo_folds_low_values_up() {
        let mut tracker = BeatTracker::new(512, 1024).unwrap();

        // 40 BPM folds to 80; beat period round(64.6) = 65 frames
        tracker.set_tempo(40.0).unwrap();

        assert_eq!(tracker.beat_counter, 0);
        assert_eq!(tracker.m0, 33); // round(65 / 2)
        assert_eq!(tracker.tempo_state.belief()[0], 1.0);
    }

    #[test]
    fn test_set_tempo_rejects_degenerate_values() {
        let mut tracker = BeatTracker::new(512, 1024).unwrap();
        assert!(tracker.set_tempo(0.0).is_err());
        assert!(tracker.set_tempo(-120.0).is_err());
        assert!(tracker.set_tempo(f32::NAN).is_err());
        assert!(tracker.fix_tempo(f32::INFINITY).is_err());
    }

    #[test]
    fn test_update_hop_and_frame_size_resizes_buffers() {
        let mut tracker = BeatTracker::new(512, 1024).unwrap();
        assert_eq!(tracker.score_tracker.len(), 512);

        tracker.update_hop_and_frame_size(256, 512).unwrap();
        assert_eq!(tracker.hop_size(), 256);
        assert_eq!(tracker.score_tracker.len(), 1024);

        assert!(tracker.update_hop_and_frame_size(0, 512).is_err());
        // Failed update leaves the previous configuration in place
        assert_eq!(tracker.hop_size(), 256);
    }

    #[test]
    fn test_onset_samples_are_rectified_and_floored() {
        let mut tracker = BeatTracker::new(512, 1024).unwrap();

        tracker.process_onset_sample(-3.0);
        // (1 - alpha) * (3.0 + floor) with an all-zero score history
        let expected = 0.1 * (3.0 + ONSET_SAMPLE_FLOOR);
        assert!((tracker.latest_cumulative_score_value() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_beat_time_in_seconds() {
        // One frame at hop 512 / 44.1 kHz is ~11.6 ms
        let t = beat_time_in_seconds(100, 512, 44100.0);
        assert!((t - 1.1609977).abs() < 1e-4);
        assert_eq!(beat_time_in_seconds(0, 512, 44100.0), 0.0);
    }

    #[test]
    fn test_audio_frames_drive_the_tracker() {
        let mut tracker = BeatTracker::new(512, 1024).unwrap();

        let loud = vec![0.5f32; 1024];
        let quiet = vec![0.0f32; 1024];

        tracker.process_audio_frame(&loud);
        let after_onset = tracker.latest_cumulative_score_value();
        assert!(after_onset > 0.0);

        tracker.process_audio_frame(&quiet);
        assert!(tracker.latest_cumulative_score_value() > 0.0);
    }
}
