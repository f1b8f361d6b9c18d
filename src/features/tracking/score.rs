//! Onset buffer and cumulative score tracking
//!
//! Implements the per-frame dynamic-programming induction at the heart of the
//! tracker: every incoming onset-strength sample is scored against the recent
//! cumulative-score history through a log-Gaussian transition weighting, so
//! that frames landing one beat period after a strong score inherit most of
//! that strength.
//!
//! # Reference
//!
//! Davies, M. E. P., & Plumbley, M. D. (2007). Context-Dependent Beat Tracking
//! of Musical Audio. *IEEE Transactions on Audio, Speech, and Language
//! Processing*, 15(3), 1009-1020.

use super::{log_gaussian_transition_weights, RingBuffer, SCORE_ALPHA};

/// Analysis length the onset history is later resampled to
pub const ANALYSIS_FRAME_LEN: usize = 512;

/// Default tempo assumed before any analysis cycle has run, in BPM
pub const INITIAL_TEMPO_BPM: f32 = 120.0;

/// Onset-history and cumulative-score ring buffers with the per-frame
/// score induction
///
/// Both buffers always have equal length `floor(512 * 512 / hop_size)` so the
/// history spans a fixed stretch of audio time regardless of hop size.
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    onset_history: RingBuffer,
    cumulative_score: RingBuffer,
    beat_period: f32,
    latest_score: f32,
}

impl ScoreTracker {
    /// Create a tracker sized for the given hop size and sample rate
    ///
    /// The onset history is seeded with a unit pulse train at the initial
    /// beat period so the score induction has a plausible phase to latch onto
    /// from the very first frames.
    pub fn new(hop_size: usize, sample_rate: f32) -> Self {
        let buffer_len = ((ANALYSIS_FRAME_LEN * ANALYSIS_FRAME_LEN) / hop_size).max(2);
        let raw_period =
            (60.0 / ((hop_size as f32 / sample_rate) * INITIAL_TEMPO_BPM)).round();

        let mut tracker = Self {
            onset_history: RingBuffer::new(buffer_len),
            cumulative_score: RingBuffer::new(buffer_len),
            beat_period: 1.0,
            latest_score: 0.0,
        };
        tracker.set_beat_period(raw_period);
        tracker.seed_initial();
        tracker
    }

    fn seed_initial(&mut self) {
        let period = self.beat_period.round().max(1.0) as usize;

        for i in 0..self.onset_history.len() {
            let value = if i % period == 0 { 1.0 } else { 0.0 };
            self.onset_history.set(i, value);
            self.cumulative_score.set(i, 0.0);
        }
    }

    /// Number of frames retained in both histories
    pub fn len(&self) -> usize {
        self.onset_history.len()
    }

    /// Returns `true` if the histories have zero capacity
    pub fn is_empty(&self) -> bool {
        self.onset_history.is_empty()
    }

    /// Current beat period in frames
    pub fn beat_period(&self) -> f32 {
        self.beat_period
    }

    /// Update the beat period, clamping it to a range every dependent window
    /// computation can tolerate
    ///
    /// The score and prediction windows look back two beat periods, so the
    /// period must never exceed half the buffer length, and the log-Gaussian
    /// weighting requires it to stay strictly positive.
    pub fn set_beat_period(&mut self, period: f32) {
        let max_period = (self.onset_history.len() / 2) as f32;
        self.beat_period = period.clamp(1.0, max_period);
    }

    /// Most recent cumulative score value
    pub fn latest_score(&self) -> f32 {
        self.latest_score
    }

    /// Copy of the onset history, oldest first
    pub fn onset_history(&self) -> Vec<f32> {
        self.onset_history.to_vec()
    }

    /// Copy of the cumulative score, oldest first
    pub fn cumulative_score(&self) -> Vec<f32> {
        self.cumulative_score.to_vec()
    }

    /// Append one onset sample and run the score induction
    ///
    /// The new score is `(1 - alpha) * sample + alpha * max`, where `max` is
    /// the best weighted score in the `[-2P, -P/2]` window of the history.
    /// Cost is O(beat period) per frame.
    pub fn process_sample(&mut self, sample: f32) {
        self.onset_history.push(sample);

        let len = self.cumulative_score.len();
        let weights = log_gaussian_transition_weights(self.beat_period);

        let window_start = len.saturating_sub((2.0 * self.beat_period).round() as usize);
        let window_end = len.saturating_sub((self.beat_period / 2.0).round() as usize);

        let mut max_value = 0.0f32;
        for (n, i) in (window_start..=window_end).enumerate() {
            if i >= len || n >= weights.len() {
                break;
            }
            let weighted = self.cumulative_score.get(i) * weights[n];
            if weighted > max_value {
                max_value = weighted;
            }
        }

        self.latest_score = (1.0 - SCORE_ALPHA) * sample + SCORE_ALPHA * max_value;
        self.cumulative_score.push(self.latest_score);
    }

    /// Overwrite both histories with a synthetic pulse train at `period`
    ///
    /// Walking backwards from the newest slot, every `period`-th frame gets a
    /// strong pulse (150) and every other frame a small floor value (10), so
    /// the newest frame is always on a pulse. Used to resynchronize phase
    /// after an explicit tempo change.
    pub fn seed_pulse_train(&mut self, period: usize) {
        let period = period.max(1);
        let mut k = 1usize;

        for i in (0..self.onset_history.len()).rev() {
            let value = if k == 1 { 150.0 } else { 10.0 };
            self.onset_history.set(i, value);
            self.cumulative_score.set(i, value);

            k += 1;
            if k > period {
                k = 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length_matches_hop_size() {
        for hop in [128usize, 256, 512, 1024] {
            let tracker = ScoreTracker::new(hop, 44100.0);
            assert_eq!(
                tracker.len(),
                (512 * 512) / hop,
                "Buffer length mismatch for hop {}",
                hop
            );
        }
    }

    #[test]
    fn test_initial_seeding() {
        let tracker = ScoreTracker::new(512, 44100.0);
        let period = tracker.beat_period().round() as usize;
        assert!(period > 0);

        let history = tracker.onset_history();
        for (i, &value) in history.iter().enumerate() {
            if i % period == 0 {
                assert_eq!(value, 1.0, "Expected pulse at index {}", i);
            } else {
                assert_eq!(value, 0.0, "Expected silence at index {}", i);
            }
        }

        assert!(tracker.cumulative_score().iter().all(|&s| s == 0.0));
        assert_eq!(tracker.latest_score(), 0.0);
    }

    #[test]
    fn test_initial_beat_period_is_120_bpm() {
        // 120 BPM at hop 512 / 44.1 kHz is 43.07 frames per beat
        let tracker = ScoreTracker::new(512, 44100.0);
        assert_eq!(tracker.beat_period(), 43.0);
    }

    #[test]
    fn test_beat_period_clamped() {
        let mut tracker = ScoreTracker::new(512, 44100.0);

        tracker.set_beat_period(-5.0);
        assert_eq!(tracker.beat_period(), 1.0);

        tracker.set_beat_period(1e9);
        assert_eq!(tracker.beat_period(), (tracker.len() / 2) as f32);
    }

    #[test]
    fn test_score_induction_builds_on_periodic_input() {
        let mut tracker = ScoreTracker::new(512, 44100.0);
        let period = 43usize;

        // Two buffer lengths of impulses at the seeded beat period
        let mut scores_at_pulses = Vec::new();
        for n in 0..(tracker.len() * 2) {
            let sample = if n % period == 0 { 1.0 } else { 0.0001 };
            tracker.process_sample(sample);
            if n % period == 0 {
                scores_at_pulses.push(tracker.latest_score());
            }
        }

        // The recursive maximum should grow the on-beat score well beyond a
        // single onset sample's direct contribution
        let early = scores_at_pulses[2];
        let late = *scores_at_pulses.last().unwrap();
        assert!(
            late > early,
            "On-beat score should accumulate: early {} vs late {}",
            early,
            late
        );
        assert!(late > 0.2, "Converged on-beat score too small: {}", late);
    }

    #[test]
    fn test_pulse_train_seeding() {
        let mut tracker = ScoreTracker::new(512, 44100.0);
        tracker.seed_pulse_train(43);

        let history = tracker.onset_history();
        let score = tracker.cumulative_score();

        assert!(history.iter().all(|&v| v == 150.0 || v == 10.0));
        assert!(score.iter().all(|&v| v == 150.0 || v == 10.0));

        // Newest slot is on a pulse, and pulses repeat every 43 frames from it
        let len = history.len();
        assert_eq!(history[len - 1], 150.0);
        assert_eq!(history[len - 1 - 43], 150.0);
        assert_eq!(history[len - 2], 10.0);

        let pulse_count = history.iter().filter(|&&v| v == 150.0).count();
        assert_eq!(pulse_count, len.div_ceil(43));
    }
}
