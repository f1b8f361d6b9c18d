//! Discrete tempo-state belief update
//!
//! Tempo lives on 41 discrete bins spanning 80-160 BPM in steps of 2. Each
//! analysis cycle produces an observation vector from the comb filterbank
//! output, and the belief over bins is advanced by a one-step max-product
//! update against a Gaussian transition prior. This is an approximate
//! streaming estimator retaining only per-bin maxima, deliberately not a
//! full-path Viterbi decoder with backpointers: upgrading it would change the
//! numerical output.
//!
//! # Reference
//!
//! Stark, A. M., Davies, M. E. P., & Plumbley, M. D. (2009). Real-Time
//! Beat-Synchronous Analysis of Musical Audio. *Proceedings of the 12th
//! International Conference on Digital Audio Effects (DAFx-09)*.

use super::comb_filter::COMB_BANK_LEN;
use super::threshold::normalize_in_place;
use crate::features::tracking::score::ANALYSIS_FRAME_LEN;

/// Number of discrete tempo bins
pub const TEMPO_BIN_COUNT: usize = 41;

/// Lowest representable tempo in BPM (inclusive)
pub const MIN_TEMPO_BPM: f32 = 80.0;

/// Highest representable tempo in BPM
pub const MAX_TEMPO_BPM: f32 = 160.0;

/// Tempo resolution per bin in BPM
const TEMPO_STEP_BPM: f32 = 2.0;

/// Standard deviation of the Gaussian transition prior, in bins
const TRANSITION_SIGMA: f32 = TEMPO_BIN_COUNT as f32 / 8.0;

/// Fold a tempo into the representable octave `[80, 160]` by repeated
/// halving/doubling
///
/// The input must be strictly positive and finite; callers validate this at
/// the public surface.
pub fn fold_tempo(mut bpm: f32) -> f32 {
    while bpm > MAX_TEMPO_BPM {
        bpm /= 2.0;
    }
    while bpm < MIN_TEMPO_BPM {
        bpm *= 2.0;
    }
    bpm
}

/// Bin index for a tempo already folded into the representable octave
fn tempo_bin_index(folded_bpm: f32) -> usize {
    let index = ((folded_bpm - MIN_TEMPO_BPM) / TEMPO_STEP_BPM).round() as isize;
    index.clamp(0, TEMPO_BIN_COUNT as isize - 1) as usize
}

fn one_hot(index: usize) -> [f32; TEMPO_BIN_COUNT] {
    let mut distribution = [0.0f32; TEMPO_BIN_COUNT];
    distribution[index] = 1.0;
    distribution
}

/// Persistent tempo belief state carried across analysis cycles
pub struct TempoState {
    estimated_tempo: f32,
    tempo_fixed: bool,
    prev_delta: [f32; TEMPO_BIN_COUNT],
    prev_delta_fixed: [f32; TEMPO_BIN_COUNT],
    delta: [f32; TEMPO_BIN_COUNT],
    observation: [f32; TEMPO_BIN_COUNT],
    transition: [[f32; TEMPO_BIN_COUNT]; TEMPO_BIN_COUNT],
}

impl TempoState {
    /// Create a state with a flat initial belief and a 120 BPM estimate
    pub fn new() -> Self {
        let mut transition = [[0.0f32; TEMPO_BIN_COUNT]; TEMPO_BIN_COUNT];

        // Gaussian kernel centred on the diagonal: a continuity prior between
        // consecutive analysis cycles. Built once, immutable thereafter.
        let norm = 1.0 / (TRANSITION_SIGMA * (2.0 * std::f32::consts::PI).sqrt());
        for (i, row) in transition.iter_mut().enumerate() {
            let mu = (i + 1) as f32;
            for (j, cell) in row.iter_mut().enumerate() {
                let x = (j + 1) as f32;
                *cell = norm
                    * (-(x - mu) * (x - mu) / (2.0 * TRANSITION_SIGMA * TRANSITION_SIGMA)).exp();
            }
        }

        Self {
            estimated_tempo: 120.0,
            tempo_fixed: false,
            prev_delta: [1.0; TEMPO_BIN_COUNT],
            prev_delta_fixed: [0.0; TEMPO_BIN_COUNT],
            delta: [0.0; TEMPO_BIN_COUNT],
            observation: [0.0; TEMPO_BIN_COUNT],
            transition,
        }
    }

    /// Current tempo estimate in BPM
    pub fn estimated_tempo(&self) -> f32 {
        self.estimated_tempo
    }

    /// Returns `true` while the tempo is pinned by [`TempoState::fix_tempo`]
    pub fn is_tempo_fixed(&self) -> bool {
        self.tempo_fixed
    }

    /// Current belief over tempo bins (the previous cycle's posterior)
    pub fn belief(&self) -> &[f32; TEMPO_BIN_COUNT] {
        &self.prev_delta
    }

    /// Force the belief to a one-hot distribution at the folded tempo
    ///
    /// Part of the explicit tempo-reset path; does not touch the running
    /// tempo estimate, which is recomputed on the next analysis cycle.
    pub fn set_tempo(&mut self, bpm: f32) {
        let folded = fold_tempo(bpm);
        self.prev_delta = one_hot(tempo_bin_index(folded));
    }

    /// Pin the tempo: every subsequent cycle starts from a one-hot prior at
    /// the folded tempo, ignoring accumulated belief history
    pub fn fix_tempo(&mut self, bpm: f32) {
        let folded = fold_tempo(bpm);
        self.prev_delta_fixed = one_hot(tempo_bin_index(folded));
        self.tempo_fixed = true;
    }

    /// Release a pinned tempo
    pub fn unfix_tempo(&mut self) {
        self.tempo_fixed = false;
    }

    /// Advance the belief by one analysis cycle and derive a new beat period
    ///
    /// Builds the 41-bin observation vector from the comb filterbank output
    /// (each bin reads the lag of its tempo plus the lag of its double-tempo
    /// alias, which disambiguates half/double-tempo confusion), runs the
    /// max-product update and normalizes.
    ///
    /// Returns the new beat period in frames, or `None` if the winning bin
    /// degenerates to a non-positive period, in which case the previous
    /// tempo estimate is retained.
    pub fn update(&mut self, comb_output: &[f32], hop_size: usize, sample_rate: f32) -> Option<f32> {
        debug_assert_eq!(comb_output.len(), COMB_BANK_LEN);

        // Lag (in resampled analysis frames) corresponding to a given tempo
        let tempo_to_lag_factor = 60.0 * sample_rate / ANALYSIS_FRAME_LEN as f32;

        for (k, obs) in self.observation.iter_mut().enumerate() {
            let tempo = (2 * k) as f32 + MIN_TEMPO_BPM;
            let lag_1 = (tempo_to_lag_factor / tempo).round() as usize;
            let lag_2 = (tempo_to_lag_factor / (2.0 * tempo)).round() as usize;

            let direct = lag_1
                .checked_sub(1)
                .and_then(|lag| comb_output.get(lag))
                .copied()
                .unwrap_or(0.0);
            let alias = lag_2
                .checked_sub(1)
                .and_then(|lag| comb_output.get(lag))
                .copied()
                .unwrap_or(0.0);

            *obs = direct + alias;
        }

        // While pinned, the accumulated belief is overridden every cycle
        if self.tempo_fixed {
            self.prev_delta = self.prev_delta_fixed;
        }

        // One-step max-product update: per-bin maxima only, no backpointers
        for j in 0..TEMPO_BIN_COUNT {
            let mut max_value = 0.0f32;
            for i in 0..TEMPO_BIN_COUNT {
                let value = self.prev_delta[i] * self.transition[i][j];
                if value > max_value {
                    max_value = value;
                }
            }
            self.delta[j] = max_value * self.observation[j];
        }

        normalize_in_place(&mut self.delta);
        self.prev_delta = self.delta;

        let mut best_bin = 0usize;
        let mut best_value = -1.0f32;
        for (j, &value) in self.delta.iter().enumerate() {
            if value > best_value {
                best_value = value;
                best_bin = j;
            }
        }

        let winning_tempo = (2 * best_bin) as f32 + MIN_TEMPO_BPM;
        let beat_period = (60.0 * sample_rate / (winning_tempo * hop_size as f32)).round();

        if beat_period > 0.0 {
            self.estimated_tempo = 60.0 / ((hop_size as f32 / sample_rate) * beat_period);
            log::debug!(
                "Tempo update: bin {} ({} BPM observed), period {} frames, estimate {:.2} BPM",
                best_bin,
                winning_tempo,
                beat_period,
                self.estimated_tempo
            );
            Some(beat_period)
        } else {
            log::warn!(
                "Degenerate beat period {} for bin {}, retaining previous tempo {:.2} BPM",
                beat_period,
                best_bin,
                self.estimated_tempo
            );
            None
        }
    }
}

impl Default for TempoState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TempoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempoState")
            .field("estimated_tempo", &self.estimated_tempo)
            .field("tempo_fixed", &self.tempo_fixed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Comb-bank response with a single dominant lag
    fn comb_peak_at(lag: usize) -> Vec<f32> {
        let mut comb = vec![0.01f32; COMB_BANK_LEN];
        comb[lag] = 1.0;
        comb
    }

    #[test]
    fn test_fold_tempo() {
        assert_eq!(fold_tempo(200.0), 100.0);
        assert_eq!(fold_tempo(40.0), 80.0);
        assert_eq!(fold_tempo(120.0), 120.0);
        assert_eq!(fold_tempo(320.0), 160.0);
        assert_eq!(fold_tempo(20.0), 80.0);
        assert_eq!(fold_tempo(160.0), 160.0);
    }

    #[test]
    fn test_set_tempo_forces_one_hot_belief() {
        let mut state = TempoState::new();
        state.set_tempo(200.0); // folds to 100 BPM, bin 10

        let belief = state.belief();
        for (i, &value) in belief.iter().enumerate() {
            if i == 10 {
                assert_eq!(value, 1.0);
            } else {
                assert_eq!(value, 0.0);
            }
        }
    }

    #[test]
    fn test_fix_tempo_pins_belief_across_cycles() {
        let mut state = TempoState::new();
        state.fix_tempo(120.0); // bin 20
        assert!(state.is_tempo_fixed());

        // 120 BPM corresponds to lag round(5167.97 / 120) = 43 in the comb
        // output (comb index 42), with the double-tempo alias at index 21
        let mut comb = vec![0.01f32; COMB_BANK_LEN];
        comb[42] = 1.0;
        comb[21] = 0.8;

        let period = state.update(&comb, 512, 44100.0).unwrap();
        assert_eq!(period, 43.0);

        let belief = state.belief();
        let best_bin = belief
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(best_bin, 20);
        assert!((state.estimated_tempo() - 120.3).abs() < 1.0);

        state.unfix_tempo();
        assert!(!state.is_tempo_fixed());
    }

    #[test]
    fn test_belief_normalized_after_update() {
        let mut state = TempoState::new();
        state.update(&comb_peak_at(42), 512, 44100.0);

        let sum: f32 = state.belief().iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "Belief should sum to 1, got {}", sum);
        assert!(state.belief().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_update_tracks_observation_peak() {
        let mut state = TempoState::new();

        // Repeated strong evidence at ~110 BPM: lag round(5167.97/110) = 47,
        // comb index 46, alias index round(5167.97/220)-1 = 22
        let mut comb = vec![0.01f32; COMB_BANK_LEN];
        comb[46] = 1.0;
        comb[22] = 0.8;

        for _ in 0..4 {
            state.update(&comb, 512, 44100.0);
        }

        assert!(
            (state.estimated_tempo() - 110.0).abs() < 4.0,
            "Expected ~110 BPM, got {:.2}",
            state.estimated_tempo()
        );
    }

    #[test]
    fn test_zero_observation_retains_tempo_estimate() {
        let mut state = TempoState::new();
        let before = state.estimated_tempo();

        // All-zero comb output: the belief stays unnormalized but the update
        // still derives a period from the argmax, and the estimate remains
        // inside the representable octave
        state.update(&vec![0.0f32; COMB_BANK_LEN], 512, 44100.0);

        let after = state.estimated_tempo();
        assert!(after > 0.0);
        assert!(after <= before, "Estimate should not jump upwards on silence");
    }
}
