//! Beat prediction by forward score extrapolation
//!
//! At the midpoint between beats the cumulative score is synthesized one beat
//! period into the future, using the same log-Gaussian transition weighting as
//! the per-frame induction, and the most likely beat position inside that
//! horizon is picked by a Gaussian expectation window centred half a beat
//! period ahead.
//!
//! # Reference
//!
//! Stark, A. M., Davies, M. E. P., & Plumbley, M. D. (2009). Real-Time
//! Beat-Synchronous Analysis of Musical Audio. *Proceedings of the 12th
//! International Conference on Digital Audio Effects (DAFx-09)*.

use super::log_gaussian_transition_weights;

/// Predict the offset of the next beat, in frames from the current one
///
/// `cumulative_score` is the full score history, oldest first. The returned
/// offset is in `0..beat period`; an offset of 0 means the beat is due in the
/// current frame. Deterministic for identical inputs.
pub(crate) fn predict_next_beat(cumulative_score: &[f32], beat_period: f32) -> usize {
    let history_len = cumulative_score.len();
    let horizon = (beat_period as usize).max(1);

    // Score history followed by the synthesized future
    let mut future_score = Vec::with_capacity(history_len + horizon);
    future_score.extend_from_slice(cumulative_score);

    let weights = log_gaussian_transition_weights(beat_period);

    for i in history_len..(history_len + horizon) {
        let window_start = i.saturating_sub((2.0 * beat_period).round() as usize);
        let window_end = i.saturating_sub((beat_period / 2.0).round() as usize);

        let mut max_value = 0.0f32;
        for (n, k) in (window_start..=window_end).enumerate() {
            if k >= future_score.len() || n >= weights.len() {
                break;
            }
            let weighted = future_score[k] * weights[n];
            if weighted > max_value {
                max_value = weighted;
            }
        }

        future_score.push(max_value);
    }

    // Gaussian expectation window over the synthesized horizon, centred half a
    // beat period ahead (the prediction runs at the midpoint between beats)
    let half_period = beat_period / 2.0;
    let mut best_offset = 0usize;
    let mut best_value = 0.0f32;

    for n in 0..horizon {
        let v = (n + 1) as f32;
        let expectation =
            (-(v - half_period) * (v - half_period) / (2.0 * half_period * half_period)).exp();
        let weighted = future_score[history_len + n] * expectation;

        if weighted > best_value {
            best_value = weighted;
            best_offset = n;
        }
    }

    best_offset
}
