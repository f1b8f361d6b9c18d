//! Onset-history buffering, score induction and beat prediction
//!
//! The tracker keeps two parallel histories: the raw onset-strength samples
//! and the cumulative beat-alignment score derived from them. Both use the
//! same append-to-end/drop-oldest ring so that the highest index is always the
//! most recent frame.

pub mod predictor;
pub mod score;

pub use score::ScoreTracker;

/// Tightness of the log-Gaussian transition weighting
///
/// Higher values concentrate the weighting on exactly one beat period in the
/// past; lower values tolerate more tempo drift between consecutive beats.
pub(crate) const TIGHTNESS: f32 = 5.0;

/// Balance between the incoming onset sample and the recursive score maximum
pub(crate) const SCORE_ALPHA: f32 = 0.9;

/// Fixed-capacity ring buffer with append-to-end/drop-oldest semantics
///
/// Index 0 is the oldest retained sample; `len() - 1` is the most recent.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<f32>,
    write_index: usize,
}

impl RingBuffer {
    /// Create a zero-filled ring buffer with the given capacity
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
            write_index: 0,
        }
    }

    /// Number of samples held (always equal to the capacity)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer has zero capacity
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a sample at the end, dropping the oldest
    pub fn push(&mut self, value: f32) {
        self.data[self.write_index] = value;
        self.write_index = (self.write_index + 1) % self.data.len();
    }

    /// Read the sample at logical index `index` (0 = oldest)
    pub fn get(&self, index: usize) -> f32 {
        self.data[(self.write_index + index) % self.data.len()]
    }

    /// Overwrite the sample at logical index `index` (0 = oldest)
    pub fn set(&mut self, index: usize, value: f32) {
        let len = self.data.len();
        self.data[(self.write_index + index) % len] = value;
    }

    /// Copy the contents out in logical order (oldest first)
    pub fn to_vec(&self) -> Vec<f32> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

/// Log-Gaussian transition weighting over the past `[-2P, -P/2]` window
///
/// Weight for offset `v` frames in the past is
/// `exp(-0.5 * (tightness * ln(-v / P))^2)`, which peaks at exactly one beat
/// period in the past and decays towards half and double that distance.
pub(crate) fn log_gaussian_transition_weights(beat_period: f32) -> Vec<f32> {
    let window_size = (2.0 * beat_period).round() as isize - (beat_period / 2.0).round() as isize + 1;

    let mut v = -2.0 * beat_period;
    let mut weights = Vec::with_capacity(window_size.max(0) as usize);

    for _ in 0..window_size.max(0) {
        if v < 0.0 {
            let a = TIGHTNESS * (-v / beat_period).ln();
            weights.push((-0.5 * a * a).exp());
        } else {
            weights.push(0.0);
        }
        v += 1.0;
    }

    weights
}
