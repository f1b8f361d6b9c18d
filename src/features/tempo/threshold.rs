//! Shared numeric utilities for the tempo estimator
//!
//! Adaptive background-threshold removal, windowed mean and vector
//! normalization. The adaptive threshold subtracts a local moving average
//! from each position so that only genuinely salient peaks survive into the
//! periodicity analysis.

/// Samples looked back by the moving-average window
const PRE_WINDOW: usize = 8;

/// Samples looked forward by the moving-average window
const POST_WINDOW: usize = 7;

/// Mean over the inclusive index range `[start, end]`
pub fn mean_of_range(data: &[f32], start: usize, end: usize) -> f32 {
    if start > end || end >= data.len() {
        return 0.0;
    }

    let length = end - start + 1;
    let sum: f32 = data[start..=end].iter().sum();
    sum / length as f32
}

/// Subtract a local moving average from each position, clipping at zero
///
/// The window is asymmetric (8 samples back, 7 forward) and clamped at the
/// sequence boundaries. Every output value is non-negative and never larger
/// than the corresponding input value.
pub fn adaptive_threshold(data: &mut [f32]) {
    if data.is_empty() {
        return;
    }

    let len = data.len();
    let mut threshold = vec![0.0f32; len];

    for (i, value) in threshold.iter_mut().enumerate() {
        let start = i.saturating_sub(PRE_WINDOW);
        let end = (i + POST_WINDOW).min(len - 1);
        *value = mean_of_range(data, start, end);
    }

    for (value, thresh) in data.iter_mut().zip(threshold.iter()) {
        *value = (*value - thresh).max(0.0);
    }
}

/// L1-normalize in place
///
/// Divides by the sum if it is positive; a vector with non-positive sum is
/// left unchanged.
pub fn normalize_in_place(data: &mut [f32]) {
    let sum: f32 = data.iter().sum();

    if sum > 0.0 {
        for value in data.iter_mut() {
            *value /= sum;
        }
    }
}
