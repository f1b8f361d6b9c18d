//! Harmonic comb filterbank
//!
//! Each candidate beat period sums autocorrelation energy at its first four
//! harmonics, spreading each harmonic over neighbouring lags so that slightly
//! detuned periodicities still contribute. A Rayleigh-distributed prior biases
//! the bank towards moderate, musically plausible beat periods.
//!
//! # Reference
//!
//! Davies, M. E. P., & Plumbley, M. D. (2007). Context-Dependent Beat Tracking
//! of Musical Audio. *IEEE Transactions on Audio, Speech, and Language
//! Processing*, 15(3), 1009-1020.

/// Number of candidate beat periods in the bank
pub const COMB_BANK_LEN: usize = 128;

/// Shape parameter of the Rayleigh prior, in lag frames
pub const RAYLEIGH_PARAMETER: f32 = 43.0;

/// Number of harmonics summed per candidate period
const NUM_COMB_ELEMENTS: usize = 4;

/// Build the Rayleigh weighting vector over candidate beat periods
///
/// `w[n] = (n / p^2) * exp(-n^2 / (2 p^2))` with shape parameter `p`, peaking
/// at a lag of `p` frames (roughly 120 BPM at hop 512 / 44.1 kHz).
pub fn rayleigh_weighting() -> Vec<f32> {
    let p_sq = RAYLEIGH_PARAMETER * RAYLEIGH_PARAMETER;

    (0..COMB_BANK_LEN)
        .map(|n| {
            let n = n as f32;
            (n / p_sq) * (-(n * n) / (2.0 * p_sq)).exp()
        })
        .collect()
}

/// Run the comb filterbank over an autocorrelation function
///
/// For each candidate period `i` in `2..=127`, sums ACF energy at harmonics
/// `a = 1..=4`, spread over offsets `b` in `[1-a, a-1]` and normalized by
/// `2a - 1`, then applies the Rayleigh prior. The response lands in
/// `output[i - 1]`.
pub fn comb_filter_bank(acf: &[f32], weighting: &[f32], output: &mut [f32]) {
    debug_assert_eq!(weighting.len(), COMB_BANK_LEN);
    debug_assert_eq!(output.len(), COMB_BANK_LEN);

    output.fill(0.0);

    for i in 2..COMB_BANK_LEN {
        for a in 1..=NUM_COMB_ELEMENTS {
            for b in (1 - a as isize)..=(a as isize - 1) {
                let lag = (a as isize * i as isize + b - 1) as usize;
                if lag < acf.len() {
                    output[i - 1] += acf[lag] * weighting[i - 1] / (2 * a - 1) as f32;
                }
            }
        }
    }
}
