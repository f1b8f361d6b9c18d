//! Feature extraction and tracking modules
//!
//! This module contains the analysis stages of the tracker:
//! - Onset detection function providers (streaming ODF)
//! - Onset/score buffering, score induction and beat prediction
//! - Tempo estimation (autocorrelation, comb filterbank, belief update)

pub mod onset;
pub mod tempo;
pub mod tracking;
