//! Seams for external collaborators
//!
//! The tracker delegates two pieces of numeric heavy lifting to pluggable
//! backends selected at construction time:
//! - a fixed-length complex spectral transform, used only for the
//!   power-spectrum autocorrelation method
//! - a resampler that maps the variable-length onset history onto the fixed
//!   analysis length
//!
//! Both are behind small capability traits so alternative backends can be
//! swapped in without touching the analysis code.

pub mod resample;
pub mod transform;

pub use resample::{Resampler, SincResampler};
pub use transform::{RustFftTransform, SpectralTransform};
