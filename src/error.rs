//! Error types for the beat tracking engine

use std::fmt;

/// Errors that can occur while configuring or running the tracker
#[derive(Debug, Clone)]
pub enum TrackerError {
    /// Invalid input parameters
    InvalidInput(String),

    /// Processing error during an analysis cycle
    ProcessingError(String),

    /// Numerical error (overflow, underflow, degenerate values, etc.)
    NumericalError(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            TrackerError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            TrackerError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for TrackerError {}
