//! Configuration parameters for the beat tracker

use serde::{Deserialize, Serialize};

/// Beat tracker configuration parameters
///
/// The hop size determines how many audio samples advance between consecutive
/// analysis frames, and therefore the time resolution of the tracker. The
/// frame size is the analysis window handed to the onset detection function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Hop size in samples between consecutive analysis frames (default: 512)
    pub hop_size: usize,

    /// Frame size in samples for onset detection (default: 1024)
    pub frame_size: usize,

    /// Sample rate in Hz assumed by the tempo/period conversions (default: 44100)
    pub sample_rate: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            hop_size: 512,
            frame_size: 1024,
            sample_rate: 44100.0,
        }
    }
}

impl TrackerConfig {
    /// Create a configuration with explicit hop and frame sizes
    pub fn new(hop_size: usize, frame_size: usize) -> Self {
        Self {
            hop_size,
            frame_size,
            ..Self::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if the hop size, frame size or
    /// sample rate is non-positive.
    pub fn validate(&self) -> Result<(), crate::error::TrackerError> {
        if self.hop_size == 0 {
            return Err(crate::error::TrackerError::InvalidInput(
                "Hop size must be > 0".to_string(),
            ));
        }

        if self.frame_size == 0 {
            return Err(crate::error::TrackerError::InvalidInput(
                "Frame size must be > 0".to_string(),
            ));
        }

        if !(self.sample_rate > 0.0) {
            return Err(crate::error::TrackerError::InvalidInput(format!(
                "Sample rate must be > 0, got {}",
                self.sample_rate
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hop_size, 512);
        assert_eq!(config.frame_size, 1024);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(TrackerConfig::new(0, 1024).validate().is_err());
        assert!(TrackerConfig::new(512, 0).validate().is_err());

        let mut config = TrackerConfig::default();
        config.sample_rate = 0.0;
        assert!(config.validate().is_err());
    }
}
