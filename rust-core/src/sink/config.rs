//! Sink configuration and validation

use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SinkResult};
use crate::spectrum::{WindowType, MAX_FFT_SIZE};

/// Default number of frames held for the consumer
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Frequency sink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// FFT size, also the number of columns of every frame
    pub fft_size: usize,

    /// Window applied before each FFT
    pub window_type: WindowType,

    /// Center frequency in Hz (x-axis labelling only)
    pub center_frequency: f64,

    /// Bandwidth in Hz (x-axis labelling only)
    pub bandwidth: f64,

    /// Number of streaming inputs; 0 means packet input only
    pub channel_count: usize,

    /// Plot title
    pub name: String,

    /// Exponential averaging factor in [0, 1]
    pub fft_average: f32,

    /// Maximum number of frames waiting for the consumer
    pub queue_depth: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            window_type: WindowType::Hamming,
            center_frequency: 0.0,
            bandwidth: 1.0,
            channel_count: 1,
            name: String::new(),
            fft_average: 1.0,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl SinkConfig {
    /// Check every field; the sink is only ever built from a valid config
    pub fn validate(&self) -> SinkResult<()> {
        validate_fft_size(self.fft_size as i64)?;
        validate_average(self.fft_average)?;
        validate_frequency_range(self.center_frequency, self.bandwidth)?;
        if self.queue_depth == 0 {
            return Err(SinkError::InvalidQueueDepth);
        }
        Ok(())
    }

    /// Number of rows in every frame: one per input plus the packet row
    pub fn rows(&self) -> usize {
        self.channel_count + 1
    }

    /// Whether the sink only receives packets
    pub fn is_packet_only(&self) -> bool {
        self.channel_count == 0
    }
}

/// Accepts sizes in 1..=MAX_FFT_SIZE
pub fn validate_fft_size(size: i64) -> SinkResult<usize> {
    if size <= 0 || size as u64 > MAX_FFT_SIZE as u64 {
        return Err(SinkError::InvalidFftSize(size));
    }
    Ok(size as usize)
}

pub fn validate_average(average: f32) -> SinkResult<()> {
    if !(0.0..=1.0).contains(&average) {
        return Err(SinkError::InvalidAverage(average));
    }
    Ok(())
}

/// Center must be finite, bandwidth finite and positive
pub fn validate_frequency_range(center: f64, bandwidth: f64) -> SinkResult<()> {
    if !center.is_finite() || !bandwidth.is_finite() || bandwidth <= 0.0 {
        return Err(SinkError::InvalidFrequencyRange { center, bandwidth });
    }
    Ok(())
}

/// Frequency of every column for a centred spectrum
pub fn frequency_axis(center: f64, bandwidth: f64, fft_size: usize) -> Vec<f64> {
    let step = bandwidth / fft_size as f64;
    let half = (fft_size / 2) as f64;
    (0..fft_size)
        .map(|col| center + (col as f64 - half) * step)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rows(), 2);
        assert!(!config.is_packet_only());
    }

    #[test]
    fn test_rejects_bad_fields() {
        let mut config = SinkConfig::default();
        config.fft_size = 0;
        assert_eq!(config.validate(), Err(SinkError::InvalidFftSize(0)));

        let mut config = SinkConfig::default();
        config.fft_average = 1.5;
        assert_eq!(config.validate(), Err(SinkError::InvalidAverage(1.5)));

        let mut config = SinkConfig::default();
        config.bandwidth = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SinkError::InvalidFrequencyRange { .. })
        ));

        let mut config = SinkConfig::default();
        config.queue_depth = 0;
        assert_eq!(config.validate(), Err(SinkError::InvalidQueueDepth));
    }

    #[test]
    fn test_fft_size_bounds() {
        assert_eq!(validate_fft_size(-4), Err(SinkError::InvalidFftSize(-4)));
        assert_eq!(validate_fft_size(1), Ok(1));
        assert_eq!(validate_fft_size(MAX_FFT_SIZE as i64), Ok(MAX_FFT_SIZE));
        assert!(validate_fft_size(MAX_FFT_SIZE as i64 + 1).is_err());
    }

    #[test]
    fn test_nan_average_rejected() {
        assert!(validate_average(f32::NAN).is_err());
        assert!(validate_average(0.0).is_ok());
        assert!(validate_average(1.0).is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{ "fft_size": 256, "window_type": "blackman_harris", "channel_count": 0 }"#;
        let config: SinkConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.fft_size, 256);
        assert_eq!(config.window_type, WindowType::BlackmanHarris);
        assert!(config.is_packet_only());
        assert_eq!(config.queue_depth, DEFAULT_QUEUE_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frequency_axis() {
        let axis = frequency_axis(100.0e6, 2.0e6, 4);

        assert_eq!(axis.len(), 4);
        assert_eq!(axis[2], 100.0e6);
        assert_eq!(axis[0], 99.0e6);
        assert_eq!(axis[3], 100.5e6);
    }
}
