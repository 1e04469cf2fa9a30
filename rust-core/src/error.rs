//! Error type shared by every sink component

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SinkError {
    #[error("Invalid FFT size {0} (expected 1..={})", crate::spectrum::MAX_FFT_SIZE)]
    InvalidFftSize(i64),

    #[error("Invalid channel count {0}")]
    InvalidChannelCount(i64),

    #[error("Unknown window type code {0}")]
    UnknownWindow(i32),

    #[error("Averaging factor {0} outside [0, 1]")]
    InvalidAverage(f32),

    #[error("Invalid frequency range: center {center} Hz, bandwidth {bandwidth} Hz")]
    InvalidFrequencyRange { center: f64, bandwidth: f64 },

    #[error("Trigger channel {channel} out of range for {channel_count} input channel(s)")]
    TriggerChannel { channel: usize, channel_count: usize },

    #[error("Expected {expected} input stream(s), got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error("Malformed packet: payload length {len} is not a non-zero multiple of FFT size {fft_size}")]
    MalformedPacket { len: usize, fft_size: usize },

    #[error("Queue depth must be at least 1")]
    InvalidQueueDepth,

    #[error("Message queue full, message dropped")]
    MessageQueueFull,

    #[error("Sink has been dropped")]
    SinkClosed,
}

pub type SinkResult<T> = Result<T, SinkError>;
