//! Streaming frequency sink
//!
//! Ingests synchronized sample streams or packets, computes one windowed PSD
//! row per channel and queues multi-channel frames for a pull-based consumer.
//!
//! ## Architecture
//!
//! - [`SpectralSink`] is the capability set a host drives
//! - [`FreqSink`] is its implementation
//! - [`make`] builds one from the classic positional arguments
//!
//! ```
//! use freq_sink::sink::{make, SpectralSink};
//! use freq_sink::WindowType;
//!
//! let mut sink = make(256, WindowType::Hann, 100.0e6, 2.0e6, "rx", 1).unwrap();
//! let samples = vec![0.25f32; 256];
//! sink.work(&[&samples], &[]).unwrap();
//!
//! let plot = sink.get_plot_data();
//! assert_eq!((plot.nrows, plot.ncols), (2, 256));
//! assert!(sink.get_plot_data().is_empty());
//! ```

pub mod config;
pub mod freq_sink;
pub mod input;
pub mod message;
pub mod queue;
pub mod trigger;

pub use config::SinkConfig;
pub use freq_sink::{FrameReader, FreqSink, SinkStats};
pub use input::{Pdu, StreamTag};
pub use message::{SinkHandle, SinkMessage};
pub use queue::{Frame, FrameQueue, PlotData};
pub use trigger::{TriggerMode, TriggerState};

use crate::error::{SinkError, SinkResult};
use crate::spectrum::WindowType;

/// Operations a host performs on a frequency sink
///
/// Mutating operations take `&mut self` and are therefore serialized with
/// [`SpectralSink::work`]; a batch is always processed under one
/// configuration. Consumers on other threads use [`SpectralSink::reader`].
pub trait SpectralSink: Send {
    /// Pop the oldest frame; empty result (0 x 0) when none is ready
    fn get_plot_data(&self) -> PlotData;

    /// Clear the queue, averaging state and partially buffered input
    fn reset(&mut self);

    fn get_center_freq(&self) -> f64;
    fn get_bandwidth(&self) -> f64;
    fn get_fft_size(&self) -> usize;
    fn get_wintype(&self) -> WindowType;
    fn get_name(&self) -> &str;
    fn get_nconnections(&self) -> usize;

    /// Change the window; rebuilds coefficients and clears averaging
    fn set_fft_window(&mut self, window: WindowType) -> SinkResult<()>;

    /// Regenerate window coefficients for the current size and type
    fn buildwindow(&mut self);

    /// Set the averaging factor α in [0, 1]; 0 or 1 disables averaging
    fn set_fft_avg(&mut self, average: f32) -> SinkResult<()>;

    /// Change the FFT size; the configuration is untouched on error
    fn fftresize(&mut self, size: i64) -> SinkResult<()>;

    fn set_frequency_range(&mut self, center: f64, bandwidth: f64) -> SinkResult<()>;

    /// Recenter the frequency axis, keeping the bandwidth
    fn handle_set_freq(&mut self, center: f64) -> SinkResult<()>;

    /// Configure the trigger; the previous trigger stays active on error
    fn set_trigger_mode(
        &mut self,
        mode: TriggerMode,
        level: f32,
        channel: usize,
        tag_key: &str,
    ) -> SinkResult<()>;

    /// Streaming path: one slice per channel plus any stream tags
    ///
    /// Returns the number of samples consumed per channel.
    fn work(&mut self, inputs: &[&[f32]], tags: &[StreamTag]) -> SinkResult<usize>;

    /// Packet path: returns the number of fft_size segments processed
    fn handle_pdu(&mut self, pdu: &Pdu) -> SinkResult<usize>;

    /// Consumer handle onto the frame queue
    fn reader(&self) -> FrameReader;

    /// Sending side of the inbound message port
    fn handle(&self) -> SinkHandle;
}

/// Build a frequency sink
///
/// # Arguments
/// * `fft_size` - FFT size; packets must be a multiple of it
/// * `window_type` - Window applied before each FFT
/// * `center_frequency` - Center of the x-axis in Hz
/// * `bandwidth` - Span of the x-axis in Hz
/// * `name` - Plot title
/// * `channel_count` - Streaming inputs; 0 for packet-only operation
pub fn make(
    fft_size: i64,
    window_type: WindowType,
    center_frequency: f64,
    bandwidth: f64,
    name: &str,
    channel_count: i64,
) -> SinkResult<Box<dyn SpectralSink>> {
    let config = make_config(
        fft_size,
        window_type,
        center_frequency,
        bandwidth,
        name,
        channel_count,
    )?;
    Ok(Box::new(FreqSink::new(config)?))
}

/// Turn the positional construction arguments into a [`SinkConfig`]
pub fn make_config(
    fft_size: i64,
    window_type: WindowType,
    center_frequency: f64,
    bandwidth: f64,
    name: &str,
    channel_count: i64,
) -> SinkResult<SinkConfig> {
    let fft_size = config::validate_fft_size(fft_size)?;
    if channel_count < 0 {
        return Err(SinkError::InvalidChannelCount(channel_count));
    }

    Ok(SinkConfig {
        fft_size,
        window_type,
        center_frequency,
        bandwidth,
        channel_count: channel_count as usize,
        name: name.to_string(),
        ..SinkConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_validates_arguments() {
        assert_eq!(
            make(0, WindowType::Hann, 0.0, 1.0, "x", 1).err(),
            Some(SinkError::InvalidFftSize(0))
        );
        assert_eq!(
            make(64, WindowType::Hann, 0.0, 1.0, "x", -1).err(),
            Some(SinkError::InvalidChannelCount(-1))
        );
    }

    #[test]
    fn test_make_packet_only() {
        let mut sink = make(32, WindowType::Hamming, 1.0e9, 10.0e6, "pdu", 0).unwrap();
        assert_eq!(sink.get_nconnections(), 0);

        // No streams to feed
        assert_eq!(sink.work(&[], &[]), Ok(0));

        assert_eq!(sink.handle_pdu(&Pdu::from(vec![1.0; 64])), Ok(2));
        let plot = sink.get_plot_data();
        assert_eq!((plot.nrows, plot.ncols), (1, 32));
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = make(16, WindowType::Hann, 0.0, 1.0, "a", 1).unwrap();
        let b = make(16, WindowType::Hann, 0.0, 1.0, "b", 1).unwrap();

        a.set_trigger_mode(TriggerMode::Normal, 0.0, 0, "").unwrap();
        a.work(&[&[0.0; 16]], &[]).unwrap();
        a.fftresize(32).unwrap();

        assert_eq!(b.get_fft_size(), 16);
        assert!(b.get_plot_data().is_empty());
        assert!(a.get_plot_data().is_empty());
    }

    #[test]
    fn test_consumer_on_another_thread() {
        let mut sink = make(16, WindowType::Hann, 0.0, 1.0, "t", 1).unwrap();
        let reader = sink.reader();

        let consumer = std::thread::spawn(move || {
            let mut frames = 0;
            while frames < 5 {
                if !reader.get_plot_data().is_empty() {
                    frames += 1;
                } else {
                    std::thread::yield_now();
                }
            }
            frames
        });

        for _ in 0..5 {
            sink.work(&[&[0.5; 16]], &[]).unwrap();
        }
        assert_eq!(consumer.join().unwrap(), 5);
    }
}
