//! Frequency sink: window → FFT → average → trigger → queue
//!
//! The sink is owned by the producer context. Configuration changes take
//! `&mut self`, so they always land between batches; the consumer only holds a
//! [`FrameReader`] onto the shared queue.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

use super::config::{self, SinkConfig};
use super::input::{InputAdapter, Pdu, StreamBatch, StreamTag};
use super::message::{message_port, SinkHandle, SinkMessage};
use super::queue::{Frame, FrameQueue, PlotData, QueueStats};
use super::trigger::{TriggerEngine, TriggerMode, TriggerState};
use super::SpectralSink;
use crate::error::SinkResult;
use crate::spectrum::{SpectralEstimator, WindowType};

/// Processing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Frames computed, admitted or not
    pub frames_computed: u64,
    /// Frames withheld by the trigger
    pub frames_rejected: u64,
    /// Packets dropped as malformed
    pub packets_dropped: u64,
    /// Queue counters
    pub queue: QueueStats,
}

/// Consumer-side handle onto the frame queue
#[derive(Clone)]
pub struct FrameReader {
    queue: Arc<FrameQueue>,
}

impl FrameReader {
    /// Pop the oldest frame, or the empty result
    pub fn get_plot_data(&self) -> PlotData {
        self.queue.get_plot_data()
    }

    /// Frames waiting to be read
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Multi-channel PSD sink
pub struct FreqSink {
    config: SinkConfig,
    estimator: SpectralEstimator,
    trigger: TriggerEngine,
    input: InputAdapter,
    queue: Arc<FrameQueue>,
    messages: Receiver<SinkMessage>,
    handle: SinkHandle,
    frames_computed: u64,
    frames_rejected: u64,
    packets_dropped: u64,
}

impl FreqSink {
    /// Build a sink from a validated configuration
    pub fn new(config: SinkConfig) -> SinkResult<Self> {
        config.validate()?;

        let queue = Arc::new(FrameQueue::new(config.queue_depth)?);
        let (handle, messages) = message_port();

        info!(
            "Frequency sink '{}': {} channel(s), FFT {} ({:?}), fc {} Hz, bw {} Hz",
            config.name,
            config.channel_count,
            config.fft_size,
            config.window_type,
            config.center_frequency,
            config.bandwidth
        );

        Ok(Self {
            estimator: SpectralEstimator::new(
                config.fft_size,
                config.window_type,
                config.rows(),
                config.fft_average,
            ),
            trigger: TriggerEngine::new(),
            input: InputAdapter::new(config.channel_count, config.fft_size),
            queue,
            messages,
            handle,
            config,
            frames_computed: 0,
            frames_rejected: 0,
            packets_dropped: 0,
        })
    }

    /// Sending side of the message port
    pub fn handle(&self) -> SinkHandle {
        self.handle.clone()
    }

    /// Consumer handle sharing this sink's queue
    pub fn reader(&self) -> FrameReader {
        FrameReader {
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn trigger_state(&self) -> &TriggerState {
        self.trigger.state()
    }

    /// Current averaging factor
    pub fn get_fft_avg(&self) -> f32 {
        self.config.fft_average
    }

    /// Current window coefficients
    pub fn window_coefficients(&self) -> &Arc<[f32]> {
        self.estimator.window().coefficients()
    }

    /// Frequency of every frame column in Hz
    pub fn frequency_axis(&self) -> Vec<f64> {
        config::frequency_axis(
            self.config.center_frequency,
            self.config.bandwidth,
            self.config.fft_size,
        )
    }

    pub fn stats(&self) -> SinkStats {
        SinkStats {
            frames_computed: self.frames_computed,
            frames_rejected: self.frames_rejected,
            packets_dropped: self.packets_dropped,
            queue: self.queue.stats(),
        }
    }

    /// Change the window from an integer window code
    pub fn set_fft_window_code(&mut self, code: i32) -> SinkResult<()> {
        let window = WindowType::try_from(code).map_err(|e| {
            warn!("Rejected window change: {}", e);
            e
        })?;
        self.set_fft_window(window)
    }

    /// Apply every message waiting on the port
    pub fn process_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.messages.try_recv() {
            match message {
                SinkMessage::SetFreq(center) => {
                    if let Err(e) = self.handle_set_freq(center) {
                        warn!("Ignoring frequency update: {}", e);
                    }
                }
                SinkMessage::Pdu(pdu) => {
                    // Malformed packets are counted and logged in handle_pdu
                    let _ = self.handle_pdu(&pdu);
                }
            }
            handled += 1;
        }
        handled
    }

    fn process_stream_batch(&mut self, batch: StreamBatch) {
        for (channel, block) in batch.blocks.iter().enumerate() {
            self.estimator.estimate(channel, block);
        }

        let tag_seen = batch.tags.iter().any(|t| self.trigger.matches_tag(&t.key));
        let trigger_row = if self.trigger.mode().uses_channel() {
            self.trigger.channel()
        } else {
            0
        };
        self.admit(trigger_row, tag_seen);
    }

    /// Run the trigger on the latest spectra and queue a frame if admitted
    fn admit(&mut self, trigger_row: usize, tag_seen: bool) {
        self.frames_computed += 1;

        let admission = self
            .trigger
            .evaluate(self.estimator.row(trigger_row), tag_seen);
        if !admission.admit {
            self.frames_rejected += 1;
            return;
        }

        let frame = Frame::new(self.estimator.spectra().clone(), admission.triggered);
        if self.queue.enqueue(frame).is_some() {
            debug!("Frame queue full, evicted oldest frame");
        }
    }

    fn packet_row(&self) -> usize {
        self.config.channel_count
    }
}

impl SpectralSink for FreqSink {
    fn get_plot_data(&self) -> PlotData {
        self.queue.get_plot_data()
    }

    fn reset(&mut self) {
        let dropped = self.queue.clear();
        self.estimator.reset();
        self.input.clear();
        info!(
            "Frequency sink '{}' reset, {} frame(s) discarded",
            self.config.name, dropped
        );
    }

    fn get_center_freq(&self) -> f64 {
        self.config.center_frequency
    }

    fn get_bandwidth(&self) -> f64 {
        self.config.bandwidth
    }

    fn get_fft_size(&self) -> usize {
        self.config.fft_size
    }

    fn get_wintype(&self) -> WindowType {
        self.config.window_type
    }

    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_nconnections(&self) -> usize {
        self.config.channel_count
    }

    fn set_fft_window(&mut self, window: WindowType) -> SinkResult<()> {
        if window != self.config.window_type {
            self.config.window_type = window;
            self.buildwindow();
            debug!("Window set to {:?}", window);
        }
        Ok(())
    }

    fn buildwindow(&mut self) {
        self.estimator.set_window(self.config.window_type);
    }

    fn set_fft_avg(&mut self, average: f32) -> SinkResult<()> {
        config::validate_average(average).map_err(|e| {
            warn!("Rejected averaging change: {}", e);
            e
        })?;
        if average != self.config.fft_average {
            self.config.fft_average = average;
            self.estimator.set_average(average);
            debug!("Averaging factor set to {}", average);
        }
        Ok(())
    }

    fn fftresize(&mut self, size: i64) -> SinkResult<()> {
        let size = config::validate_fft_size(size).map_err(|e| {
            warn!("Rejected FFT resize: {}", e);
            e
        })?;
        if size != self.config.fft_size {
            self.config.fft_size = size;
            self.estimator.resize(size);
            self.input.resize(size);
            debug!("FFT resized to {}", size);
        }
        Ok(())
    }

    fn set_frequency_range(&mut self, center: f64, bandwidth: f64) -> SinkResult<()> {
        config::validate_frequency_range(center, bandwidth)?;
        self.config.center_frequency = center;
        self.config.bandwidth = bandwidth;
        Ok(())
    }

    fn handle_set_freq(&mut self, center: f64) -> SinkResult<()> {
        config::validate_frequency_range(center, self.config.bandwidth)?;
        self.config.center_frequency = center;
        debug!("Center frequency set to {} Hz", center);
        Ok(())
    }

    fn set_trigger_mode(
        &mut self,
        mode: TriggerMode,
        level: f32,
        channel: usize,
        tag_key: &str,
    ) -> SinkResult<()> {
        let state = TriggerState {
            mode,
            level,
            channel,
            tag_key: tag_key.to_string(),
        };
        self.trigger
            .configure(state, self.config.channel_count)
            .map_err(|e| {
                warn!("Rejected trigger change: {}", e);
                e
            })?;
        debug!("Trigger set to {:?}", self.trigger.state());
        Ok(())
    }

    fn work(&mut self, inputs: &[&[f32]], tags: &[StreamTag]) -> SinkResult<usize> {
        self.process_messages();

        let consumed = self.input.push(inputs, tags)?;
        while let Some(batch) = self.input.next_batch() {
            self.process_stream_batch(batch);
            self.process_messages();
        }

        Ok(consumed)
    }

    fn handle_pdu(&mut self, pdu: &Pdu) -> SinkResult<usize> {
        let fft_size = self.config.fft_size;
        let segments = match pdu.segments(fft_size) {
            Ok(segments) => segments,
            Err(e) => {
                self.packets_dropped += 1;
                warn!("Dropping packet: {}", e);
                return Err(e);
            }
        };

        let tag_seen = pdu.keys().any(|k| self.trigger.matches_tag(k));
        let row = self.packet_row();
        let mut count = 0;
        for segment in segments {
            self.estimator.estimate(row, segment);
            self.admit(row, tag_seen);
            count += 1;
        }

        Ok(count)
    }

    fn reader(&self) -> FrameReader {
        FreqSink::reader(self)
    }

    fn handle(&self) -> SinkHandle {
        FreqSink::handle(self)
    }
}
