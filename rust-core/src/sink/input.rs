//! Input adapter for streaming samples and packets
//!
//! Both paths end in fft_size-sample blocks: streaming input is buffered per
//! channel until a full block is available on every channel, packets are split
//! into fft_size segments.

use std::collections::HashMap;

use log::trace;

use crate::error::{SinkError, SinkResult};

/// Stream metadata marker attached to one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTag {
    /// Absolute sample index since the stream started
    pub offset: u64,
    /// Tag name
    pub key: String,
}

impl StreamTag {
    pub fn new(offset: u64, key: impl Into<String>) -> Self {
        Self {
            offset,
            key: key.into(),
        }
    }
}

/// A discrete packet of samples
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    /// Plain uniform vector of samples
    Vector(Vec<f32>),
    /// Samples with metadata labels
    Labeled {
        metadata: HashMap<String, String>,
        data: Vec<f32>,
    },
}

impl Pdu {
    pub fn samples(&self) -> &[f32] {
        match self {
            Pdu::Vector(data) => data.as_slice(),
            Pdu::Labeled { data, .. } => data.as_slice(),
        }
    }

    /// Metadata keys of a labeled packet
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let metadata = match self {
            Pdu::Vector(_) => None,
            Pdu::Labeled { metadata, .. } => Some(metadata),
        };
        metadata.into_iter().flat_map(|m| m.keys().map(String::as_str))
    }

    /// Split the payload into fft_size segments
    ///
    /// The payload must be a non-zero multiple of `fft_size`.
    pub fn segments(&self, fft_size: usize) -> SinkResult<std::slice::ChunksExact<'_, f32>> {
        let samples = self.samples();
        if fft_size == 0 || samples.is_empty() || samples.len() % fft_size != 0 {
            return Err(SinkError::MalformedPacket {
                len: samples.len(),
                fft_size,
            });
        }
        Ok(samples.chunks_exact(fft_size))
    }
}

impl From<Vec<f32>> for Pdu {
    fn from(data: Vec<f32>) -> Self {
        Pdu::Vector(data)
    }
}

/// One fft_size block per streaming channel
#[derive(Debug, Clone, PartialEq)]
pub struct StreamBatch {
    /// Absolute index of the first sample in the batch
    pub start: u64,
    /// One block per channel
    pub blocks: Vec<Vec<f32>>,
    /// Tags whose offset falls inside the batch
    pub tags: Vec<StreamTag>,
}

/// Buffers streaming input until full blocks are available
#[derive(Debug)]
pub struct InputAdapter {
    fft_size: usize,
    pending: Vec<Vec<f32>>,
    /// Read position inside every pending buffer
    cursor: usize,
    pending_tags: Vec<StreamTag>,
    /// Absolute index of the first pending sample
    items_read: u64,
}

impl InputAdapter {
    pub fn new(channel_count: usize, fft_size: usize) -> Self {
        Self {
            fft_size,
            pending: vec![Vec::with_capacity(fft_size); channel_count],
            cursor: 0,
            pending_tags: Vec::new(),
            items_read: 0,
        }
    }

    /// Accept synchronized samples from every channel
    ///
    /// Channels are consumed up to the shortest input. Tags outside the
    /// accepted range are ignored.
    ///
    /// # Returns
    /// Number of samples consumed per channel
    pub fn push(&mut self, inputs: &[&[f32]], tags: &[StreamTag]) -> SinkResult<usize> {
        if inputs.len() != self.pending.len() {
            return Err(SinkError::ChannelCountMismatch {
                expected: self.pending.len(),
                actual: inputs.len(),
            });
        }

        let n = inputs.iter().map(|s| s.len()).min().unwrap_or(0);
        let range_start = self.items_read + self.buffered() as u64;
        let range_end = range_start + n as u64;

        // Batches already taken are discarded once per push
        let consumed = std::mem::take(&mut self.cursor);
        for (pending, input) in self.pending.iter_mut().zip(inputs) {
            pending.drain(..consumed);
            pending.extend_from_slice(&input[..n]);
        }
        self.pending_tags.extend(
            tags.iter()
                .filter(|t| t.offset >= range_start && t.offset < range_end)
                .cloned(),
        );

        trace!("Buffered {} samples on {} channel(s)", n, inputs.len());
        Ok(n)
    }

    /// Take the next full batch, if every channel has fft_size samples
    pub fn next_batch(&mut self) -> Option<StreamBatch> {
        if self.pending.is_empty() || self.buffered() < self.fft_size {
            return None;
        }

        let fft_size = self.fft_size;
        let start = self.items_read;
        let end = start + fft_size as u64;
        let range = self.cursor..self.cursor + fft_size;
        let blocks: Vec<Vec<f32>> = self
            .pending
            .iter()
            .map(|p| p[range.clone()].to_vec())
            .collect();
        self.cursor = range.end;

        let (tags, rest): (Vec<StreamTag>, Vec<StreamTag>) = self
            .pending_tags
            .drain(..)
            .partition(|t: &StreamTag| t.offset < end);
        self.pending_tags = rest;
        self.items_read = end;

        Some(StreamBatch { start, blocks, tags })
    }

    /// Samples waiting per channel
    pub fn buffered(&self) -> usize {
        self.pending.first().map_or(0, |p| p.len() - self.cursor)
    }

    /// Drop partial blocks, keeping the absolute sample count aligned
    pub fn clear(&mut self) {
        self.items_read += self.buffered() as u64;
        for pending in self.pending.iter_mut() {
            pending.clear();
        }
        self.cursor = 0;
        self.pending_tags.clear();
    }

    /// Change the block size; partial blocks are dropped
    pub fn resize(&mut self, fft_size: usize) {
        self.clear();
        self.fft_size = fft_size;
    }

    pub fn items_read(&self) -> u64 {
        self.items_read
    }
}
