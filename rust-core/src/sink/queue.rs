//! Bounded frame queue shared between the producer and the consumer
//!
//! A single mutex guards the ring so a frame's shape and data are always read
//! together. When full, the oldest frame is evicted to make room.

use std::sync::{Mutex, MutexGuard};

use ndarray::Array2;
use ringbuf::{HeapRb, Rb};

use crate::error::{SinkError, SinkResult};

/// One multi-channel PSD snapshot, immutable once queued
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// (channel_count + 1) x fft_size dB values
    data: Array2<f32>,
    /// Trigger condition seen for this frame
    triggered: bool,
}

impl Frame {
    pub fn new(data: Array2<f32>, triggered: bool) -> Self {
        Self { data, triggered }
    }

    pub fn into_plot_data(self) -> PlotData {
        let (nrows, ncols) = self.data.dim();
        PlotData {
            nrows,
            ncols,
            data: self.data,
            triggered: self.triggered,
        }
    }
}

/// Result of a pull from the consumer side
///
/// Owns its data. An empty queue yields `nrows == ncols == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub nrows: usize,
    pub ncols: usize,
    pub data: Array2<f32>,
    pub triggered: bool,
}

impl PlotData {
    /// The "no frame available" result
    pub fn empty() -> Self {
        Self {
            nrows: 0,
            ncols: 0,
            data: Array2::zeros((0, 0)),
            triggered: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.ncols == 0
    }

    /// Split into the dB matrix and the trigger flag
    pub fn into_parts(self) -> (Array2<f32>, bool) {
        (self.data, self.triggered)
    }
}

/// Queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Frames ever enqueued
    pub enqueued: u64,
    /// Frames dropped to make room
    pub evicted: u64,
    /// Frames currently waiting
    pub pending: usize,
}

struct Inner {
    ring: HeapRb<Frame>,
    enqueued: u64,
    evicted: u64,
}

/// Thread-safe bounded FIFO of frames
pub struct FrameQueue {
    inner: Mutex<Inner>,
}

impl FrameQueue {
    /// Create a queue holding at most `capacity` frames
    pub fn new(capacity: usize) -> SinkResult<Self> {
        if capacity == 0 {
            return Err(SinkError::InvalidQueueDepth);
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                ring: HeapRb::new(capacity),
                enqueued: 0,
                evicted: 0,
            }),
        })
    }

    // A panic while holding the lock cannot leave a frame half-written, so a
    // poisoned queue is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Append a frame, evicting the oldest one if full
    ///
    /// # Returns
    /// The evicted frame, if any
    pub fn enqueue(&self, frame: Frame) -> Option<Frame> {
        let mut inner = self.lock();

        let evicted = inner.ring.push_overwrite(frame);
        if evicted.is_some() {
            inner.evicted += 1;
        }
        inner.enqueued += 1;

        evicted
    }

    /// Remove and return the oldest frame
    pub fn dequeue_oldest(&self) -> Option<Frame> {
        self.lock().ring.pop()
    }

    /// Pop the oldest frame as plot data, or the empty result
    pub fn get_plot_data(&self) -> PlotData {
        self.dequeue_oldest()
            .map(Frame::into_plot_data)
            .unwrap_or_else(PlotData::empty)
    }

    /// Drop every waiting frame
    ///
    /// # Returns
    /// Number of frames discarded
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let mut count = 0;
        while inner.ring.pop().is_some() {
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> QueueStats {
        let inner = self.lock();
        QueueStats {
            enqueued: inner.enqueued,
            evicted: inner.evicted,
            pending: inner.ring.len(),
        }
    }
}
