//! Frequency Sink - Streaming Spectral Analysis Core
//!
//! Multi-channel windowed PSD estimation with triggering and a bounded frame
//! queue for pull-based visualization clients, with Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod error;
pub mod python_bindings;
pub mod sink;
pub mod spectrum;

pub use error::{SinkError, SinkResult};
pub use sink::{make, FreqSink, PlotData, SinkConfig, SpectralSink, TriggerMode};
pub use spectrum::WindowType;
