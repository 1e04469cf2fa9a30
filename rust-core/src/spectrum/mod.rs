//! Spectral analysis with FFT

pub mod analysis;
pub mod fft;
pub mod windowing;
pub mod windows;

pub use analysis::SpectralEstimator;
pub use fft::FftEngine;
pub use windowing::WindowTable;
pub use windows::{generate_window, WindowType};

/// Largest FFT size accepted by the sink
pub const MAX_FFT_SIZE: usize = 1 << 20;
