//! Per-channel spectral estimator
//!
//! Combines the window table and FFT engine, converts to dB and keeps one
//! exponential-average accumulator per output row.

use log::debug;
use ndarray::{Array2, ArrayView1};

use super::fft::{FftEngine, POWER_FLOOR};
use super::windowing::WindowTable;
use super::windows::WindowType;

/// Value a row holds before anything has been computed for it
pub fn floor_db() -> f32 {
    10.0 * POWER_FLOOR.log10()
}

/// Windowed PSD estimator for a fixed number of rows
pub struct SpectralEstimator {
    window: WindowTable,
    fft: FftEngine,

    /// Averaging factor α; 0 disables averaging, 1 is equivalent to none
    average: f32,

    /// Exponential-average state, one row per output row
    accumulators: Array2<f32>,

    /// Latest emitted spectrum per row
    spectra: Array2<f32>,

    /// Scratch buffers reused for every block
    windowed: Vec<f32>,
    raw: Vec<f32>,
}

impl SpectralEstimator {
    /// Create an estimator for `rows` rows of `fft_size` bins
    pub fn new(fft_size: usize, window_type: WindowType, rows: usize, average: f32) -> Self {
        Self {
            window: WindowTable::new(window_type, fft_size),
            fft: FftEngine::new(fft_size),
            average,
            accumulators: Array2::zeros((rows, fft_size)),
            spectra: Array2::from_elem((rows, fft_size), floor_db()),
            windowed: vec![0.0; fft_size],
            raw: vec![0.0; fft_size],
        }
    }

    /// Estimate one block for `row` and store the result in [`Self::spectra`]
    ///
    /// `block` must hold `fft_size` samples; shorter blocks are zero-padded.
    pub fn estimate(&mut self, row: usize, block: &[f32]) {
        if row >= self.spectra.nrows() {
            return;
        }

        let n = block.len().min(self.windowed.len());
        self.window.apply(&block[..n], &mut self.windowed[..n]);
        self.windowed[n..].fill(0.0);

        let correction = self.window.amplitude_correction() as f32;
        self.fft.compute_power_db(&self.windowed, correction, &mut self.raw);

        let alpha = self.average;
        let mut acc = self.accumulators.row_mut(row);
        let mut out = self.spectra.row_mut(row);

        if alpha > 0.0 && alpha < 1.0 {
            for ((a, o), &x) in acc.iter_mut().zip(out.iter_mut()).zip(&self.raw) {
                *a = (1.0 - alpha) * *a + alpha * x;
                *o = *a;
            }
        } else {
            for ((a, o), &x) in acc.iter_mut().zip(out.iter_mut()).zip(&self.raw) {
                *a = x;
                *o = x;
            }
        }
    }

    /// Change the FFT size; rebuilds the window and clears averaging state
    pub fn resize(&mut self, fft_size: usize) {
        let rows = self.spectra.nrows();
        self.fft = FftEngine::new(fft_size);
        self.window.rebuild(self.window.window_type(), fft_size);
        self.accumulators = Array2::zeros((rows, fft_size));
        self.spectra = Array2::from_elem((rows, fft_size), floor_db());
        self.windowed = vec![0.0; fft_size];
        self.raw = vec![0.0; fft_size];
        debug!("Estimator resized to {} bins x {} rows", fft_size, rows);
    }

    /// Change the window type; clears averaging state
    pub fn set_window(&mut self, window_type: WindowType) {
        self.window.rebuild(window_type, self.fft.fft_size());
        self.reset();
    }

    /// Change the averaging factor; clears averaging state
    pub fn set_average(&mut self, average: f32) {
        self.average = average;
        self.accumulators.fill(0.0);
    }

    /// Zero the accumulators and forget the latest spectra
    pub fn reset(&mut self) {
        self.accumulators.fill(0.0);
        self.spectra.fill(floor_db());
    }

    pub fn spectra(&self) -> &Array2<f32> {
        &self.spectra
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, f32> {
        self.spectra.row(row)
    }

    pub fn window(&self) -> &WindowTable {
        &self.window
    }

    pub fn fft_size(&self) -> usize {
        self.fft.fft_size()
    }
}
