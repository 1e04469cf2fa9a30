//! FFT engine producing centred power spectra
//!
//! Uses a full complex transform so one block of N real samples yields N
//! bins, ordered from -fs/2 to +fs/2 with DC in the middle column.

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Power floor applied before the log, -200 dB
pub const POWER_FLOOR: f32 = 1e-20;

/// FFT engine for real-valued sample blocks
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Forward transform plan
    fft: Arc<dyn Fft<f32>>,

    /// Reusable transform buffer
    buffer: Vec<Complex<f32>>,

    /// Reusable scratch space for the transform
    scratch: Vec<Complex<f32>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, any positive length)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft_size,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
        }
    }

    /// Compute the centred power spectrum in dB
    ///
    /// # Arguments
    /// * `windowed` - Windowed block (zero-padded if shorter than fft_size)
    /// * `correction` - Amplitude scale applied to |X[k]| before squaring
    /// * `output` - Destination for fft_size dB values
    ///
    /// Each bin holds `10*log10(max((|X[k]|*correction)^2, POWER_FLOOR))`.
    pub fn compute_power_db(&mut self, windowed: &[f32], correction: f32, output: &mut [f32]) {
        let copy_len = windowed.len().min(self.fft_size);
        for (dst, &src) in self.buffer.iter_mut().zip(&windowed[..copy_len]) {
            *dst = Complex::new(src, 0.0);
        }
        for dst in self.buffer[copy_len..].iter_mut() {
            *dst = Complex::new(0.0, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // fftshift: bin k lands in column (k + N/2) mod N
        let half = self.fft_size / 2;
        for (k, bin) in self.buffer.iter().enumerate() {
            let power = bin.norm_sqr() * correction * correction;
            let column = (k + self.fft_size - half) % self.fft_size;
            if let Some(slot) = output.get_mut(column) {
                *slot = 10.0 * power.max(POWER_FLOOR).log10();
            }
        }
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Column holding the DC bin after the shift
    pub fn dc_column(&self) -> usize {
        self.fft_size / 2
    }
}
