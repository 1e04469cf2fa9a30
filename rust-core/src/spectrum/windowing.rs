//! Precomputed window table applied to every FFT block
//!
//! The coefficients are rebuilt as a whole whenever the FFT size or the window
//! type changes, and are shared behind an `Arc` so a rebuild always produces a
//! new allocation.

use std::sync::Arc;

use super::windows::{generate_window, WindowType};

/// Window coefficients for one (FFT size, window type) pair
#[derive(Debug, Clone)]
pub struct WindowTable {
    window_type: WindowType,
    coefficients: Arc<[f32]>,
    /// Sum of the coefficients, the coherent gain of the window
    sum: f64,
}

impl WindowTable {
    /// Build the table for `length` samples
    pub fn new(window_type: WindowType, length: usize) -> Self {
        let window = generate_window(window_type, length);
        let sum = window.iter().sum();
        let coefficients: Arc<[f32]> = window.iter().map(|&w| w as f32).collect();

        Self {
            window_type,
            coefficients,
            sum,
        }
    }

    /// Rebuild for new parameters
    pub fn rebuild(&mut self, window_type: WindowType, length: usize) {
        *self = Self::new(window_type, length);
    }

    /// Multiply `input` by the window into `output`
    pub fn apply(&self, input: &[f32], output: &mut [f32]) {
        for ((o, &s), &w) in output.iter_mut().zip(input).zip(self.coefficients.iter()) {
            *o = s * w;
        }
    }

    pub fn coefficients(&self) -> &Arc<[f32]> {
        &self.coefficients
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Scale factor that maps |X[k]| of a windowed constant back to its amplitude
    ///
    /// Multiply FFT magnitudes by this to undo the window's coherent gain.
    pub fn amplitude_correction(&self) -> f64 {
        if self.sum > 0.0 {
            1.0 / self.sum
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_length_matches_fft_size() {
        for size in [1, 2, 7, 64, 1000] {
            let table = WindowTable::new(WindowType::Hann, size);
            assert_eq!(table.len(), size);
        }
    }

    #[test]
    fn test_rebuild_changes_identity() {
        let mut table = WindowTable::new(WindowType::Hamming, 128);
        let before = Arc::clone(table.coefficients());

        table.rebuild(WindowType::Hann, 128);
        assert!(!Arc::ptr_eq(&before, table.coefficients()));
        assert_eq!(table.window_type(), WindowType::Hann);

        let before = Arc::clone(table.coefficients());
        table.rebuild(WindowType::Hann, 256);
        assert!(!Arc::ptr_eq(&before, table.coefficients()));
        assert_eq!(table.len(), 256);
    }

    #[test]
    fn test_resize_round_trip_restores_coefficients() {
        let mut table = WindowTable::new(WindowType::Blackman, 512);
        let original: Vec<f32> = table.coefficients().to_vec();

        table.rebuild(WindowType::Blackman, 1024);
        table.rebuild(WindowType::Blackman, 512);

        for (a, b) in original.iter().zip(table.coefficients().iter()) {
            assert!((a - b).abs() < 1e-7);
        }
    }

    #[test]
    fn test_apply_window() {
        let table = WindowTable::new(WindowType::Hamming, 101);
        let signal = vec![1.0f32; 101];
        let mut windowed = vec![0.0f32; 101];
        table.apply(&signal, &mut windowed);

        // Center should be close to 1.0, edges ~0.08
        assert!((windowed[50] - 1.0).abs() < 0.01);
        assert!(windowed[0] < 0.1);
        assert!(windowed[100] < 0.1);
    }

    #[test]
    fn test_correction_factor() {
        let rect = WindowTable::new(WindowType::Rectangular, 100);
        assert!((rect.amplitude_correction() - 0.01).abs() < 1e-12);

        // Hamming keeps roughly half the energy of a constant
        let hamming = WindowTable::new(WindowType::Hamming, 100);
        let factor = hamming.amplitude_correction() * 100.0;
        assert!(factor > 1.5 && factor < 2.5);
    }
}
