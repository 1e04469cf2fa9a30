//! Python bindings for the frequency sink

use std::collections::HashMap;

use numpy::{PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;

use super::enum_bindings::{PyTriggerMode, PyWindowType, WindowArg};
use crate::sink::{make_config, FreqSink, Pdu, SpectralSink, StreamTag};

/// Frequency sink exposed to Python
///
/// The plotting client calls `get_plot_data` at its own pace; each call
/// returns the oldest frame as a (rows, fft_size) array and removes it.
#[pyclass(name = "FreqSink")]
pub struct PyFreqSink {
    sink: FreqSink,
}

#[pymethods]
impl PyFreqSink {
    /// Create a new frequency sink
    ///
    /// Args:
    ///     fft_size: FFT size; packets must be a multiple of it
    ///     window_type: Window applied before each FFT
    ///     center_frequency: Center of the x-axis in Hz
    ///     bandwidth: Span of the x-axis in Hz
    ///     name: Plot title
    ///     nconnections: Number of streaming inputs (0 for packets only)
    #[new]
    #[pyo3(signature = (fft_size=1024, window_type=PyWindowType::Hamming, center_frequency=0.0, bandwidth=1.0, name="", nconnections=1))]
    fn new(
        fft_size: i64,
        window_type: PyWindowType,
        center_frequency: f64,
        bandwidth: f64,
        name: &str,
        nconnections: i64,
    ) -> PyResult<Self> {
        let config = make_config(
            fft_size,
            window_type.into(),
            center_frequency,
            bandwidth,
            name,
            nconnections,
        )?;

        Ok(Self {
            sink: FreqSink::new(config)?,
        })
    }

    /// Pop the oldest frame
    ///
    /// Returns:
    ///     Tuple (data, triggered): data is a 2D float32 array of shape
    ///     (nconnections + 1, fft_size), or shape (0, 0) when no frame is
    ///     ready; triggered is True when the trigger condition was met
    fn get_plot_data<'py>(&self, py: Python<'py>) -> (&'py PyArray2<f32>, bool) {
        let (data, triggered) = self.sink.get_plot_data().into_parts();
        (PyArray2::from_owned_array(py, data), triggered)
    }

    /// Feed one block of samples per input
    ///
    /// Args:
    ///     inputs: One float32 array per input, all the same length
    ///     tags: Optional (absolute_offset, key) stream tags
    ///
    /// Returns:
    ///     Number of samples consumed per input
    #[pyo3(signature = (inputs, tags=Vec::new()))]
    fn work(
        &mut self,
        inputs: Vec<PyReadonlyArray1<f32>>,
        tags: Vec<(u64, String)>,
    ) -> PyResult<usize> {
        let owned: Vec<Vec<f32>> = inputs.iter().map(|a| a.as_array().to_vec()).collect();
        let slices: Vec<&[f32]> = owned.iter().map(Vec::as_slice).collect();
        let tags: Vec<StreamTag> = tags
            .into_iter()
            .map(|(offset, key)| StreamTag::new(offset, key))
            .collect();

        Ok(self.sink.work(&slices, &tags)?)
    }

    /// Feed a packet; its length must be a multiple of fft_size
    ///
    /// Returns:
    ///     Number of fft_size segments processed
    #[pyo3(signature = (samples, metadata=None))]
    fn handle_pdu(
        &mut self,
        samples: PyReadonlyArray1<f32>,
        metadata: Option<HashMap<String, String>>,
    ) -> PyResult<usize> {
        let data = samples.as_array().to_vec();
        let pdu = match metadata {
            Some(metadata) => Pdu::Labeled { metadata, data },
            None => Pdu::Vector(data),
        };
        Ok(self.sink.handle_pdu(&pdu)?)
    }

    /// Recenter the frequency axis
    fn handle_set_freq(&mut self, center: f64) -> PyResult<()> {
        Ok(self.sink.handle_set_freq(center)?)
    }

    /// Clear queued frames and averaging history
    fn reset(&mut self) {
        self.sink.reset();
    }

    /// Set the averaging factor in [0, 1]
    fn set_fft_avg(&mut self, average: f32) -> PyResult<()> {
        Ok(self.sink.set_fft_avg(average)?)
    }

    /// Change the FFT size
    ///
    /// Returns:
    ///     False if the size was rejected
    fn fftresize(&mut self, size: i64) -> bool {
        self.sink.fftresize(size).is_ok()
    }

    /// Change the window type
    ///
    /// Args:
    ///     window_type: WindowType member or integer window code
    ///
    /// Returns:
    ///     False if the window was rejected
    fn set_fft_window(&mut self, window_type: WindowArg) -> bool {
        match window_type {
            WindowArg::Kind(kind) => self.sink.set_fft_window(kind.into()).is_ok(),
            WindowArg::Code(code) => self.sink.set_fft_window_code(code).is_ok(),
        }
    }

    fn set_frequency_range(&mut self, center: f64, bandwidth: f64) -> PyResult<()> {
        Ok(self.sink.set_frequency_range(center, bandwidth)?)
    }

    /// Configure the trigger
    ///
    /// Args:
    ///     mode: Free, Auto, Normal or Tag
    ///     level: Level in dB for Auto/Normal
    ///     channel: Input inspected in Auto/Normal
    ///     tag_key: Tag name for Tag mode
    #[pyo3(signature = (mode, level=0.0, channel=0, tag_key=""))]
    fn set_trigger_mode(
        &mut self,
        mode: PyTriggerMode,
        level: f32,
        channel: usize,
        tag_key: &str,
    ) -> PyResult<()> {
        Ok(self.sink.set_trigger_mode(mode.into(), level, channel, tag_key)?)
    }

    /// Get frequency of every column in Hz
    fn frequency_axis<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, self.sink.frequency_axis())
    }

    fn get_center_freq(&self) -> f64 {
        self.sink.get_center_freq()
    }

    fn get_bandwidth(&self) -> f64 {
        self.sink.get_bandwidth()
    }

    fn get_fft_size(&self) -> usize {
        self.sink.get_fft_size()
    }

    fn get_fft_avg(&self) -> f32 {
        self.sink.get_fft_avg()
    }

    fn get_wintype(&self) -> PyWindowType {
        self.sink.get_wintype().into()
    }

    fn get_name(&self) -> String {
        self.sink.get_name().to_string()
    }

    fn get_nconnections(&self) -> usize {
        self.sink.get_nconnections()
    }

    /// Frames waiting to be read
    fn pending(&self) -> usize {
        self.sink.reader().pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkConfig;
    use crate::spectrum::WindowType;

    fn py_sink() -> PyFreqSink {
        PyFreqSink {
            sink: FreqSink::new(SinkConfig::default()).unwrap(),
        }
    }

    #[test]
    fn test_set_fft_window_accepts_codes() {
        let mut sink = py_sink();

        assert!(sink.set_fft_window(WindowArg::Code(2)));
        assert_eq!(sink.sink.get_wintype(), WindowType::Blackman);

        assert!(!sink.set_fft_window(WindowArg::Code(42)));
        assert_eq!(sink.sink.get_wintype(), WindowType::Blackman);

        assert!(sink.set_fft_window(WindowArg::Kind(PyWindowType::Kaiser)));
        assert_eq!(sink.sink.get_wintype(), WindowType::Kaiser);
    }

    #[test]
    fn test_fftresize_reports_rejection() {
        let mut sink = py_sink();
        assert!(!sink.fftresize(0));
        assert!(sink.fftresize(2048));
        assert_eq!(sink.get_fft_size(), 2048);
    }
}
