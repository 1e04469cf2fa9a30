//! Python enums for window and trigger selection

use pyo3::prelude::*;

use crate::sink::TriggerMode;
use crate::spectrum::WindowType;

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone, Copy)]
pub enum PyWindowType {
    Hamming,
    Hann,
    Blackman,
    Rectangular,
    Kaiser,
    BlackmanHarris,
    Bartlett,
    FlatTop,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
            PyWindowType::Kaiser => WindowType::Kaiser,
            PyWindowType::BlackmanHarris => WindowType::BlackmanHarris,
            PyWindowType::Bartlett => WindowType::Bartlett,
            PyWindowType::FlatTop => WindowType::FlatTop,
        }
    }
}

impl From<WindowType> for PyWindowType {
    fn from(win: WindowType) -> Self {
        match win {
            WindowType::Hamming => PyWindowType::Hamming,
            WindowType::Hann => PyWindowType::Hann,
            WindowType::Blackman => PyWindowType::Blackman,
            WindowType::Rectangular => PyWindowType::Rectangular,
            WindowType::Kaiser => PyWindowType::Kaiser,
            WindowType::BlackmanHarris => PyWindowType::BlackmanHarris,
            WindowType::Bartlett => PyWindowType::Bartlett,
            WindowType::FlatTop => PyWindowType::FlatTop,
        }
    }
}

/// Window selection accepted from Python: an enum member or a plain code
#[derive(FromPyObject)]
pub enum WindowArg {
    Kind(PyWindowType),
    Code(i32),
}

/// Trigger mode enum exposed to Python
#[pyclass(name = "TriggerMode")]
#[derive(Clone, Copy)]
pub enum PyTriggerMode {
    Free,
    Auto,
    Normal,
    Tag,
}

impl From<PyTriggerMode> for TriggerMode {
    fn from(mode: PyTriggerMode) -> Self {
        match mode {
            PyTriggerMode::Free => TriggerMode::Free,
            PyTriggerMode::Auto => TriggerMode::Auto,
            PyTriggerMode::Normal => TriggerMode::Normal,
            PyTriggerMode::Tag => TriggerMode::Tag,
        }
    }
}
