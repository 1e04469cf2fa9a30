//! PyO3 bindings for Python integration

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::SinkError;

mod enum_bindings;
mod sink_bindings;

impl From<SinkError> for PyErr {
    fn from(e: SinkError) -> Self {
        PyValueError::new_err(e.to_string())
    }
}

/// Python module definition
#[pymodule]
fn freq_sink(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<sink_bindings::PyFreqSink>()?;

    // Enums
    m.add_class::<enum_bindings::PyWindowType>()?;
    m.add_class::<enum_bindings::PyTriggerMode>()?;

    Ok(())
}
