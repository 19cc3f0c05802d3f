//! utils — conversion helpers for the Python bindings.
//!
//! Every helper here turns loosely typed Python input (numpy arrays, pandas
//! objects, plain sequences) into the validated Rust types used by the
//! `cpd` module. Failures surface as `TypeError`/`ValueError` at the PyO3
//! boundary; nothing in this module panics.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
use crate::cpd::core::{
    node_type::NodeType,
    observations::SoftmaxObservations,
    options::{DEFAULT_MAX_ITER, FitOptions, OptimizerKind},
};

/// Accept a contiguous 1-D float64 array, anything with `.to_numpy()`, or a
/// plain sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D float input into an owned vector.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(py: Python<'py>, raw_data: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err("expected a 1-D contiguous float64 array or sequence")
    })?;
    Ok(slice.to_vec())
}

/// Observation-major parent values: a 2-D float64 array (or DataFrame) of
/// shape `(n_obs, n_parents)`, or a list of rows.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw_data: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 2-D numpy.ndarray, pandas.DataFrame, or list of rows")
    })?;
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let nrows = if ncols == 0 { 0 } else { flat.len() / ncols };
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|err| PyValueError::new_err(err.to_string()))
}

/// Build an observation batch from parent values and integer child labels.
#[cfg(feature = "python-bindings")]
pub fn extract_observations<'py>(
    values: &Bound<'py, PyAny>, labels: &Bound<'py, PyAny>,
) -> PyResult<SoftmaxObservations> {
    let values = extract_f64_matrix(values)?;
    let labels: Vec<usize> = labels.extract().map_err(|_| {
        PyTypeError::new_err("labels must be a sequence of non-negative integers")
    })?;
    Ok(SoftmaxObservations::new(values, Array1::from(labels))?)
}

/// Node types for `parent_count` scalar continuous parents and a discrete
/// child with `child_states` states.
#[cfg(feature = "python-bindings")]
pub fn build_node_types(parent_count: usize, child_states: usize) -> Vec<NodeType> {
    let mut node_types = vec![NodeType::continuous(); parent_count];
    node_types.push(NodeType::discrete(child_states));
    node_types
}

/// Parse an optimizer given either as a name or as a framework integer code.
#[cfg(feature = "python-bindings")]
pub fn extract_optimizer_kind<'py>(raw: Option<&Bound<'py, PyAny>>) -> PyResult<OptimizerKind> {
    let Some(raw) = raw else {
        return Ok(OptimizerKind::default());
    };
    if let Ok(code) = raw.extract::<i64>() {
        return Ok(OptimizerKind::from_code(code));
    }
    let name: String = raw
        .extract()
        .map_err(|_| PyTypeError::new_err("optimizer must be a string name or an integer code"))?;
    Ok(name.parse::<OptimizerKind>()?)
}

/// Validated fit options with the usual defaults for omitted values.
#[cfg(feature = "python-bindings")]
pub fn extract_fit_options(
    accuracy: Option<f64>, initial_step: Option<f64>, max_iter: Option<usize>,
    lbfgs_mem: Option<usize>,
) -> PyResult<FitOptions> {
    let defaults = FitOptions::default();
    let options = FitOptions::new(
        accuracy.unwrap_or(defaults.accuracy),
        initial_step.unwrap_or(defaults.initial_step),
        max_iter.unwrap_or(DEFAULT_MAX_ITER),
        lbfgs_mem,
    )?;
    Ok(options)
}
