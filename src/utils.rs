//! Python-side input conversion for the PyO3 bindings.
//!
//! Turns loosely-typed Python objects (NumPy arrays, pandas frames, nested
//! sequences, dicts, tuples) into the typed inputs of the prediction stack.
//! Every helper reports bad input as a `PyErr`; nothing here panics.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2, Axis};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict, PyList, PyTuple},
};

#[cfg(feature = "python-bindings")]
use crate::statespace::core::{
    options::{PredictOptions, RECOGNIZED_OPTIONS},
    record::{ModelRecord, U_PREP_ALIASES, Y_PREP_ALIASES, Z_PREP_ALIASES},
    transforms::Preprocessor,
};

/// Extract a time-by-channel `f64` matrix.
///
/// Accepts a 2-D `numpy.ndarray`, a 1-D array (read as a single channel),
/// anything with a `to_numpy()` method returning one of those (pandas), or a
/// sequence of equal-length rows.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw: &Bound<'py, PyAny>, name: &str) -> PyResult<Array2<f64>> {
    if let Some(matrix) = numpy_matrix(raw) {
        return Ok(matrix);
    }
    if let Ok(obj) = raw.call_method0("to_numpy") {
        if let Some(matrix) = numpy_matrix(&obj) {
            return Ok(matrix);
        }
    }

    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        PyTypeError::new_err(format!(
            "{name} must be a 2-D numpy.ndarray, pandas.DataFrame, or sequence of float64 rows"
        ))
    })?;
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(PyValueError::new_err(format!("{name} has rows of unequal length")));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PyValueError::new_err(format!("{name}: {e}")))
}

/// Extract a 1-D `f64` vector from an array, a sequence, or a scalar
/// (read as a length-1 vector).
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vector<'py>(raw: &Bound<'py, PyAny>, name: &str) -> PyResult<Array1<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(value) = raw.extract::<f64>() {
        return Ok(Array1::from_elem(1, value));
    }
    let values: Vec<f64> = raw.extract().map_err(|_| {
        PyTypeError::new_err(format!(
            "{name} must be a float, a 1-D numpy.ndarray, or a sequence of float64"
        ))
    })?;
    Ok(Array1::from(values))
}

/// Extract one trial or a list of trials.
///
/// Returns the matrices together with `true` when the caller passed a list or
/// tuple, so results can be returned in the same shape. A single trial must
/// be array-like (not a bare list of rows), which keeps the two forms apart.
#[cfg(feature = "python-bindings")]
pub fn extract_trials<'py>(
    raw: &Bound<'py, PyAny>, name: &str,
) -> PyResult<(Vec<Array2<f64>>, bool)> {
    if let Ok(list) = raw.downcast::<PyList>() {
        let trials = list
            .iter()
            .enumerate()
            .map(|(k, item)| extract_f64_matrix(&item, &format!("{name}[{k}]")))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok((trials, true));
    }
    if let Ok(tuple) = raw.downcast::<PyTuple>() {
        let trials = tuple
            .iter()
            .enumerate()
            .map(|(k, item)| extract_f64_matrix(&item, &format!("{name}[{k}]")))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok((trials, true));
    }
    Ok((vec![extract_f64_matrix(raw, name)?], false))
}

/// Build a preprocessor from a `(mean, std)` tuple or a bare mean.
///
/// A `tuple` is always read as `(mean, std)`; `std` may be `None` for mean
/// removal, and either part may be a float for a single channel, so
/// `(1.0, 2.0)` is a one-channel z-score. A multi-channel bare mean must be a
/// `list` or `numpy.ndarray`.
#[cfg(feature = "python-bindings")]
pub fn extract_preprocessor<'py>(raw: &Bound<'py, PyAny>, name: &str) -> PyResult<Preprocessor> {
    let Ok(tuple) = raw.downcast::<PyTuple>() else {
        return Ok(Preprocessor::from_moments(extract_f64_vector(raw, name)?, None)?);
    };
    if tuple.len() != 2 {
        return Err(PyValueError::new_err(format!(
            "{name} tuple must be (mean, std), got {} items; pass a bare mean as a list",
            tuple.len()
        )));
    }
    let mean = extract_f64_vector(&tuple.get_item(0)?, name)?;
    let std = tuple.get_item(1)?;
    let std = if std.is_none() { None } else { Some(extract_f64_vector(&std, name)?) };
    Ok(Preprocessor::from_moments(mean, std)?)
}

/// Build a [`ModelRecord`] from a dict of named matrices and transforms.
///
/// Keys listed in the transform alias tables are read with
/// [`extract_preprocessor`]; every other key is read as a matrix. `None`
/// values are skipped, which makes them absent.
#[cfg(feature = "python-bindings")]
pub fn extract_model_record<'py>(fields: &Bound<'py, PyDict>) -> PyResult<ModelRecord> {
    let mut record = ModelRecord::new();
    for (key, value) in fields.iter() {
        let name: String = key
            .extract()
            .map_err(|_| PyTypeError::new_err("model parameter names must be strings"))?;
        if value.is_none() {
            continue;
        }
        let is_transform = [Y_PREP_ALIASES, Z_PREP_ALIASES, U_PREP_ALIASES]
            .iter()
            .any(|aliases| aliases.contains(&name.as_str()));
        if is_transform {
            let prep = extract_preprocessor(&value, &name)?;
            record.insert_transform(name, prep);
        } else {
            let matrix = extract_matrix_parameter(&value, &name)?;
            record.insert_matrix(name, matrix);
        }
    }
    Ok(record)
}

/// Build [`PredictOptions`] from keyword arguments.
///
/// Unknown names are rejected so that typos do not silently fall back to the
/// defaults.
#[cfg(feature = "python-bindings")]
pub fn extract_predict_options<'py>(
    kwargs: Option<&Bound<'py, PyDict>>,
) -> PyResult<PredictOptions> {
    let mut options = PredictOptions::default();
    let Some(kwargs) = kwargs else {
        return Ok(options);
    };
    for (key, value) in kwargs.iter() {
        let name: String = key.extract()?;
        if !RECOGNIZED_OPTIONS.contains(&name.as_str()) {
            return Err(PyValueError::new_err(format!(
                "unknown option {name:?} (expected one of {RECOGNIZED_OPTIONS:?})"
            )));
        }
        if name == "initial_state" && !value.is_none() {
            options.initial_state = Some(extract_f64_vector(&value, "initial_state")?);
        }
    }
    Ok(options)
}

// ---- Helper Methods ----

#[cfg(feature = "python-bindings")]
fn numpy_matrix(raw: &Bound<'_, PyAny>) -> Option<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Some(arr.as_array().to_owned());
    }
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Some(arr.as_array().to_owned().insert_axis(Axis(1)));
    }
    None
}

/// Matrices may also be given as Python scalars (1×1).
#[cfg(feature = "python-bindings")]
fn extract_matrix_parameter<'py>(raw: &Bound<'py, PyAny>, name: &str) -> PyResult<Array2<f64>> {
    if let Ok(value) = raw.extract::<f64>() {
        return Ok(Array2::from_elem((1, 1), value));
    }
    extract_f64_matrix(raw, name)
}
