//! rust_statespace — causal prediction for identified state-space models, with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! state-space prediction to Python via the `_rust_statespace` extension
//! module. When the `python-bindings` feature is enabled, this module defines
//! the Python-facing class and submodule used by the `rust_statespace`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust module (`statespace`) as the public crate surface.
//! - Define the `StateSpacePredictor` `#[pyclass]` and the `#[pymodule]`
//!   initializer for the `_rust_statespace` Python extension.
//! - Create and register the `prediction` submodule under `rust_statespace`
//!   so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in `statespace`; this file performs
//!   only FFI glue, input conversion, and error mapping.
//! - A `StateSpacePredictor` always wraps a fully validated `SSMModel`.
//!
//! Conventions
//! -----------
//! - Arrays are time-by-channel on both sides of the boundary.
//! - `SSMError` values are converted to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on `statespace` directly and can ignore
//!   the PyO3 items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_rust_statespace` and wraps its class
//!   in user-facing Python APIs.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in `statespace` and by
//!   the integration tests under `tests/`.

pub mod statespace;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use numpy::IntoPyArray;

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict, PyList},
};

#[cfg(feature = "python-bindings")]
use crate::{
    statespace::models::ssm::{SSMModel, predict},
    utils::{extract_model_record, extract_predict_options, extract_trials},
};

/// StateSpacePredictor — Python-facing wrapper around [`SSMModel`].
///
/// Purpose
/// -------
/// Build a state-space model once from a dict of named parameters and run
/// causal prediction on one or many trials from Python.
///
/// Parameters
/// ----------
/// Constructed from Python via `StateSpacePredictor(params)`:
/// - `params`: `dict`
///   Matrices under any accepted alias (`A`/`a`, `K`/`k`, `Cy`/`C`/`c`,
///   `Cz`/`cz`, legacy `T`, `B`/`b`, `Dy`/`D`/`d`, `Dz`/`dz`) and optional
///   transforms under `YPrepModel`, `ZPrepModel`, `UPrepModel` (or their
///   snake-case forms) given as `(mean, std)`, `(mean, None)`, or `mean`.
///
/// Fields
/// ------
/// - `inner`: [`SSMModel`]
///   Validated model shared by every prediction call.
///
/// Notes
/// -----
/// - Native Rust callers should use [`SSMModel`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_statespace.prediction")]
pub struct StateSpacePredictor {
    inner: SSMModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl StateSpacePredictor {
    #[new]
    #[pyo3(signature = (params), text_signature = "(params, /)")]
    pub fn new<'py>(params: &Bound<'py, PyDict>) -> PyResult<Self> {
        let record = extract_model_record(params)?;
        let inner = SSMModel::from_record(&record)?;
        Ok(StateSpacePredictor { inner })
    }

    /// Predict behavior, observations, and latent states.
    ///
    /// `y` (and `u`, if given) is either one 2-D array or a list of them; the
    /// result `(z_pred, y_pred, x_pred)` has the same shape. `z_pred` entries
    /// are `None` when the model has no behavior readout. Keyword options:
    /// `initial_state`.
    #[pyo3(
        signature = (y, u = None, **options),
        text_signature = "(self, y, /, u=None, *, initial_state=None)"
    )]
    pub fn predict<'py>(
        &self, py: Python<'py>, y: &Bound<'py, PyAny>, u: Option<&Bound<'py, PyAny>>,
        options: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<(PyObject, PyObject, PyObject)> {
        let (ys, is_list) = extract_trials(y, "y")?;
        let us = match u.filter(|u| !u.is_none()) {
            Some(u) => Some(extract_trials(u, "u")?.0),
            None => None,
        };
        let options = extract_predict_options(options)?;

        let predictions = predict(&self.inner, &ys, us.as_deref(), &options)?;
        let (zs, ys, xs) = predictions.into_parts();

        let zs: Vec<PyObject> = zs
            .into_iter()
            .map(|z| match z {
                Some(z) => z.into_pyarray(py).into_any().unbind(),
                None => py.None(),
            })
            .collect();
        let ys: Vec<PyObject> = ys.into_iter().map(|m| matrix_to_py(py, m)).collect();
        let xs: Vec<PyObject> = xs.into_iter().map(|m| matrix_to_py(py, m)).collect();

        if is_list {
            Ok((list_to_py(py, zs)?, list_to_py(py, ys)?, list_to_py(py, xs)?))
        } else {
            Ok((first_or_none(py, zs), first_or_none(py, ys), first_or_none(py, xs)))
        }
    }

    /// Latent state dimension.
    #[getter]
    pub fn nx(&self) -> usize {
        self.inner.dims().nx
    }

    /// Primary observation channels.
    #[getter]
    pub fn ny(&self) -> usize {
        self.inner.dims().ny
    }

    /// Behavior channels, or `None` without a behavior readout.
    #[getter]
    pub fn nz(&self) -> Option<usize> {
        self.inner.dims().nz
    }

    /// Input channels, or `None` when no input matrix is present.
    #[getter]
    pub fn nu(&self) -> Option<usize> {
        self.inner.dims().nu
    }
}

#[cfg(feature = "python-bindings")]
fn matrix_to_py(py: Python<'_>, matrix: Array2<f64>) -> PyObject {
    matrix.into_pyarray(py).into_any().unbind()
}

#[cfg(feature = "python-bindings")]
fn list_to_py(py: Python<'_>, items: Vec<PyObject>) -> PyResult<PyObject> {
    Ok(PyList::new(py, items)?.into_any().unbind())
}

#[cfg(feature = "python-bindings")]
fn first_or_none(py: Python<'_>, items: Vec<PyObject>) -> PyObject {
    items.into_iter().next().unwrap_or_else(|| py.None())
}

/// _rust_statespace — PyO3 module initializer for the Rust extension.
///
/// Creates the `prediction` submodule, attaches it to the root module, and
/// registers it in `sys.modules` as `rust_statespace.prediction` so that
/// `import rust_statespace.prediction` works.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_statespace<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let prediction_mod = PyModule::new(_py, "prediction")?;
    prediction(_py, m, &prediction_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_statespace.prediction", prediction_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn prediction<'py>(
    _py: Python, rust_statespace: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<StateSpacePredictor>()?;
    rust_statespace.add_submodule(m)?;
    Ok(())
}
