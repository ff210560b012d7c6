//! Shape validation for state-space parameters, signals, and transforms.
//!
//! Purpose
//! -------
//! Centralize the dimension checks that must pass before any prediction is
//! computed. The model layer runs them for a whole batch up front; `kalman`
//! and `reconstruct` run them again on entry.
//!
//! Key behaviors
//! -------------
//! - [`validate_shape`] compares one matrix against an expected `(rows, cols)`.
//! - [`infer_input_dim`] derives nu from the optional input matrices and
//!   checks they agree.
//! - [`validate_transform_width`] checks a transform against a channel count.
//! - [`validate_initial_state`] checks an initial state against nx.
//! - [`validate_trial_dims`] checks a trial's observation / input widths
//!   against the model dimensions.
//!
//! Conventions
//! -----------
//! - All failures are `SSMError::DimensionMismatch` (or
//!   `SSMError::InitialStateLength`) carrying the expected and actual shapes.
//! - Validation never allocates beyond error construction.
use crate::statespace::{
    core::{data::Trial, params::SSMDims, transforms::SignalTransform},
    errors::{SSMError, SSMResult},
};
use ndarray::{Array1, Array2};

/// Check that `matrix` has shape `expected`.
pub fn validate_shape(
    what: &'static str, matrix: &Array2<f64>, expected: (usize, usize),
) -> SSMResult<()> {
    if matrix.dim() != expected {
        return Err(SSMError::DimensionMismatch { what, expected, actual: matrix.dim() });
    }
    Ok(())
}

/// Infer the input dimension nu from whichever of `B`, `Dy`, `Dz` are present.
///
/// Returns
/// -------
/// `SSMResult<Option<usize>>`
///   - `Ok(None)` if none of the matrices is present.
///   - `Ok(Some(nu))` if all present matrices share the column count `nu`.
///
/// Errors
/// ------
/// - `SSMError::DimensionMismatch` naming the first matrix whose column count
///   disagrees with the earlier ones (priority `B`, `Dy`, `Dz`).
pub fn infer_input_dim(
    b: Option<&Array2<f64>>, dy: Option<&Array2<f64>>, dz: Option<&Array2<f64>>,
) -> SSMResult<Option<usize>> {
    let mut nu: Option<usize> = None;
    for (what, matrix) in [("B", b), ("Dy", dy), ("Dz", dz)] {
        let Some(m) = matrix else {
            continue;
        };
        match nu {
            None => nu = Some(m.ncols()),
            Some(n) if n != m.ncols() => {
                return Err(SSMError::DimensionMismatch {
                    what,
                    expected: (m.nrows(), n),
                    actual: m.dim(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(nu)
}

/// Check that a transform, if it has a fixed width, expects `n` channels.
pub fn validate_transform_width<T: SignalTransform>(
    what: &'static str, transform: Option<&T>, n: usize,
) -> SSMResult<()> {
    match transform.and_then(|t| t.n_channels()) {
        Some(width) if width != n => {
            Err(SSMError::DimensionMismatch { what, expected: (1, n), actual: (1, width) })
        }
        _ => Ok(()),
    }
}

/// Check that an initial state, if supplied, has length `nx`.
pub fn validate_initial_state(initial_state: Option<&Array1<f64>>, nx: usize) -> SSMResult<()> {
    match initial_state {
        Some(x0) if x0.len() != nx => {
            Err(SSMError::InitialStateLength { expected: nx, actual: x0.len() })
        }
        _ => Ok(()),
    }
}

/// Check a trial's channel counts against the model dimensions.
///
/// Errors
/// ------
/// - `SSMError::DimensionMismatch` naming "observation" if `y` does not have
///   ny columns, or "input" if `u` does not have T rows or nu columns (when
///   nu is known).
pub fn validate_trial_dims(dims: &SSMDims, trial: &Trial) -> SSMResult<()> {
    let t = trial.len();
    if trial.y.ncols() != dims.ny {
        return Err(SSMError::DimensionMismatch {
            what: "observation",
            expected: (t, dims.ny),
            actual: trial.y.dim(),
        });
    }
    if let Some(u) = trial.u.as_ref() {
        let nu = dims.nu.unwrap_or(u.ncols());
        if u.dim() != (t, nu) {
            return Err(SSMError::DimensionMismatch {
                what: "input",
                expected: (t, nu),
                actual: u.dim(),
            });
        }
    }
    Ok(())
}
