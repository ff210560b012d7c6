//! Output reconstruction — map predicted states back to signal space.
//!
//! Purpose
//! -------
//! Turn the predicted-state sequence of one trial into predicted primary
//! observations and (when the model has a behavior readout) predicted
//! behavior, expressed in the original units of each signal.
//!
//! Key behaviors
//! -------------
//! - `y_pred = x_pred · Cyᵀ` and `z_pred = x_pred · Czᵀ`.
//! - With an input, the **time-aligned** transformed input `u_t` adds the
//!   feedthrough terms `u_t · Dyᵀ` and `u_t · Dzᵀ`. The recursion in `kalman`
//!   consumes the lagged input instead.
//! - The observation / behavior transforms are inverted last.
//! - The NaN row 0 of `x_pred` propagates into row 0 of every output.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters, trial widths, and the `x_pred` shape (T×nx) are checked on
//!   entry; a mismatch is returned as an error before any product.
//! - `z_pred` is `None` exactly when the model has no `Cz`; a lone `Dz`
//!   does not create a behavior prediction.
//!
//! Downstream usage
//! ----------------
//! - [`Prediction`] is the per-trial result returned by `SSMModel` and
//!   collected into `PredictionSet` by the batch dispatcher.
use crate::statespace::{
    core::{
        data::Trial,
        params::SSMParams,
        transforms::{ModelTransforms, SignalTransform, apply_inverse_opt, apply_opt},
        validation::{validate_shape, validate_trial_dims},
    },
    errors::SSMResult,
};
use ndarray::Array2;

/// Prediction — per-trial outputs.
///
/// Fields
/// ------
/// - `z_pred`: `Option<Array2<f64>>` — T×nz predicted behavior, `None`
///   without `Cz`.
/// - `y_pred`: `Array2<f64>` — T×ny predicted primary observation.
/// - `x_pred`: `Array2<f64>` — T×nx predicted latent state (row 0 NaN).
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub z_pred: Option<Array2<f64>>,
    pub y_pred: Array2<f64>,
    pub x_pred: Array2<f64>,
}

impl Prediction {
    /// Number of time steps T.
    pub fn len(&self) -> usize {
        self.x_pred.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reconstruct predicted outputs from a predicted-state sequence.
///
/// Parameters
/// ----------
/// - `params`: validated canonical matrices.
/// - `transforms`: `u` is applied forward; `y` and `z` are inverted.
/// - `trial`: the trial `x_pred` was computed from (only its input is read).
/// - `x_pred`: T×nx predicted states; moved into the result unchanged.
///
/// Errors
/// ------
/// - Any shape error of [`SSMParams::validate`].
/// - `SSMError::DimensionMismatch` if the trial does not fit the parameters,
///   or if `x_pred` is not T×nx ("predicted state").
/// - Errors raised by the transforms.
pub fn reconstruct_outputs<T: SignalTransform>(
    params: &SSMParams, transforms: &ModelTransforms<T>, trial: &Trial, x_pred: Array2<f64>,
) -> SSMResult<Prediction> {
    let dims = params.validate()?;
    validate_trial_dims(&dims, trial)?;
    validate_shape("predicted state", &x_pred, (trial.len(), dims.nx))?;

    let mut y_pred = x_pred.dot(&params.cy.t());
    let mut z_pred = params.cz.as_ref().map(|cz| x_pred.dot(&cz.t()));

    if let Some(u) = trial.u.as_ref() {
        let u_t = apply_opt(transforms.u.as_ref(), u.view(), true)?;
        if let Some(dy) = params.dy.as_ref() {
            y_pred += &u_t.dot(&dy.t());
        }
        if let (Some(dz), Some(z)) = (params.dz.as_ref(), z_pred.as_mut()) {
            *z += &u_t.dot(&dz.t());
        }
    }

    let y_pred = apply_inverse_opt(transforms.y.as_ref(), y_pred.view(), true)?;
    let z_pred = match z_pred {
        Some(z) => Some(apply_inverse_opt(transforms.z.as_ref(), z.view(), true)?),
        None => None,
    };

    Ok(Prediction { z_pred, y_pred, x_pred })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statespace::{core::transforms::Preprocessor, errors::SSMError};
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Readout products and the absent-`Cz` case.
    // - Time-aligned feedthrough of the transformed input.
    // - Inversion of the observation / behavior transforms.
    // - NaN propagation from the undefined first state.
    // - Shape errors returned instead of panicking.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the readouts without input or transforms.
    //
    // Given
    // -----
    // - nx = 2, ny = 1, nz = 1; x_pred = [[NaN, NaN], [1, 2], [0.5, -1]].
    //
    // Expect
    // ------
    // - y_pred = x·Cyᵀ, z_pred = x·Czᵀ, row 0 NaN in both.
    fn readouts_without_input() {
        let params = SSMParams::new(
            Array2::eye(2),
            Array2::zeros((2, 1)),
            array![[1.0, 0.5]],
            Some(array![[2.0, -1.0]]),
            None,
            None,
            None,
        )
        .unwrap();
        let trial = Trial::new(Array2::zeros((3, 1)), None).unwrap();
        let x_pred = array![[f64::NAN, f64::NAN], [1.0, 2.0], [0.5, -1.0]];

        let transforms = ModelTransforms::<Preprocessor>::default();

        let out = reconstruct_outputs(&params, &transforms, &trial, x_pred).unwrap();

        let z = out.z_pred.as_ref().unwrap();
        assert!(out.y_pred[[0, 0]].is_nan());
        assert!(z[[0, 0]].is_nan());
        assert_relative_eq!(out.y_pred[[1, 0]], 2.0, epsilon = 1e-15);
        assert_relative_eq!(out.y_pred[[2, 0]], 0.0, epsilon = 1e-15);
        assert_relative_eq!(z[[1, 0]], 0.0, epsilon = 1e-15);
        assert_relative_eq!(z[[2, 0]], 2.0, epsilon = 1e-15);
        assert_eq!(out.len(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a model without `Cz` yields no behavior prediction even when `Dz`
    // is present.
    //
    // Given
    // -----
    // - Scalar model with `Dz` but no `Cz`, and an input.
    //
    // Expect
    // ------
    // - `z_pred == None`; `y_pred` still computed.
    fn missing_cz_yields_no_behavior() {
        let params = SSMParams::new(
            array![[0.5]],
            array![[0.2]],
            array![[1.0]],
            None,
            None,
            None,
            Some(array![[3.0]]),
        )
        .unwrap();
        let trial = Trial::new(array![[1.0], [2.0]], Some(array![[1.0], [1.0]])).unwrap();

        let out = reconstruct_outputs(
            &params,
            &ModelTransforms::<Preprocessor>::default(),
            &trial,
            array![[f64::NAN], [0.4]],
        )
        .unwrap();

        assert!(out.z_pred.is_none());
        assert_relative_eq!(out.y_pred[[1, 0]], 0.4, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Verify feedthrough uses the time-aligned transformed input and that the
    // output transforms are inverted afterwards.
    //
    // Given
    // -----
    // - Scalar model, Cy = 1, Cz = 2, Dy = 0.5, Dz = -1.
    // - u transform: mean removal (mean 1); y transform: z-score (mean 10,
    //   std 2); z transform: mean removal (mean -5).
    // - x_pred = [NaN, 1], u = [7, 3].
    //
    // Expect
    // ------
    // - Row 1: ũ = 2; y = (1 + 0.5·2)·2 + 10 = 14; z = (2 − 2) − 5 = −5.
    fn aligned_feedthrough_and_inverse_transforms() {
        let params = SSMParams::new(
            array![[0.5]],
            array![[0.2]],
            array![[1.0]],
            Some(array![[2.0]]),
            None,
            Some(array![[0.5]]),
            Some(array![[-1.0]]),
        )
        .unwrap();
        let transforms = ModelTransforms::new(
            Some(Preprocessor::z_score(array![10.0], array![2.0]).unwrap()),
            Some(Preprocessor::mean_removal(array![-5.0]).unwrap()),
            Some(Preprocessor::mean_removal(array![1.0]).unwrap()),
        );
        let trial = Trial::new(array![[0.0], [0.0]], Some(array![[7.0], [3.0]])).unwrap();

        let out =
            reconstruct_outputs(&params, &transforms, &trial, array![[f64::NAN], [1.0]]).unwrap();

        let z = out.z_pred.unwrap();
        assert!(out.y_pred[[0, 0]].is_nan());
        assert_relative_eq!(out.y_pred[[1, 0]], 14.0, epsilon = 1e-12);
        assert_relative_eq!(z[[1, 0]], -5.0, epsilon = 1e-12);
        assert!(out.x_pred[[0, 0]].is_nan());
        assert_eq!(out.x_pred[[1, 0]], 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure mismatched states, observations, and inputs are reported.
    //
    // Given
    // -----
    // - Scalar model with Dy (nu = 1); a valid 3-step trial and 3×1 states.
    // - States with 2 columns or 2 rows; a trial with a 2-column input.
    //
    // Expect
    // ------
    // - "predicted state" and "input" mismatches.
    fn shape_mismatches_are_errors() {
        let params = SSMParams::new(
            array![[0.5]],
            array![[0.2]],
            array![[1.0]],
            None,
            None,
            Some(array![[0.5]]),
            None,
        )
        .unwrap();
        let transforms = ModelTransforms::<Preprocessor>::default();
        let trial = Trial::new(Array2::zeros((3, 1)), Some(Array2::zeros((3, 1)))).unwrap();
        let wide_u = Trial::new(Array2::zeros((3, 1)), Some(Array2::zeros((3, 2)))).unwrap();

        let err_cols =
            reconstruct_outputs(&params, &transforms, &trial, Array2::zeros((3, 2))).unwrap_err();
        let err_rows =
            reconstruct_outputs(&params, &transforms, &trial, Array2::zeros((2, 1))).unwrap_err();
        let err_u =
            reconstruct_outputs(&params, &transforms, &wide_u, Array2::zeros((3, 1))).unwrap_err();

        assert_eq!(
            err_cols,
            SSMError::DimensionMismatch {
                what: "predicted state",
                expected: (3, 1),
                actual: (3, 2)
            }
        );
        assert!(matches!(err_rows, SSMError::DimensionMismatch { what: "predicted state", .. }));
        assert!(matches!(err_u, SSMError::DimensionMismatch { what: "input", .. }));
        assert!(reconstruct_outputs(&params, &transforms, &trial, Array2::zeros((3, 1))).is_ok());
    }
}
