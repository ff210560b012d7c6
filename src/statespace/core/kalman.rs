//! Causal steady-state Kalman prediction of the latent state.
//!
//! Implements the one-step-ahead predictor form of a steady-state Kalman
//! filter for an identified LTI model:
//!
//! `x̂_{t+1|t} = A x̂_{t|t−1} + K (y_t − Cy x̂_{t|t−1} − Dy u_t) + B u_t`
//!
//! ## Indexing (0-based)
//! - `x_pred[0]` is undefined and filled with NaN: no observation precedes it.
//! - `x_pred[i]`, `i ≥ 1`, is produced by the update that consumes `y[i−1]`
//!   and `u[i−1]`, so it depends only on `y[0..i)` and `u[0..i)`.
//! - The state estimate before the first update is the zero vector, or
//!   `PredictOptions::initial_state` when set.
//!
//! ## Preprocessing
//! The observation and input transforms are applied **per sample**, inside
//! the loop, to the single row being consumed. The input used in the update
//! producing `x_pred[i]` is the lagged `u[i−1]`; output reconstruction uses
//! the time-aligned input instead (see `reconstruct`).
//!
//! ## Absent terms
//! Missing `B` / `Dy`, or a trial without input, contribute exactly zero.
//!
//! ## Shape checks
//! The parameters are re-validated on every call, then the trial widths and
//! the `initial_state` length are checked against them. Mismatches are
//! returned as errors before the loop starts.
//!
//! ## Numerics
//! Dense `f64` arithmetic; NaN / ±∞ propagate without special handling.
//! The loop is strictly sequential.
use crate::statespace::{
    core::{
        data::Trial,
        params::SSMParams,
        transforms::{ModelTransforms, SignalTransform, apply_sample_opt},
        validation::{validate_initial_state, validate_trial_dims},
    },
    errors::SSMResult,
};
use ndarray::{Array1, Array2};

/// Run the causal predictor over one trial and return the T×nx predicted-state
/// sequence.
///
/// # Inputs
/// - `params`: validated canonical matrices.
/// - `transforms`: model transforms; only `y` and `u` are used here.
/// - `trial`: observations and optional inputs.
/// - `initial_state`: state estimate before the first observation
///   (`None` → zeros).
///
/// # Errors
/// - Any shape error of [`SSMParams::validate`].
/// - `SSMError::DimensionMismatch` if the trial does not fit the parameters.
/// - `SSMError::InitialStateLength` if `initial_state` is not of length nx.
/// - Errors raised by the transforms themselves.
pub fn predict_states<T: SignalTransform>(
    params: &SSMParams, transforms: &ModelTransforms<T>, trial: &Trial,
    initial_state: Option<&Array1<f64>>,
) -> SSMResult<Array2<f64>> {
    let dims = params.validate()?;
    validate_trial_dims(&dims, trial)?;
    validate_initial_state(initial_state, dims.nx)?;

    let nx = dims.nx;
    let n = trial.len();
    let mut x_pred = Array2::from_elem((n, nx), f64::NAN);
    let mut x = match initial_state {
        Some(x0) => x0.clone(),
        None => Array1::zeros(nx),
    };

    for i in 1..n {
        let y_k = apply_sample_opt(transforms.y.as_ref(), trial.y.row(i - 1))?;
        let mut innovation = y_k - params.cy.dot(&x);

        let u_k = match trial.u.as_ref() {
            Some(u) => Some(apply_sample_opt(transforms.u.as_ref(), u.row(i - 1))?),
            None => None,
        };
        if let (Some(dy), Some(u_k)) = (params.dy.as_ref(), u_k.as_ref()) {
            innovation -= &dy.dot(u_k);
        }

        let mut next = params.a.dot(&x) + params.k.dot(&innovation);
        if let (Some(b), Some(u_k)) = (params.b.as_ref(), u_k.as_ref()) {
            next += &b.dot(u_k);
        }

        x_pred.row_mut(i).assign(&next);
        x = next;
    }
    Ok(x_pred)
}
