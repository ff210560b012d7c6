//! State-space model: validated construction, single-trial prediction, and
//! batch dispatch.
//!
//! [`SSMModel`] bundles canonical [`SSMParams`] with the model's
//! [`ModelTransforms`]. It is built once (from canonical parts or from a
//! [`ModelRecord`] through the alias resolver), is read-only afterwards, and
//! can be shared across threads.
//!
//! Prediction of one trial runs [`predict_states`] followed by
//! [`reconstruct_outputs`]. A batch validates every trial (and the options)
//! before computing anything, then runs the same single-trial pipeline per
//! trial in input order, so result `k` is bit-identical to
//! `predict_trial(trial k)`.
//!
//! Logging goes through the `slog::Logger` in [`PredictOptions`]: a `debug`
//! record per batch and a `trace` record per trial.
use crate::statespace::{
    core::{
        data::{Trial, TrialSet},
        kalman::predict_states,
        options::PredictOptions,
        params::{SSMDims, SSMParams},
        reconstruct::{Prediction, reconstruct_outputs},
        record::{ModelRecord, U_PREP_ALIASES, Y_PREP_ALIASES, Z_PREP_ALIASES},
        transforms::ModelTransforms,
        validation::{validate_initial_state, validate_trial_dims, validate_transform_width},
    },
    errors::SSMResult,
};
use ndarray::{Array1, Array2};
use slog::{debug, trace};

/// Identified LTI state-space model ready for causal prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct SSMModel {
    /// Canonical matrices.
    pub params: SSMParams,
    /// Observation / behavior / input transforms.
    pub transforms: ModelTransforms,
}

impl SSMModel {
    /// Bundle parameters and transforms, checking transform widths.
    ///
    /// # Errors
    /// - `SSMError::DimensionMismatch` if the observation transform does not
    ///   have ny channels, the behavior transform does not have nz channels
    ///   (when nz is known), or the input transform does not have nu channels
    ///   (when nu is known).
    pub fn new(params: SSMParams, transforms: ModelTransforms) -> SSMResult<Self> {
        let dims = params.dims();
        validate_transform_width("y transform", transforms.y.as_ref(), dims.ny)?;
        if let Some(nz) = dims.nz {
            validate_transform_width("z transform", transforms.z.as_ref(), nz)?;
        }
        if let Some(nu) = dims.nu {
            validate_transform_width("u transform", transforms.u.as_ref(), nu)?;
        }
        Ok(SSMModel { params, transforms })
    }

    /// Build a model from named matrices and transforms.
    ///
    /// Aliases are resolved here, once; see [`SSMParams::from_record`] for the
    /// matrix rules. Transforms are looked up under their alias lists and
    /// default to the identity when absent.
    pub fn from_record(record: &ModelRecord) -> SSMResult<Self> {
        let params = SSMParams::from_record(record)?;
        let transforms = ModelTransforms::new(
            record.transform(Y_PREP_ALIASES).cloned(),
            record.transform(Z_PREP_ALIASES).cloned(),
            record.transform(U_PREP_ALIASES).cloned(),
        );
        SSMModel::new(params, transforms)
    }

    pub fn dims(&self) -> SSMDims {
        self.params.dims()
    }

    /// Check one trial against the model dimensions.
    ///
    /// # Errors
    /// - Any shape error of [`SSMParams::validate`], so matrices reassigned
    ///   through the public fields are caught here.
    /// - `SSMError::DimensionMismatch` if `y` does not have ny columns, if
    ///   `u` does not have T rows or nu columns (when nu is known), or if the
    ///   input transform's width differs from the input's.
    pub fn validate_trial(&self, trial: &Trial) -> SSMResult<()> {
        validate_trial_dims(&self.params.validate()?, trial)?;
        if let Some(u) = trial.u.as_ref() {
            validate_transform_width("u transform", self.transforms.u.as_ref(), u.ncols())?;
        }
        Ok(())
    }

    /// Predict states and outputs for one trial.
    ///
    /// # Errors
    /// - `SSMError::InitialStateLength` if `options.initial_state` is not of
    ///   length nx.
    /// - Any error of [`SSMModel::validate_trial`].
    pub fn predict_trial(&self, trial: &Trial, options: &PredictOptions) -> SSMResult<Prediction> {
        validate_initial_state(options.initial_state.as_ref(), self.dims().nx)?;
        self.validate_trial(trial)?;
        self.run_trial(trial, options.initial_state.as_ref())
    }

    /// Predict every trial of a set.
    ///
    /// All trials are validated first; on any error nothing is computed and
    /// no partial result is returned. An empty set yields an empty result.
    pub fn predict(&self, trials: &TrialSet, options: &PredictOptions) -> SSMResult<PredictionSet> {
        let dims = self.dims();
        validate_initial_state(options.initial_state.as_ref(), dims.nx)?;
        for trial in trials.iter() {
            self.validate_trial(trial)?;
        }
        debug!(options.logger, "batch prediction";
            "trials" => trials.len(), "nx" => dims.nx, "ny" => dims.ny,
            "has_behavior" => dims.nz.is_some());

        let mut predictions = Vec::with_capacity(trials.len());
        for (index, trial) in trials.iter().enumerate() {
            trace!(options.logger, "trial"; "index" => index, "steps" => trial.len(),
                "has_input" => trial.u.is_some());
            predictions.push(self.run_trial(trial, options.initial_state.as_ref())?);
        }
        Ok(PredictionSet { predictions })
    }

    fn run_trial(
        &self, trial: &Trial, initial_state: Option<&Array1<f64>>,
    ) -> SSMResult<Prediction> {
        let x_pred = predict_states(&self.params, &self.transforms, trial, initial_state)?;
        reconstruct_outputs(&self.params, &self.transforms, trial, x_pred)
    }
}

/// Per-trial predictions of a batch, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionSet {
    predictions: Vec<Prediction>,
}

impl PredictionSet {
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Prediction> {
        self.predictions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.predictions.iter()
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Split into the `(z_pred, y_pred, x_pred)` collections.
    pub fn into_parts(self) -> (Vec<Option<Array2<f64>>>, Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let n = self.predictions.len();
        let (mut zs, mut ys, mut xs) =
            (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
        for Prediction { z_pred, y_pred, x_pred } in self.predictions {
            zs.push(z_pred);
            ys.push(y_pred);
            xs.push(x_pred);
        }
        (zs, ys, xs)
    }
}

impl IntoIterator for PredictionSet {
    type Item = Prediction;
    type IntoIter = std::vec::IntoIter<Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.predictions.into_iter()
    }
}

/// Predict a collection of trials given as parallel observation / input lists.
///
/// `us` is either `None` (no trial has an input) or one input per trial.
///
/// # Errors
/// - `SSMError::TrialCountMismatch` / `SSMError::TrialLengthMismatch` when the
///   collections do not pair up.
/// - Any error of [`SSMModel::predict`].
pub fn predict(
    model: &SSMModel, ys: &[Array2<f64>], us: Option<&[Array2<f64>]>, options: &PredictOptions,
) -> SSMResult<PredictionSet> {
    let trials = TrialSet::new(ys.to_vec(), us.map(|u| u.to_vec()))?;
    model.predict(&trials, options)
}
