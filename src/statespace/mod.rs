//! statespace — causal prediction for identified linear state-space models.
//!
//! Purpose
//! -------
//! Provide the prediction stack for LTI state-space models identified
//! elsewhere: given a model and primary observations (optionally with
//! exogenous inputs), predict the latent state, the primary observation, and
//! a secondary behavior signal one step ahead, causally.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds alias resolution, canonical parameters, preprocessing
//!   transforms, trial containers, options, validation, the steady-state
//!   Kalman recursion, and output reconstruction.
//! - [`models`] exposes [`SSMModel`] and batch prediction over a
//!   [`TrialSet`].
//! - [`errors`] defines [`SSMError`] / [`SSMResult`], shared by every layer.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; axis 0 of each signal indexes time.
//! - Predictions at row `i` use samples `0..i` only; row 0 is NaN.
//! - Only the model layer logs, through the `slog::Logger` carried by
//!   [`PredictOptions`].
//!
//! Downstream usage
//! ----------------
//! 1. Collect named matrices (and optional transforms) in a
//!    [`ModelRecord`], then build an [`SSMModel`] with
//!    `SSMModel::from_record`.
//! 2. Wrap observations / inputs in a [`TrialSet`] (or call the free
//!    [`predict`] with parallel lists).
//! 3. Call `SSMModel::predict` with [`PredictOptions`] and read the
//!    per-trial [`Prediction`]s.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    ModelRecord, ModelTransforms, PredictOptions, Prediction, Preprocessor, SSMDims, SSMParams,
    SignalTransform, Trial, TrialSet,
};

pub use self::errors::{SSMError, SSMResult};

pub use self::models::{PredictionSet, SSMModel, predict};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_statespace::statespace::prelude::*;
//
// to import the main prediction surface in a single line.

pub mod prelude {
    pub use super::{
        ModelRecord, ModelTransforms, PredictOptions, Prediction, PredictionSet, Preprocessor,
        SSMDims, SSMError, SSMModel, SSMParams, SSMResult, SignalTransform, Trial, TrialSet,
        predict,
    };
}
