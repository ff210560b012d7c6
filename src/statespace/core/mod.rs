//! core — canonical parameters, transforms, trials, and the prediction numerics.
//!
//! Purpose
//! -------
//! Collect the building blocks of causal state-space prediction: alias-based
//! parameter lookup, validated canonical matrices, preprocessing transforms,
//! trial containers, per-call options, shape validation, the steady-state
//! Kalman recursion, and output reconstruction. The model layer in
//! `statespace::models` wires these together.
//!
//! Key behaviors
//! -------------
//! - Resolve named matrices and transforms through ordered alias lists
//!   ([`resolve_field`], [`ModelRecord`]) and migrate them once into
//!   canonical [`SSMParams`] / [`SSMDims`].
//! - Apply and invert channel-wise preprocessing through the
//!   [`SignalTransform`] trait; [`Preprocessor`] is the concrete enum and
//!   [`ModelTransforms`] groups the per-signal transforms of a model.
//! - Run the causal predictor over one trial ([`predict_states`]) and map the
//!   predicted states back to observation / behavior space
//!   ([`reconstruct_outputs`] → [`Prediction`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Shapes are validated before the numerics run; `kalman` and
//!   `reconstruct` check their own inputs on entry and return errors.
//! - Absent optional matrices and transforms contribute zero / identity.
//! - Values are not checked for finiteness; NaN / ±∞ propagate.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; axis 0 of every signal indexes time.
//! - Row 0 of every predicted sequence is undefined (NaN); row `i ≥ 1`
//!   depends only on samples `0..i` of the trial.
//! - This module performs no I/O and no logging.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover lookup priority, shape validation,
//!   transform round trips, the scalar worked example, causality, and
//!   reconstruction with feedthrough and inverse transforms.

pub mod data;
pub mod kalman;
pub mod options;
pub mod params;
pub mod reconstruct;
pub mod record;
pub mod transforms;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{Trial, TrialSet};
pub use self::kalman::predict_states;
pub use self::options::{PredictOptions, RECOGNIZED_OPTIONS};
pub use self::params::{SSMDims, SSMParams};
pub use self::reconstruct::{Prediction, reconstruct_outputs};
pub use self::record::{ModelRecord, resolve_field, resolve_field_or};
pub use self::transforms::{ModelTransforms, Preprocessor, SignalTransform};
pub use self::validation::{
    infer_input_dim, validate_initial_state, validate_shape, validate_transform_width,
    validate_trial_dims,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_statespace::statespace::core::prelude::*;
//
// to import the main core surface in a single line.

pub mod prelude {
    pub use super::data::{Trial, TrialSet};
    pub use super::options::PredictOptions;
    pub use super::params::{SSMDims, SSMParams};
    pub use super::reconstruct::Prediction;
    pub use super::record::ModelRecord;
    pub use super::transforms::{ModelTransforms, Preprocessor, SignalTransform};
}
