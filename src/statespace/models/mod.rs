//! models — user-facing state-space model and batch prediction.
//!
//! Purpose
//! -------
//! Wire the `statespace::core` primitives into a model type that is built
//! once, validated once, and then predicts any number of trials.
//!
//! Key behaviors
//! -------------
//! - [`SSMModel`] owns canonical parameters and transforms; it is built from
//!   canonical parts (`SSMModel::new`) or from a named record
//!   (`SSMModel::from_record`).
//! - `SSMModel::predict_trial` runs the predictor and reconstructor for one
//!   trial; `SSMModel::predict` and the free [`predict`] dispatch a batch and
//!   return a [`PredictionSet`] in input order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every trial of a batch is validated before the first one is computed.
//! - Trials share only the immutable model; no state carries over between
//!   trials or calls.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`ssm`] cover construction, validation, batch
//!   equivalence, and degenerate batches. The integration test under
//!   `tests/` runs the full record → model → batch pipeline.

pub mod ssm;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::ssm::{PredictionSet, SSMModel, predict};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_statespace::statespace::models::prelude::*;
//
// to import the model surface in a single line.

pub mod prelude {
    pub use super::ssm::{PredictionSet, SSMModel, predict};
}
