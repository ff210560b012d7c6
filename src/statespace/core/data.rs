//! Trial containers for state-space prediction.
//!
//! Purpose
//! -------
//! Represent the observation / input data handed to the predictor as an
//! explicit list of trials, so that a single recording and a collection of
//! recordings go through the same code path.
//!
//! Key behaviors
//! -------------
//! - [`Trial`] pairs a T×ny observation matrix with an optional T×nu input
//!   matrix and checks that both have the same number of time steps.
//! - [`TrialSet`] is an ordered list of trials; a single trial is a list of
//!   length one. [`TrialSet::new`] pairs observation and input collections and
//!   checks that they hold the same number of trials.
//!
//! Invariants & assumptions
//! ------------------------
//! - Axis 0 indexes time, axis 1 indexes channels.
//! - `u.nrows() == y.nrows()` for every trial with an input.
//! - Channel counts are NOT checked here; they depend on the model and are
//!   validated by `SSMModel` before any prediction runs.
//! - Values are not checked for finiteness; NaN / ±∞ propagate through the
//!   predictor.
//!
//! Testing notes
//! -------------
//! - Unit tests cover pairing, count and length mismatches (with the trial
//!   index reported), and the single-trial constructor.
use crate::statespace::errors::{SSMError, SSMResult};
use ndarray::Array2;

/// Trial — one time-aligned recording.
///
/// Fields
/// ------
/// - `y`: `Array2<f64>`
///   Primary observations, T×ny.
/// - `u`: `Option<Array2<f64>>`
///   Exogenous inputs, T×nu. `u[i]` is known at the step where `y[i]` is
///   observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub y: Array2<f64>,
    pub u: Option<Array2<f64>>,
}

impl Trial {
    /// Pair observations with optional inputs.
    ///
    /// Errors
    /// ------
    /// - `SSMError::TrialLengthMismatch { trial: 0, .. }` when `u` has a
    ///   different number of rows than `y`.
    pub fn new(y: Array2<f64>, u: Option<Array2<f64>>) -> SSMResult<Self> {
        check_lengths(0, &y, u.as_ref())?;
        Ok(Trial { y, u })
    }

    /// Number of time steps T.
    pub fn len(&self) -> usize {
        self.y.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// TrialSet — ordered collection of trials.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrialSet {
    trials: Vec<Trial>,
}

impl TrialSet {
    /// Pair an observation collection with an optional input collection.
    ///
    /// Parameters
    /// ----------
    /// - `ys`: `Vec<Array2<f64>>`
    ///   One T_k×ny observation matrix per trial.
    /// - `us`: `Option<Vec<Array2<f64>>>`
    ///   Either `None` (no trial has an input) or one T_k×nu input matrix per
    ///   trial, in the same order as `ys`.
    ///
    /// Errors
    /// ------
    /// - `SSMError::TrialCountMismatch` when `us` holds a different number of
    ///   trials than `ys`.
    /// - `SSMError::TrialLengthMismatch` naming the first trial whose input
    ///   length differs from its observation length.
    pub fn new(ys: Vec<Array2<f64>>, us: Option<Vec<Array2<f64>>>) -> SSMResult<Self> {
        let trials = match us {
            None => ys.into_iter().map(|y| Trial { y, u: None }).collect(),
            Some(us) => {
                if us.len() != ys.len() {
                    return Err(SSMError::TrialCountMismatch {
                        y_trials: ys.len(),
                        u_trials: us.len(),
                    });
                }
                for (index, (y, u)) in ys.iter().zip(us.iter()).enumerate() {
                    check_lengths(index, y, Some(u))?;
                }
                ys.into_iter().zip(us).map(|(y, u)| Trial { y, u: Some(u) }).collect()
            }
        };
        Ok(TrialSet { trials })
    }

    /// A set holding exactly one trial.
    pub fn single(trial: Trial) -> Self {
        TrialSet { trials: vec![trial] }
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trial> {
        self.trials.iter()
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }
}

impl From<Trial> for TrialSet {
    fn from(trial: Trial) -> Self {
        TrialSet::single(trial)
    }
}

impl From<Vec<Trial>> for TrialSet {
    fn from(trials: Vec<Trial>) -> Self {
        TrialSet { trials }
    }
}

fn check_lengths(trial: usize, y: &Array2<f64>, u: Option<&Array2<f64>>) -> SSMResult<()> {
    match u {
        Some(u) if u.nrows() != y.nrows() => {
            Err(SSMError::TrialLengthMismatch { trial, y_len: y.nrows(), u_len: u.nrows() })
        }
        _ => Ok(()),
    }
}
