//! Errors for state-space prediction (model migration, shape validation, and
//! preprocessing transforms).
//!
//! This module defines the single error type of the prediction stack,
//! [`SSMError`], and its result alias [`SSMResult`]. The error implements
//! `Display`/`Error` and converts to `PyErr` when the `python-bindings`
//! feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Shapes are reported as `(rows, cols)`.
//! - Every variant is fatal: prediction either completes for all trials or
//!   returns the first error found, with no partial result.
//! - Absent optional matrices (`Cz`, `B`, `Dy`, `Dz`) and absent transforms are
//!   *not* errors; they contribute exactly zero / identity.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for state-space operations that may produce
/// [`SSMError`].
pub type SSMResult<T> = Result<T, SSMError>;

/// Unified error type for state-space prediction.
///
/// Covers missing mandatory parameters, dimension inconsistencies between
/// matrices, signals and transforms, mismatched trial collections, and
/// invalid preprocessing data.
#[derive(Debug, Clone, PartialEq)]
pub enum SSMError {
    // ---- Model migration ----
    /// A mandatory parameter (`A`, `K`, or `Cy`) is absent from the record.
    MissingMandatoryParameter { name: &'static str },

    /// The state-transition matrix must be square.
    NonSquareTransition { rows: usize, cols: usize },

    /// The legacy combined readout needs at least two rows to derive `Cz`.
    LegacyReadoutTooShort { rows: usize },

    // ---- Dimension validation ----
    /// A matrix, signal, or transform disagrees with the model dimensions.
    DimensionMismatch { what: &'static str, expected: (usize, usize), actual: (usize, usize) },

    /// `initial_state` does not have length nx.
    InitialStateLength { expected: usize, actual: usize },

    // ---- Trial collections ----
    /// Observation and input collections hold different numbers of trials.
    TrialCountMismatch { y_trials: usize, u_trials: usize },

    /// Observation and input of one trial have different lengths.
    TrialLengthMismatch { trial: usize, y_len: usize, u_len: usize },

    // ---- Preprocessing ----
    /// A transform mean / scale entry is unusable.
    InvalidTransform { what: &'static str, index: usize, value: f64, reason: &'static str },
}

impl std::error::Error for SSMError {}

impl std::fmt::Display for SSMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Model migration ----
            SSMError::MissingMandatoryParameter { name } => {
                write!(f, "Model is missing mandatory parameter '{name}'.")
            }
            SSMError::NonSquareTransition { rows, cols } => {
                write!(f, "State transition matrix must be square; got {rows}x{cols}.")
            }
            SSMError::LegacyReadoutTooShort { rows } => {
                write!(
                    f,
                    "Legacy combined readout must have at least 2 rows to derive Cz; got {rows}."
                )
            }
            // ---- Dimension validation ----
            SSMError::DimensionMismatch { what, expected, actual } => {
                write!(
                    f,
                    "Dimension mismatch for {what}: expected {}x{}, got {}x{}.",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
            SSMError::InitialStateLength { expected, actual } => {
                write!(f, "Initial state must have length {expected}; got {actual}.")
            }
            // ---- Trial collections ----
            SSMError::TrialCountMismatch { y_trials, u_trials } => {
                write!(
                    f,
                    "Observation and input collections differ in trial count: {y_trials} vs {u_trials}."
                )
            }
            SSMError::TrialLengthMismatch { trial, y_len, u_len } => {
                write!(
                    f,
                    "Trial {trial}: observation length ({y_len}) differs from input length ({u_len})."
                )
            }
            // ---- Preprocessing ----
            SSMError::InvalidTransform { what, index, value, reason } => {
                write!(f, "Invalid {what} at channel {index}: {value}. {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<SSMError> for PyErr {
    fn from(err: SSMError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
