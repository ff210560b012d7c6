//! Prediction options — configuration for a prediction call.
//!
//! Purpose
//! -------
//! Collect the knobs of a prediction call in one place so call sites pass an
//! explicit options value instead of ad-hoc flags.
//!
//! Key behaviors
//! -------------
//! - [`PredictOptions`] carries the optional initial state estimate and the
//!   `slog::Logger` that receives diagnostics from the model layer.
//! - [`RECOGNIZED_OPTIONS`] enumerates the option names accepted by front-ends
//!   that configure prediction from loosely-typed input (e.g., Python kwargs).
//!
//! Invariants & assumptions
//! ------------------------
//! - No option is mandatory; `PredictOptions::default()` reproduces the base
//!   contract (zero initial state, discarded logs).
//! - `initial_state` length is checked against nx by the model before any
//!   trial runs, not here.
//!
//! Conventions
//! -----------
//! - The numerical core (`kalman`, `reconstruct`) never logs; only
//!   `models::ssm` writes to the logger.
use ndarray::Array1;
use slog::{Discard, Drain, Logger, o};
use slog_async::AsyncGuard;
use std::{fmt, sync::Arc};

/// Option names accepted by loosely-typed front-ends.
pub const RECOGNIZED_OPTIONS: &[&str] = &["initial_state"];

/// PredictOptions — per-call configuration.
///
/// Fields
/// ------
/// - `initial_state`: `Option<Array1<f64>>`
///   State estimate before the first observation is incorporated. `None`
///   means the zero vector.
/// - `logger`: `slog::Logger`
///   Structured-log sink for batch / trial diagnostics. Defaults to a
///   discarding logger.
///
/// A logger from [`PredictOptions::with_term_logger`] writes from a
/// background thread. Its guard is shared by all clones of the options; the
/// queue is flushed when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct PredictOptions {
    pub initial_state: Option<Array1<f64>>,
    pub logger: Logger,
    flush_guard: Option<FlushGuard>,
}

impl Default for PredictOptions {
    fn default() -> Self {
        PredictOptions {
            initial_state: None,
            logger: Logger::root(Discard, o!()),
            flush_guard: None,
        }
    }
}

impl PredictOptions {
    pub fn new(initial_state: Option<Array1<f64>>, logger: Logger) -> Self {
        PredictOptions { initial_state, logger, flush_guard: None }
    }

    pub fn with_initial_state(mut self, initial_state: Array1<f64>) -> Self {
        self.initial_state = Some(initial_state);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self.flush_guard = None;
        self
    }

    /// Route diagnostics to a non-blocking terminal logger.
    ///
    /// Records queued by the background writer are flushed when the last
    /// clone of the returned options is dropped. Records sent through a
    /// detached clone of the logger after that are discarded.
    pub fn with_term_logger(self) -> Self {
        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let (drain, guard) = slog_async::Async::new(drain).build_with_guard();
        let logger = Logger::root(drain.ignore_res(), o!("component" => "rust_statespace"));
        let mut options = self.with_logger(logger);
        options.flush_guard = Some(FlushGuard(Arc::new(guard)));
        options
    }

    /// Whether a background log writer is attached.
    pub fn has_async_logger(&self) -> bool {
        self.flush_guard.is_some()
    }
}

/// Keeps the async drain's worker alive; dropping the last handle flushes it.
#[derive(Clone)]
struct FlushGuard(Arc<AsyncGuard>);

impl fmt::Debug for FlushGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FlushGuard")
    }
}
