//! Engine error taxonomy.
//!
//! Only genuinely fatal conditions surface as errors. Soft outcomes —
//! hitting the time limit, demand that cannot be met — are encoded in
//! [`ScheduleResult`](crate::model::ScheduleResult) so that a caller can
//! always obtain a best-effort schedule.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the scheduling engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A strategy type was requested that has no registered provider.
    #[error("unsupported strategy type: {0}")]
    UnsupportedType(String),

    /// A supplied parameter is out of its declared bounds or missing.
    ///
    /// Raised before any state transition; the run never starts.
    #[error("parameter validation failed: {0}")]
    Validation(String),

    /// An internal fault occurred mid-run.
    ///
    /// The strategy's state machine transitions to `Error` before this is
    /// returned; the failing phase is attached for diagnosis.
    #[error("execution failed in phase `{phase}`: {message}")]
    Execution {
        /// The run phase that faulted (e.g. `input-validation`, `search`).
        phase: String,
        /// Human-readable cause.
        message: String,
    },
}

impl EngineError {
    /// Convenience constructor for execution faults.
    pub fn execution(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            phase: phase.into(),
            message: message.into(),
        }
    }
}
