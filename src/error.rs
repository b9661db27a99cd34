//! Error types for rostering.
//!
//! Two layers: [`SchedulingError`] is what callers of the crate can see
//! (invalid input, configuration and I/O problems), while [`SolverError`]
//! describes why a single solver strategy failed. Solver errors never
//! reach callers of the router; they trigger the greedy fallback instead.
//!
//! Per-candidate infeasibility is not an error at all: it is a score of 0
//! with a reason.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Caller-facing errors.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// The problem failed validation.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// A configuration file could not be used.
    #[error("configuration error in {path}: {message}")]
    Config {
        /// Offending file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Why a solver strategy failed.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The external solver process could not be started.
    #[error("failed to start solver process '{program}': {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Preparing or reading the handoff files failed.
    #[error("solver handoff I/O failed: {0}")]
    Handoff(#[from] std::io::Error),

    /// The external solver exited unsuccessfully.
    #[error("solver exited with code {code:?}: {stderr}")]
    NonZeroExit {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The time budget ran out before any solution was found.
    #[error("solver timed out after {budget_ms} ms")]
    Timeout {
        /// Budget in milliseconds.
        budget_ms: u64,
    },

    /// Solver output could not be parsed.
    #[error("malformed solver output: {0}")]
    MalformedOutput(String),

    /// Solver output contradicts the problem.
    #[error("inconsistent solver output: {0}")]
    InconsistentOutput(String),

    /// The solver reported its own failure.
    #[error("solver reported an error: {0}")]
    Reported(String),

    /// The problem cannot be modeled (e.g. unknown timezone).
    #[error("problem cannot be modeled: {0}")]
    InvalidProblem(String),

    /// The search ended without any solution.
    #[error("solver found no solution: {0}")]
    NoSolution(String),

    /// A multi-stage pipeline stage failed.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        /// Stage name.
        stage: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<SolverError>,
    },
}

impl SolverError {
    /// Wraps an error as the failure of a pipeline stage.
    pub fn in_stage(self, stage: &'static str) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_input_message_lists_all() {
        let err = SchedulingError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate shift ID: S1"),
            ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                "Shift 'S2' ends before it starts",
            ),
        ]);
        let text = err.to_string();
        assert!(text.contains("Duplicate shift ID: S1"));
        assert!(text.contains("S2"));
    }

    #[test]
    fn test_stage_wrapping() {
        let err = SolverError::Timeout { budget_ms: 500 }.in_stage("assignment");
        assert_eq!(
            err.to_string(),
            "stage 'assignment' failed: solver timed out after 500 ms"
        );
    }
}
