//! Error types for the prp-runner CLI.
//!
//! Uses thiserror for derive macros. Every variant except `Unexpected` is a
//! "clean" exit: the user already has what they need on stderr and no trace
//! file is written.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for prp-runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// The task document does not exist.
    #[error("PRP not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The agent process exited non-zero; its diagnostic was already printed.
    #[error("agent exited with code {code}")]
    ChildFailed { code: i32 },

    /// Ctrl-C arrived while relaying streamed output.
    #[error("interrupted by user")]
    Interrupted,

    /// Anything not covered above. Reported through the trace file.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl RunnerError {
    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::ChildFailed { code } => *code,
            RunnerError::UserError(_)
            | RunnerError::NotFound(_)
            | RunnerError::Interrupted
            | RunnerError::Unexpected(_) => exit_codes::FAILURE,
        }
    }

    /// Whether this error should produce a diagnostic trace file.
    pub fn wants_trace(&self) -> bool {
        matches!(self, RunnerError::Unexpected(_))
    }
}

/// Result type alias for prp-runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn user_error_has_failure_exit_code() {
        let err = RunnerError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
        assert!(!err.wants_trace());
    }

    #[test]
    fn not_found_names_the_path() {
        let err = RunnerError::NotFound(PathBuf::from("PRPs/missing.md"));
        assert_eq!(err.to_string(), "PRP not found: PRPs/missing.md");
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
        assert!(!err.wants_trace());
    }

    #[test]
    fn child_failure_propagates_its_code() {
        let err = RunnerError::ChildFailed { code: 42 };
        assert_eq!(err.exit_code(), 42);
        assert!(!err.wants_trace());
    }

    #[test]
    fn interrupt_exits_one_without_trace() {
        let err = RunnerError::Interrupted;
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
        assert!(!err.wants_trace());
    }

    #[test]
    fn only_unexpected_errors_want_a_trace() {
        let err: RunnerError = anyhow!("pipe closed").into();
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
        assert!(err.wants_trace());
        assert_eq!(err.to_string(), "pipe closed");
    }
}
