//! Exit code constants for the prp-runner CLI.
//!
//! - 0: Success
//! - 1: Failure (bad selection, missing document, interrupt, unexpected error)
//!
//! A child agent that exits non-zero hands its own code straight through,
//! so these are the only codes prp-runner chooses itself.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Anything prp-runner itself treats as a failure.
pub const FAILURE: i32 = 1;

/// Map a child's exit status code to the code prp-runner exits with.
///
/// A child killed by a signal has no code; that is reported as [`FAILURE`].
pub fn from_child(code: Option<i32>) -> i32 {
    code.unwrap_or(FAILURE)
}

/// Narrow an exit code to the byte the OS accepts.
///
/// Codes outside `0..=255` (negative, or wide Windows status codes) become
/// [`FAILURE`] so a failing child can never wrap around to success.
pub fn to_process(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(FAILURE as u8)
}
