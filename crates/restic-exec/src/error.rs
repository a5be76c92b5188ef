//! Error types for restic invocations

use thiserror::Error;

/// Exit code reported when the restic process could not be started at all.
///
/// Distinguishes "never ran" from "ran and failed".
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// Unified error type for restic invocations
#[derive(Error, Debug)]
pub enum Error {
    /// The subprocess could not be created (missing binary, permission denied)
    #[error("failed to spawn `{command}`: {reason}")]
    SpawnFailed {
        /// The rendered command line that was attempted
        command: String,
        /// The reason for the spawn failure
        reason: String,
    },

    /// The subprocess ran and exited with a non-zero status
    #[error("`{command}` exited with code {code}: {}", stderr.trim_end())]
    NonZeroExit {
        /// Exit code, or `128 + signal` when the process was killed by a signal
        code: i32,
        /// Everything the process wrote to stderr
        stderr: String,
        /// The rendered command line that was executed
        command: String,
    },

    /// The request was malformed before anything was launched
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request
        reason: String,
    },

    /// I/O error while supervising a running process
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a spawn failed error
    pub fn spawn_failed(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Create a non-zero exit error
    pub fn non_zero_exit(code: i32, stderr: impl Into<String>, command: impl Into<String>) -> Self {
        Self::NonZeroExit {
            code,
            stderr: stderr.into(),
            command: command.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Exit code of the failed process.
    ///
    /// Spawn failures report [`SPAWN_FAILURE_EXIT_CODE`]; errors raised before or
    /// outside of a process run report `None`.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::SpawnFailed { .. } => Some(SPAWN_FAILURE_EXIT_CODE),
            Error::NonZeroExit { code, .. } => Some(*code),
            Error::InvalidRequest { .. } | Error::Io(_) => None,
        }
    }

    /// Captured stderr text (the spawn failure reason for spawn failures)
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::SpawnFailed { reason, .. } => Some(reason),
            Error::NonZeroExit { stderr, .. } => Some(stderr),
            Error::InvalidRequest { .. } | Error::Io(_) => None,
        }
    }

    /// The fully rendered command line, when a launch was attempted
    pub fn command(&self) -> Option<&str> {
        match self {
            Error::SpawnFailed { command, .. } | Error::NonZeroExit { command, .. } => {
                Some(command)
            }
            Error::InvalidRequest { .. } | Error::Io(_) => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_reports_sentinel() {
        let err = Error::spawn_failed("restic --json version", "No such file or directory");
        assert_eq!(err.exit_code(), Some(SPAWN_FAILURE_EXIT_CODE));
        assert_eq!(err.stderr(), Some("No such file or directory"));
        assert_eq!(err.command(), Some("restic --json version"));
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[test]
    fn test_non_zero_exit_message_includes_stderr() {
        let err = Error::non_zero_exit(12, "Fatal: wrong password\n", "restic --json snapshots");
        assert_eq!(err.exit_code(), Some(12));
        assert_eq!(
            err.to_string(),
            "`restic --json snapshots` exited with code 12: Fatal: wrong password"
        );
    }

    #[test]
    fn test_invalid_request_has_no_process_context() {
        let err = Error::invalid_request("backup requires at least one path");
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.command(), None);
    }
}
