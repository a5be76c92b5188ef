//! Process exit status

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// Exit code if the process exited normally
    pub code: Option<i32>,
    /// Signal that terminated the process (Unix only)
    pub signal: Option<i32>,
}

impl ExitStatus {
    /// Returns true if the process exited successfully (code 0)
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Returns true if the process was terminated by a signal
    pub fn terminated_by_signal(&self) -> bool {
        self.signal.is_some()
    }

    /// A single numeric code for reporting.
    ///
    /// Signal deaths map to `128 + signal`, the way shells report them.
    pub fn reported_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            #[cfg(unix)]
            signal: {
                use std::os::unix::process::ExitStatusExt;
                status.signal()
            },
            #[cfg(not(unix))]
            signal: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_maps_to_shell_convention() {
        let status = ExitStatus {
            code: None,
            signal: Some(15),
        };
        assert!(status.terminated_by_signal());
        assert!(!status.success());
        assert_eq!(status.reported_code(), 143);
    }

    #[test]
    fn test_plain_exit_code() {
        let status = ExitStatus {
            code: Some(3),
            signal: None,
        };
        assert_eq!(status.reported_code(), 3);
    }
}
