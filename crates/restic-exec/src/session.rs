//! One supervised restic run
//!
//! A [`Session`] launches a single child, drains both of its pipes until they
//! close, classifies every line and resolves to exactly one outcome: the
//! ordered list of JSON events restic printed on stdout, or an [`Error`].
//!
//! Lifecycle:
//!
//! ```text
//! Created ──spawn──> Running ──exit 0──> Succeeded
//!    │                  └─────exit≠0──> Failed
//!    └──spawn error──────────────────> Failed (exit code -1)
//! ```

use crate::command::Command;
use crate::error::{Error, Result, SPAWN_FAILURE_EXIT_CODE};
use crate::escape::ShellStyle;
use crate::message::{classify, parse_output, Line, ResticMessage};
use crate::observer::{ErrorNotice, Observers, Progress};
use crate::process::ExitStatus;
use crate::stream::{LogSource, OutputLines};
use futures::StreamExt;
use tracing::{debug, warn};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not launched yet
    Created,
    /// The child is running
    Running {
        /// OS process id of the shell running restic
        pid: u32,
    },
    /// The child exited with status 0
    Succeeded,
    /// The child could not be launched or exited unsuccessfully
    Failed {
        /// The reported exit code ([`SPAWN_FAILURE_EXIT_CODE`] if it never ran)
        exit_code: i32,
    },
}

/// One launch of one command
#[derive(Debug)]
pub struct Session {
    command: Command,
    state: SessionState,
}

impl Session {
    /// Create a session for a command; nothing runs until it is driven
    pub fn new(command: Command) -> Self {
        Self {
            command,
            state: SessionState::Created,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The command this session runs
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Blocking mode: run to completion, then parse everything restic printed
    /// on stdout.
    pub async fn output(&mut self) -> Result<Vec<ResticMessage>> {
        self.drive(None).await
    }

    /// Streaming mode: route each line to the observers as soon as it arrives.
    ///
    /// Resolves once, after the process exited and every line read up to that
    /// point was routed.
    pub async fn stream(&mut self, observers: &mut Observers<'_>) -> Result<Vec<ResticMessage>> {
        self.drive(Some(observers)).await
    }

    async fn drive(&mut self, mut observers: Option<&mut Observers<'_>>) -> Result<Vec<ResticMessage>> {
        if self.state != SessionState::Created {
            return Err(Error::invalid_request("a session can only be run once"));
        }

        let command_line = self.command.command_line();
        debug!("Running: {}", command_line);

        let mut child = match self.command.prepare().spawn() {
            Ok(child) => child,
            Err(e) => {
                let error = Error::spawn_failed(&command_line, e.to_string());
                return Err(self.fail(error, observers));
            }
        };

        let pid = child.id();
        self.state = SessionState::Running { pid };
        debug!("Started restic (pid {})", pid);

        let mut lines = OutputLines::new(child.stdout.take(), child.stderr.take());
        let mut events = Vec::new();
        let mut stdout = String::new();
        let mut stderr = Vec::new();

        while let Some(line) = lines.next().await {
            match line.source {
                LogSource::Stdout => match observers.as_deref_mut() {
                    None => {
                        stdout.push_str(&line.text);
                        stdout.push('\n');
                    }
                    Some(observers) => {
                        if let Some(event) = route_stdout(observers, line.text) {
                            events.push(event);
                        }
                    }
                },
                LogSource::Stderr => {
                    if let Some(observers) = observers.as_deref_mut() {
                        observers.error(ErrorNotice::Stderr(&line.text));
                    }
                    stderr.extend_from_slice(&line.raw);
                }
            }
        }

        let status = match child.status().await {
            Ok(status) => ExitStatus::from(status),
            Err(e) => return Err(self.fail(Error::Io(e), observers)),
        };

        if observers.is_none() {
            events = parse_output(&stdout);
        }

        if status.success() {
            debug!("restic (pid {}) succeeded with {} events", pid, events.len());
            self.state = SessionState::Succeeded;
            return Ok(events);
        }

        let stderr = String::from_utf8_lossy(&stderr).into_owned();
        let code = status.reported_code();
        let error = if is_launch_failure(self.command.style(), code) {
            let reason = match stderr.trim() {
                "" => format!("shell could not run the program (exit code {})", code),
                text => text.to_string(),
            };
            Error::spawn_failed(command_line, reason)
        } else {
            Error::non_zero_exit(code, stderr, command_line)
        };
        Err(self.fail(error, observers))
    }

    fn fail(&mut self, error: Error, observers: Option<&mut Observers<'_>>) -> Error {
        warn!("{}", error);
        self.state = SessionState::Failed {
            exit_code: error.exit_code().unwrap_or(SPAWN_FAILURE_EXIT_CODE),
        };
        if let Some(observers) = observers {
            observers.error(ErrorNotice::Failure(&error));
        }
        error
    }
}

/// Send one stdout line to its observer, returning it if it was JSON.
///
/// Routing follows the `message_type` discriminator; every `summary` line
/// classifies as [`ResticMessage::Summary`].
fn route_stdout(observers: &mut Observers<'_>, text: String) -> Option<ResticMessage> {
    match classify(&text) {
        Line::Message(message) => {
            match message.as_summary() {
                Some(summary) => observers.summary(summary),
                None => observers.progress(Progress::Message(&message)),
            }
            Some(message)
        }
        Line::Text(text) => {
            if !text.trim().is_empty() {
                observers.progress(Progress::Text(&text));
            }
            None
        }
    }
}

/// Exit codes the shell itself uses when it cannot run the program
fn is_launch_failure(style: ShellStyle, code: i32) -> bool {
    match style {
        // 126: not executable, 127: not found
        ShellStyle::Posix => matches!(code, 126 | 127),
        // "is not recognized as an internal or external command"
        ShellStyle::Windows => code == 9009,
    }
}
