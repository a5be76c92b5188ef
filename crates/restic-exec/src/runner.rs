//! Entry point that turns requests into sessions

use crate::command::Command;
use crate::error::Result;
use crate::escape::ShellStyle;
use crate::message::ResticMessage;
use crate::observer::Observers;
use crate::request::CliRequest;
use crate::session::Session;
use crate::verb::Verb;

/// Environment variable overriding the restic binary
pub const BINARY_ENV: &str = "RESTIC_BINARY";

/// Runs restic requests with a given binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    /// The restic binary, looked up in `PATH` unless it is a path
    binary: String,
    /// Shell dialect used to launch it
    style: ShellStyle,
}

impl Runner {
    /// Create a runner for the given binary using the host shell
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            style: ShellStyle::host(),
        }
    }

    /// Use `$RESTIC_BINARY` if set, `restic` otherwise
    pub fn from_env() -> Self {
        Self::new(std::env::var(BINARY_ENV).unwrap_or_else(|_| "restic".to_string()))
    }

    /// Override the shell dialect
    pub fn with_style(mut self, style: ShellStyle) -> Self {
        self.style = style;
        self
    }

    /// Get the binary
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Get the shell dialect
    pub fn style(&self) -> ShellStyle {
        self.style
    }

    /// The command a request renders to
    pub fn command(&self, request: &CliRequest) -> Command {
        Command::from_request(&self.binary, request, self.style)
    }

    /// A fresh session for a request
    pub fn session(&self, request: &CliRequest) -> Session {
        Session::new(self.command(request))
    }

    /// Run a request in blocking mode and collect its events
    pub async fn run(&self, request: &CliRequest) -> Result<Vec<ResticMessage>> {
        self.session(request).output().await
    }

    /// Run a request, streaming to the observers when any are registered
    pub async fn run_with(
        &self,
        request: &CliRequest,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        let mut session = self.session(request);
        match observers {
            Some(observers) if !observers.is_empty() => session.stream(observers).await,
            _ => session.output().await,
        }
    }

    /// Run a request, blocking the calling thread until restic exits
    pub fn run_blocking(&self, request: &CliRequest) -> Result<Vec<ResticMessage>> {
        futures_lite::future::block_on(self.run(request))
    }

    /// The version restic reports, if it reports one
    pub async fn version(&self) -> Result<Option<String>> {
        let events = self.run(&CliRequest::builder(Verb::Version).build()).await?;
        Ok(events.iter().find_map(|event| {
            event
                .to_value()
                .get("version")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        }))
    }

    /// Whether the binary can be run at all
    pub async fn is_available(&self) -> bool {
        self.version().await.is_ok()
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::from_env()
    }
}
