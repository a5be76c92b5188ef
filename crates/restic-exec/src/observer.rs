//! Caller-supplied callbacks for streaming runs

use crate::error::Error;
use crate::message::{ResticMessage, SummaryMessage};

/// Something worth reporting to the progress callback
#[derive(Debug, Clone, Copy)]
pub enum Progress<'e> {
    /// A JSON event other than a summary
    Message(&'e ResticMessage),
    /// A stdout line that was not JSON
    Text(&'e str),
}

/// Something worth reporting to the error callback
#[derive(Debug, Clone, Copy)]
pub enum ErrorNotice<'e> {
    /// One line restic wrote to stderr
    Stderr(&'e str),
    /// The run failed; this is the error the caller is about to receive
    Failure(&'e Error),
}

type ProgressFn<'a> = Box<dyn FnMut(Progress<'_>) + Send + 'a>;
type SummaryFn<'a> = Box<dyn FnMut(&SummaryMessage) + Send + 'a>;
type ErrorFn<'a> = Box<dyn FnMut(ErrorNotice<'_>) + Send + 'a>;

/// Up to three callbacks invoked while a command runs.
///
/// Observers are borrowed for a single run; the session never keeps them.
#[derive(Default)]
pub struct Observers<'a> {
    progress: Option<ProgressFn<'a>>,
    summary: Option<SummaryFn<'a>>,
    error: Option<ErrorFn<'a>>,
}

impl<'a> Observers<'a> {
    /// An empty observer set
    pub fn new() -> Self {
        Self::default()
    }

    /// Called for each status or other non-summary event, and for each
    /// non-JSON stdout line
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(Progress<'_>) + Send + 'a,
    {
        self.progress = Some(Box::new(f));
        self
    }

    /// Called for each summary event
    pub fn on_summary<F>(mut self, f: F) -> Self
    where
        F: FnMut(&SummaryMessage) + Send + 'a,
    {
        self.summary = Some(Box::new(f));
        self
    }

    /// Called for each stderr line and for the terminal failure
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnMut(ErrorNotice<'_>) + Send + 'a,
    {
        self.error = Some(Box::new(f));
        self
    }

    /// Whether no callback is registered
    pub fn is_empty(&self) -> bool {
        self.progress.is_none() && self.summary.is_none() && self.error.is_none()
    }

    pub(crate) fn progress(&mut self, progress: Progress<'_>) {
        if let Some(f) = self.progress.as_mut() {
            f(progress);
        }
    }

    pub(crate) fn summary(&mut self, summary: &SummaryMessage) {
        if let Some(f) = self.summary.as_mut() {
            f(summary);
        }
    }

    pub(crate) fn error(&mut self, notice: ErrorNotice<'_>) {
        if let Some(f) = self.error.as_mut() {
            f(notice);
        }
    }
}

impl std::fmt::Debug for Observers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("progress", &self.progress.is_some())
            .field("summary", &self.summary.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
