//! Runtime-agnostic restic process driver
//!
//! This crate turns typed restic requests into shell command lines, runs them
//! as child processes, and turns restic's line-delimited JSON output back into
//! typed events, either collected after exit or streamed to callbacks.
//!
//! ```no_run
//! use restic_exec::{CliRequest, Observers, Progress, Runner, Verb};
//!
//! # futures_lite::future::block_on(async {
//! let runner = Runner::new("restic");
//! let request = CliRequest::builder(Verb::Backup)
//!     .repository("/srv/backups")
//!     .password("correct horse")
//!     .path_arg("/home/alice")
//!     .build();
//!
//! let mut observers = Observers::new().on_progress(|p| {
//!     if let Progress::Message(m) = p {
//!         println!("{:?}", m);
//!     }
//! });
//! let events = runner.run_with(&request, Some(&mut observers)).await?;
//! println!("{} events", events.len());
//! # Ok::<_, restic_exec::Error>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod escape;
pub mod message;
pub mod observer;
pub mod process;
pub mod request;
pub mod runner;
pub mod session;
pub mod stream;
pub mod verb;

pub use command::Command;
pub use error::{Error, Result, SPAWN_FAILURE_EXIT_CODE};
pub use escape::ShellStyle;
pub use message::{
    classify, parse_output, ErrorMessage, ExitErrorMessage, Line, ResticMessage, StatusMessage,
    SummaryMessage, VerboseStatusMessage,
};
pub use observer::{ErrorNotice, Observers, Progress};
pub use process::ExitStatus;
pub use request::{CliRequest, CliRequestBuilder, Credential, Password, Verbosity, PASSWORD_ENV};
pub use runner::{Runner, BINARY_ENV};
pub use session::{Session, SessionState};
pub use stream::{LogSource, OutputLine, OutputLines};
pub use verb::Verb;
