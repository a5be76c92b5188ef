//! Shell command lines for one restic invocation

use crate::escape::ShellStyle;
use crate::request::CliRequest;
use async_process::{Command as AsyncCommand, Stdio};
use std::collections::BTreeMap;
use std::fmt;

/// A command line to be run through the platform shell.
///
/// Unlike `async_process::Command`, this type is `Clone`, can be rendered to
/// a string for error reports, and keeps its environment overlay private to
/// the one child it launches: nothing is ever written to the parent's
/// environment.
#[derive(Clone)]
pub struct Command {
    /// The program, escaped when rendered
    program: String,
    /// Arguments, already escaped where needed
    args: Vec<String>,
    /// Variables added to the child environment only
    env: BTreeMap<String, String>,
    /// Shell dialect used for rendering and launching
    style: ShellStyle,
}

impl Command {
    /// Create a new command for the given program
    pub fn new(program: impl Into<String>, style: ShellStyle) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            style,
        }
    }

    /// Render a request for the given restic binary
    pub fn from_request(program: impl Into<String>, request: &CliRequest, style: ShellStyle) -> Self {
        let mut command = Self::new(program, style);
        command.args(request.to_args(style));
        for (key, value) in request.env() {
            command.env(key, value);
        }
        command
    }

    /// Add an argument to the command
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// Set an environment variable for the child
    pub fn env(&mut self, key: impl Into<String>, val: impl Into<String>) -> &mut Self {
        self.env.insert(key.into(), val.into());
        self
    }

    /// Get the program name
    pub fn get_program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the shell dialect
    pub fn style(&self) -> ShellStyle {
        self.style
    }

    /// Names of the variables in the environment overlay
    pub fn env_keys(&self) -> impl Iterator<Item = &str> {
        self.env.keys().map(String::as_str)
    }

    /// The line handed to the shell, as used in logs and error reports
    pub fn command_line(&self) -> String {
        let mut line = self.style.escape(&self.program);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Prepare this command for execution by converting to an `async_process::Command`
    pub fn prepare(&self) -> AsyncCommand {
        let line = self.command_line();

        let mut cmd = match self.style {
            ShellStyle::Posix => {
                let mut cmd = AsyncCommand::new("sh");
                cmd.arg("-c").arg(line);
                cmd
            }
            ShellStyle::Windows => {
                let mut cmd = AsyncCommand::new("cmd");
                #[cfg(windows)]
                {
                    use async_process::windows::CommandExt;
                    cmd.raw_arg(format!("/d /s /c \"{}\"", line));
                }
                #[cfg(not(windows))]
                {
                    cmd.args(["/d", "/s", "/c"]).arg(line);
                }
                cmd
            }
        };

        for (key, val) in &self.env {
            cmd.env(key, val);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values stay out of debug output, they may hold the password
        f.debug_struct("Command")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("style", &self.style)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PASSWORD_ENV;
    use crate::verb::Verb;

    #[test]
    fn test_command_line_escapes_program() {
        let mut cmd = Command::new("/opt/restic tools/restic", ShellStyle::Posix);
        cmd.arg("--json").arg("version");
        assert_eq!(cmd.command_line(), r"/opt/restic\ tools/restic --json version");
    }

    #[test]
    fn test_from_request_moves_password_to_env() {
        let request = CliRequest::builder(Verb::Snapshots)
            .repository("/srv/repo")
            .password("s3cret")
            .build();
        let cmd = Command::from_request("restic", &request, ShellStyle::Posix);

        assert_eq!(
            cmd.command_line(),
            "restic --json snapshots -r /srv/repo --verbose=1"
        );
        assert_eq!(cmd.env_keys().collect::<Vec<_>>(), vec![PASSWORD_ENV]);
        assert!(!format!("{:?}", cmd).contains("s3cret"));
    }

    #[test]
    fn test_command_clone() {
        let mut cmd1 = Command::new("restic", ShellStyle::Windows);
        cmd1.arg("--json").env("KEY", "VALUE");
        let cmd2 = cmd1.clone();

        assert_eq!(cmd1.get_program(), cmd2.get_program());
        assert_eq!(cmd1.get_args(), cmd2.get_args());
        assert_eq!(cmd1.command_line(), "\"restic\" --json");
    }

    #[test]
    fn test_command_prepare() {
        let request = CliRequest::builder(Verb::Version)
            .password("prepare-only-secret")
            .build();
        let cmd = Command::from_request("restic", &request, ShellStyle::Posix);

        let _async_cmd = cmd.prepare();
        assert_ne!(
            std::env::var(PASSWORD_ENV).ok().as_deref(),
            Some("prepare-only-secret")
        );
    }
}
