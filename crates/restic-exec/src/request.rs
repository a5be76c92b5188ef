//! Operation requests and the argument vectors they render to
//!
//! A [`CliRequest`] is an immutable description of one restic invocation. It
//! is assembled with [`CliRequestBuilder`] and rendered with
//! [`CliRequest::to_args`], which is a pure function of the request and the
//! target [`ShellStyle`]: the same request always yields the same vector.

use crate::escape::ShellStyle;
use crate::verb::Verb;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable restic reads the repository password from
pub const PASSWORD_ENV: &str = "RESTIC_PASSWORD";

/// A repository password that never shows up in debug output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wrap a password value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// How the repository is unlocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential {
    /// Password handed to the child through its environment
    Password(Password),
    /// Path to a file containing the password
    PasswordFile(String),
}

/// restic `--verbose` level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Verbosity {
    /// `--verbose=0`
    Quiet,
    /// `--verbose=1`, the lowest non-silent level
    #[default]
    Normal,
    /// `--verbose=2`
    Verbose,
    /// `--verbose=3`
    Debug,
}

impl Verbosity {
    /// Numeric level passed to restic
    pub fn level(&self) -> u8 {
        match self {
            Verbosity::Quiet => 0,
            Verbosity::Normal => 1,
            Verbosity::Verbose => 2,
            Verbosity::Debug => 3,
        }
    }
}

impl TryFrom<u8> for Verbosity {
    type Error = String;

    fn try_from(level: u8) -> std::result::Result<Self, Self::Error> {
        match level {
            0 => Ok(Verbosity::Quiet),
            1 => Ok(Verbosity::Normal),
            2 => Ok(Verbosity::Verbose),
            3 => Ok(Verbosity::Debug),
            other => Err(format!("verbosity must be between 0 and 3, got {}", other)),
        }
    }
}

impl From<Verbosity> for u8 {
    fn from(verbosity: Verbosity) -> Self {
        verbosity.level()
    }
}

/// One fully described restic invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliRequest {
    verb: Verb,
    repository: Option<String>,
    credential: Option<Credential>,
    key_hint: Option<String>,
    no_cache: bool,
    cache_dir: Option<String>,
    no_lock: bool,
    verbosity: Option<Verbosity>,
    options: IndexMap<String, String>,
    verb_args: Vec<VerbArg>,
    extra_args: Vec<String>,
}

/// A verb-specific argument, tagged with whether it names a path
#[derive(Debug, Clone, PartialEq, Eq)]
enum VerbArg {
    Plain(String),
    Path(String),
    Literal(String),
}

impl CliRequest {
    /// Start building a request for the given verb
    pub fn builder(verb: Verb) -> CliRequestBuilder {
        CliRequestBuilder::new(verb)
    }

    /// The verb this request invokes
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The repository location, if any
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// The credential, if any
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Render the argument vector.
    ///
    /// The password never appears here; see [`CliRequest::env`].
    pub fn to_args(&self, style: ShellStyle) -> Vec<String> {
        let mut args = vec!["--json".to_string(), self.verb.as_str().to_string()];

        if let Some(repository) = &self.repository {
            args.push("-r".to_string());
            args.push(style.escape(repository));
        }

        // Unauthenticated runs must opt out of the cache or restic prompts
        let mut no_cache = self.no_cache;
        match &self.credential {
            None => no_cache = true,
            Some(Credential::Password(_)) => {}
            Some(Credential::PasswordFile(path)) => {
                args.push(format!("--password-file={}", style.escape(path)));
            }
        }

        if let Some(hint) = &self.key_hint {
            args.push(format!("--key-hint={}", style.quote(hint)));
        }
        if no_cache {
            args.push("--no-cache".to_string());
        }
        if let Some(dir) = &self.cache_dir {
            args.push(format!("--cache-dir={}", style.escape(dir)));
        }
        if self.no_lock {
            args.push("--no-lock".to_string());
        }
        args.push(format!(
            "--verbose={}",
            self.verbosity.unwrap_or_default().level()
        ));

        for (key, value) in &self.options {
            args.push(format!("--{}={}", key, value));
        }

        for arg in &self.verb_args {
            match arg {
                VerbArg::Plain(value) => args.push(value.clone()),
                VerbArg::Path(path) => args.push(style.escape(path)),
                VerbArg::Literal(value) => args.push(style.quote(value)),
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Environment overlay for the single child running this request
    pub fn env(&self) -> Vec<(&'static str, &str)> {
        match &self.credential {
            Some(Credential::Password(password)) => vec![(PASSWORD_ENV, password.expose())],
            _ => Vec::new(),
        }
    }
}

/// Builder for [`CliRequest`]
#[derive(Debug, Clone)]
pub struct CliRequestBuilder(CliRequest);

impl CliRequestBuilder {
    fn new(verb: Verb) -> Self {
        Self(CliRequest {
            verb,
            repository: None,
            credential: None,
            key_hint: None,
            no_cache: false,
            cache_dir: None,
            no_lock: false,
            verbosity: None,
            options: IndexMap::new(),
            verb_args: Vec::new(),
            extra_args: Vec::new(),
        })
    }

    /// Set the repository location
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.0.repository = Some(repository.into());
        self
    }

    /// Set the credential, or clear it for an unauthenticated run
    pub fn credential(mut self, credential: Option<Credential>) -> Self {
        self.0.credential = credential;
        self
    }

    /// Unlock with a password delivered through the child environment
    pub fn password(self, password: impl Into<String>) -> Self {
        self.credential(Some(Credential::Password(Password::new(password))))
    }

    /// Unlock with a password file
    pub fn password_file(self, path: impl Into<String>) -> Self {
        self.credential(Some(Credential::PasswordFile(path.into())))
    }

    /// Set the key hint
    pub fn key_hint(mut self, hint: Option<String>) -> Self {
        self.0.key_hint = hint;
        self
    }

    /// Disable the local cache
    pub fn no_cache(mut self, enabled: bool) -> Self {
        self.0.no_cache = enabled;
        self
    }

    /// Override the cache directory
    pub fn cache_dir(mut self, dir: Option<String>) -> Self {
        self.0.cache_dir = dir;
        self
    }

    /// Skip repository locking
    pub fn no_lock(mut self, enabled: bool) -> Self {
        self.0.no_lock = enabled;
        self
    }

    /// Set the verbosity (defaults to [`Verbosity::Normal`])
    pub fn verbosity(mut self, verbosity: Option<Verbosity>) -> Self {
        self.0.verbosity = verbosity;
        self
    }

    /// Add one `--key=value` option
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.options.insert(key.into(), value.into());
        self
    }

    /// Add `--key=value` options, keeping their order
    pub fn options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in options {
            self.0.options.insert(key.into(), value.into());
        }
        self
    }

    /// Add a verb-specific argument passed as-is
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.0.verb_args.push(VerbArg::Plain(arg.into()));
        self
    }

    /// Add a verb-specific argument that names a path and gets shell-escaped
    pub fn path_arg(mut self, path: impl Into<String>) -> Self {
        self.0.verb_args.push(VerbArg::Path(path.into()));
        self
    }

    /// Add a verb-specific value (pattern, tag, host) quoted against shell expansion
    pub fn literal_arg(mut self, value: impl Into<String>) -> Self {
        self.0.verb_args.push(VerbArg::Literal(value.into()));
        self
    }

    /// Append raw pass-through arguments, emitted last and verbatim
    pub fn extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build the request
    pub fn build(self) -> CliRequest {
        self.0
    }
}
