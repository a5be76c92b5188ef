//! Repository connection settings
//!
//! A [`RepositoryConfig`] carries everything needed to reach one repository:
//! its location, how to unlock it, and the global flags every invocation
//! against it should carry. Configs can be built in code or loaded from YAML
//! or JSON files, with `${VAR}` and `${VAR:-default}` references resolved
//! from the process environment before parsing.

use crate::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use restic_exec::{
    CliRequest, CliRequestBuilder, Credential, Password, Runner, ShellStyle, Verb, Verbosity,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("valid env reference pattern")
});

/// Connection settings for one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository location, a local path or a backend URL such as `s3:...`
    pub path: String,

    /// Repository password, handed to restic through the child environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Password>,

    /// File containing the repository password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<String>,

    /// Key hint passed as `--key-hint`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_hint: Option<String>,

    /// Disable the local cache
    #[serde(default)]
    pub no_cache: bool,

    /// Override the cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,

    /// Skip repository locking
    #[serde(default)]
    pub no_lock: bool,

    /// restic verbosity level, 0 to 3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,

    /// Extra `--key=value` options, emitted in order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,

    /// Raw arguments appended verbatim to every invocation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,

    /// restic binary to run instead of the one found via `RESTIC_BINARY` or `PATH`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,

    /// Shell dialect override, defaults to the host platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<ShellStyle>,
}

impl RepositoryConfig {
    /// Settings for the repository at `path`, with no credential
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            password: None,
            password_file: None,
            key_hint: None,
            no_cache: false,
            cache_dir: None,
            no_lock: false,
            verbosity: None,
            options: IndexMap::new(),
            extra_args: Vec::new(),
            binary: None,
            shell: None,
        }
    }

    /// Unlock with a password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Password::new(password));
        self
    }

    /// Unlock with a password file
    pub fn with_password_file(mut self, path: impl Into<String>) -> Self {
        self.password_file = Some(path.into());
        self
    }

    /// Run a specific restic binary
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Render command lines for a specific shell
    pub fn with_shell(mut self, shell: ShellStyle) -> Self {
        self.shell = Some(shell);
        self
    }

    /// Set the verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = Some(verbosity);
        self
    }

    /// Add a `--key=value` option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Load settings from a YAML or JSON file, chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let extension = path.extension().and_then(|ext| ext.to_str());

        if extension == Some("yaml") || extension == Some("yml") {
            Self::from_yaml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    /// Parse YAML settings, resolving environment references first
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let resolved = resolve_env_vars(contents)?;
        let config: Self = serde_yaml::from_str(&resolved)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON settings, resolving environment references first
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let resolved = resolve_env_vars(contents)?;
        let config: Self = serde_json::from_str(&resolved)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::config("repository path must not be empty"));
        }
        Ok(())
    }

    /// The credential requests will carry.
    ///
    /// A password wins over a password file when both are set.
    pub fn credential(&self) -> Option<Credential> {
        match (&self.password, &self.password_file) {
            (Some(password), file) => {
                if file.is_some() {
                    warn!("Both password and password_file set for {}, using password", self.path);
                }
                Some(Credential::Password(password.clone()))
            }
            (None, Some(file)) => Some(Credential::PasswordFile(file.clone())),
            (None, None) => None,
        }
    }

    /// A request builder for `verb` with this repository's connection
    /// parameters and global flags already applied
    pub fn request(&self, verb: Verb) -> CliRequestBuilder {
        CliRequest::builder(verb)
            .repository(self.path.clone())
            .credential(self.credential())
            .key_hint(self.key_hint.clone())
            .no_cache(self.no_cache)
            .cache_dir(self.cache_dir.clone())
            .no_lock(self.no_lock)
            .verbosity(self.verbosity)
            .options(self.options.iter().map(|(k, v)| (k.clone(), v.clone())))
            .extra_args(self.extra_args.iter().cloned())
    }

    /// A runner honouring the `binary` and `shell` overrides
    pub fn runner(&self) -> Runner {
        let runner = match &self.binary {
            Some(binary) => Runner::new(binary.clone()),
            None => Runner::from_env(),
        };
        match self.shell {
            Some(style) => runner.with_style(style),
            None => runner,
        }
    }
}

/// Replace `${VAR}` and `${VAR:-default}` with values from the environment
fn resolve_env_vars(input: &str) -> Result<String> {
    let mut missing = Vec::new();
    let resolved = ENV_REF.replace_all(input, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match (std::env::var(name), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_string(),
            (Err(_), None) => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(Error::EnvVarNotFound(missing.join(", ")));
    }
    Ok(resolved.into_owned())
}
