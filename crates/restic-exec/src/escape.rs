//! Shell escaping for path-shaped arguments
//!
//! Commands are launched through the platform shell, so any argument that
//! names a filesystem path has to survive one round of shell interpretation.

use serde::{Deserialize, Serialize};

/// The shell dialect a command line is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellStyle {
    /// `sh -c`: backslash-escape metacharacters
    Posix,
    /// `cmd /c`: wrap in double quotes
    Windows,
}

impl ShellStyle {
    /// The style of the shell on the current platform
    pub fn host() -> Self {
        if cfg!(windows) {
            ShellStyle::Windows
        } else {
            ShellStyle::Posix
        }
    }

    /// Escape a path so the shell passes it through as a single literal word.
    ///
    /// Windows wraps the whole path in double quotes without touching its
    /// contents. POSIX prefixes every `"`, `'`, `` ` ``, `$`, `\` and
    /// whitespace character with a backslash.
    pub fn escape(&self, path: &str) -> String {
        match self {
            ShellStyle::Windows => format!("\"{}\"", path),
            ShellStyle::Posix => {
                let mut escaped = String::with_capacity(path.len());
                for c in path.chars() {
                    if matches!(c, '"' | '\'' | '`' | '$' | '\\') || c.is_whitespace() {
                        escaped.push('\\');
                    }
                    escaped.push(c);
                }
                escaped
            }
        }
    }

    /// Quote a value so the shell neither splits nor expands it.
    ///
    /// Used for non-path values such as glob patterns and tags, which
    /// [`ShellStyle::escape`] would leave open to wildcard expansion.
    pub fn quote(&self, value: &str) -> String {
        match self {
            ShellStyle::Windows => format!("\"{}\"", value),
            ShellStyle::Posix => format!("'{}'", value.replace('\'', r"'\''")),
        }
    }
}

impl Default for ShellStyle {
    fn default() -> Self {
        Self::host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_wraps_in_quotes() {
        assert_eq!(
            ShellStyle::Windows.escape(r"C:\Users\A B\x.txt"),
            r#""C:\Users\A B\x.txt""#
        );
    }

    #[test]
    fn test_windows_leaves_inner_characters_alone() {
        assert_eq!(ShellStyle::Windows.escape("a$b'c"), "\"a$b'c\"");
    }

    #[test]
    fn test_posix_escapes_space_and_single_quote() {
        assert_eq!(
            ShellStyle::Posix.escape("/home/a b/c'd.txt"),
            r"/home/a\ b/c\'d.txt"
        );
    }

    #[test]
    fn test_posix_escapes_every_metacharacter() {
        assert_eq!(
            ShellStyle::Posix.escape("\"'`$\\\t"),
            "\\\"\\'\\`\\$\\\\\\\t"
        );
    }

    #[test]
    fn test_posix_plain_path_unchanged() {
        assert_eq!(ShellStyle::Posix.escape("/srv/backup/repo-1"), "/srv/backup/repo-1");
    }

    #[test]
    fn test_posix_quote_blocks_globbing() {
        assert_eq!(ShellStyle::Posix.quote("*.tmp"), "'*.tmp'");
        assert_eq!(ShellStyle::Posix.quote("it's"), r"'it'\''s'");
        assert_eq!(ShellStyle::Windows.quote("*.tmp"), "\"*.tmp\"");
    }

    #[test]
    fn test_host_style_matches_platform() {
        #[cfg(unix)]
        assert_eq!(ShellStyle::host(), ShellStyle::Posix);
        #[cfg(windows)]
        assert_eq!(ShellStyle::host(), ShellStyle::Windows);
    }
}
