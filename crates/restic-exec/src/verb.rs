//! The restic subcommands this crate can invoke

use serde::{Deserialize, Serialize};
use std::fmt;

/// A restic operation keyword, placed right after the output-format flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verb {
    // Main commands
    /// Create a new snapshot
    Backup,
    /// List snapshots
    Snapshots,
    /// Extract a snapshot
    Restore,
    /// Remove snapshots by id or retention policy
    Forget,
    /// Remove unreferenced data
    Prune,
    /// Verify repository integrity
    Check,

    // Repository management
    /// Create a new repository
    Init,
    /// Remove stale locks
    Unlock,
    /// Rebuild the index from pack files
    RebuildIndex,

    // Data inspection
    /// Compare two snapshots
    Diff,
    /// Search for files in snapshots
    Find,
    /// List files of a snapshot
    Ls,
    /// Mount the repository through FUSE
    Mount,
    /// Print internal objects
    Cat,

    // Maintenance
    /// Manage local caches
    Cache,
    /// Copy snapshots between repositories
    Copy,
    /// Apply repository migrations
    Migrate,
    /// Repair broken repository data
    Repair,
    /// Rewrite existing snapshots
    Rewrite,

    // Information
    /// Repository statistics
    Stats,
    /// Modify snapshot tags
    Tag,
    /// Print the restic version
    Version,
    /// Manage repository keys
    Key,

    // Miscellaneous
    /// Update the restic binary
    SelfUpdate,
    /// Generate manual pages and completions
    Generate,
}

impl Verb {
    /// The keyword as restic expects it on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Backup => "backup",
            Verb::Snapshots => "snapshots",
            Verb::Restore => "restore",
            Verb::Forget => "forget",
            Verb::Prune => "prune",
            Verb::Check => "check",
            Verb::Init => "init",
            Verb::Unlock => "unlock",
            Verb::RebuildIndex => "rebuild-index",
            Verb::Diff => "diff",
            Verb::Find => "find",
            Verb::Ls => "ls",
            Verb::Mount => "mount",
            Verb::Cat => "cat",
            Verb::Cache => "cache",
            Verb::Copy => "copy",
            Verb::Migrate => "migrate",
            Verb::Repair => "repair",
            Verb::Rewrite => "rewrite",
            Verb::Stats => "stats",
            Verb::Tag => "tag",
            Verb::Version => "version",
            Verb::Key => "key",
            Verb::SelfUpdate => "self-update",
            Verb::Generate => "generate",
        }
    }

    /// Whether a successful run of this verb changes the set of snapshots
    pub fn mutates_snapshots(&self) -> bool {
        matches!(
            self,
            Verb::Backup | Verb::Forget | Verb::Prune | Verb::Tag | Verb::Rewrite | Verb::Copy
        )
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_word_verbs_use_kebab_case() {
        assert_eq!(Verb::RebuildIndex.as_str(), "rebuild-index");
        assert_eq!(Verb::SelfUpdate.to_string(), "self-update");
        assert_eq!(
            serde_json::to_string(&Verb::RebuildIndex).unwrap(),
            "\"rebuild-index\""
        );
    }

    #[test]
    fn test_read_only_verbs_do_not_mutate() {
        assert!(Verb::Backup.mutates_snapshots());
        assert!(Verb::Tag.mutates_snapshots());
        assert!(!Verb::Snapshots.mutates_snapshots());
        assert!(!Verb::Restore.mutates_snapshots());
    }
}
