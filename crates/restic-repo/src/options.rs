//! Per-verb options and the arguments they render to
//!
//! Each options type knows which verb it belongs to and appends its
//! verb-specific arguments to a request builder that already carries the
//! repository's connection parameters. Filesystem paths go through
//! [`CliRequestBuilder::path_arg`]; free-form values such as patterns, tags
//! and host names through [`CliRequestBuilder::literal_arg`].

use crate::{Error, Result};
use restic_exec::{CliRequestBuilder, Verb};
use serde::{Deserialize, Serialize};

/// Options for one restic verb
pub trait VerbOptions {
    /// The verb these options belong to
    fn verb(&self) -> Verb;

    /// Append the verb-specific arguments
    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder>;
}

/// Append `flag value` for every value
fn repeated(mut request: CliRequestBuilder, flag: &str, values: &[String]) -> CliRequestBuilder {
    for value in values {
        request = request.arg(flag).literal_arg(value.clone());
    }
    request
}

/// Append `flag path` for every path
fn repeated_paths(mut request: CliRequestBuilder, flag: &str, paths: &[String]) -> CliRequestBuilder {
    for path in paths {
        request = request.arg(flag).path_arg(path.clone());
    }
    request
}

/// Append `flag value` when a value is present
fn optional(request: CliRequestBuilder, flag: &str, value: Option<&str>) -> CliRequestBuilder {
    match value {
        Some(value) => request.arg(flag).literal_arg(value),
        None => request,
    }
}

/// Append `flag` when enabled
fn switch(request: CliRequestBuilder, flag: &str, enabled: bool) -> CliRequestBuilder {
    if enabled { request.arg(flag) } else { request }
}

/// Options for `restic init`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Copy chunker parameters from an existing repository
    pub copy_from: Option<String>,
    /// Repository format version, e.g. `2` or `latest`
    pub repository_version: Option<String>,
}

impl VerbOptions for InitOptions {
    fn verb(&self) -> Verb {
        Verb::Init
    }

    fn apply(&self, mut request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if let Some(from) = &self.copy_from {
            request = request.arg("--copy-from").path_arg(from.clone());
        }
        Ok(optional(request, "--repository-version", self.repository_version.as_deref()))
    }
}

/// Options for `restic backup`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupOptions {
    /// Files and directories to back up
    pub paths: Vec<String>,
    /// Exclude patterns
    pub excludes: Vec<String>,
    /// Case-insensitive exclude patterns
    pub iexcludes: Vec<String>,
    /// Files holding exclude patterns
    pub exclude_files: Vec<String>,
    /// Skip directories tagged as caches
    pub exclude_caches: bool,
    /// Skip directories containing a file with one of these names
    pub exclude_if_present: Vec<String>,
    /// Stay on the file systems of the given paths
    pub one_file_system: bool,
    /// Tags for the new snapshot
    pub tags: Vec<String>,
    /// Host name recorded in the snapshot
    pub host: Option<String>,
    /// Parent snapshot to compare against
    pub parent: Option<String>,
    /// Ignore inode numbers when detecting changes
    pub ignore_inode: bool,
    /// Record access times
    pub with_atime: bool,
    /// Report what would be done without writing
    pub dry_run: bool,
}

impl BackupOptions {
    /// Back up the given paths with default settings
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl VerbOptions for BackupOptions {
    fn verb(&self) -> Verb {
        Verb::Backup
    }

    fn apply(&self, mut request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if self.paths.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "backup needs at least one path",
            )));
        }
        for path in &self.paths {
            request = request.path_arg(path.clone());
        }
        request = repeated(request, "--exclude", &self.excludes);
        request = repeated(request, "--iexclude", &self.iexcludes);
        request = repeated_paths(request, "--exclude-file", &self.exclude_files);
        request = switch(request, "--exclude-caches", self.exclude_caches);
        request = repeated(request, "--exclude-if-present", &self.exclude_if_present);
        request = switch(request, "--one-file-system", self.one_file_system);
        request = repeated(request, "--tag", &self.tags);
        request = optional(request, "--host", self.host.as_deref());
        request = optional(request, "--parent", self.parent.as_deref());
        request = switch(request, "--ignore-inode", self.ignore_inode);
        request = switch(request, "--with-atime", self.with_atime);
        Ok(switch(request, "--dry-run", self.dry_run))
    }
}

/// Options for `restic restore`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreOptions {
    /// Snapshot to restore, or `latest`
    pub snapshot_id: String,
    /// Directory to restore into
    pub target: String,
    /// Only restore files matching these patterns
    pub includes: Vec<String>,
    /// Skip files matching these patterns
    pub excludes: Vec<String>,
    /// Pick `latest` among snapshots of this host
    pub host: Option<String>,
    /// Pick `latest` among snapshots with these tags
    pub tags: Vec<String>,
    /// Verify restored file contents
    pub verify: bool,
    /// Report what would be done without writing
    pub dry_run: bool,
}

impl RestoreOptions {
    /// Restore `snapshot_id` into `target`
    pub fn new(snapshot_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            target: target.into(),
            ..Default::default()
        }
    }
}

impl VerbOptions for RestoreOptions {
    fn verb(&self) -> Verb {
        Verb::Restore
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if self.snapshot_id.is_empty() || self.target.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "restore needs a snapshot id and a target",
            )));
        }
        let mut request = request
            .literal_arg(self.snapshot_id.clone())
            .arg("--target")
            .path_arg(self.target.clone());
        request = repeated(request, "--include", &self.includes);
        request = repeated(request, "--exclude", &self.excludes);
        request = optional(request, "--host", self.host.as_deref());
        request = repeated(request, "--tag", &self.tags);
        request = switch(request, "--verify", self.verify);
        Ok(switch(request, "--dry-run", self.dry_run))
    }
}

/// Options for `restic forget`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgetOptions {
    /// Snapshots to forget explicitly
    pub snapshot_ids: Vec<String>,
    /// Keep the last n snapshots
    pub keep_last: Option<u32>,
    /// Keep the last n hourly snapshots
    pub keep_hourly: Option<u32>,
    /// Keep the last n daily snapshots
    pub keep_daily: Option<u32>,
    /// Keep the last n weekly snapshots
    pub keep_weekly: Option<u32>,
    /// Keep the last n monthly snapshots
    pub keep_monthly: Option<u32>,
    /// Keep the last n yearly snapshots
    pub keep_yearly: Option<u32>,
    /// Keep snapshots newer than this duration, e.g. `2y5m7d`
    pub keep_within: Option<String>,
    /// Keep snapshots carrying these tags
    pub keep_tags: Vec<String>,
    /// Only consider snapshots of this host
    pub host: Option<String>,
    /// Only consider snapshots with these tags
    pub tags: Vec<String>,
    /// Only consider snapshots of these paths
    pub paths: Vec<String>,
    /// Use compact output
    pub compact: bool,
    /// Grouping criteria, e.g. `host,paths`
    pub group_by: Option<String>,
    /// Report what would be removed without removing it
    pub dry_run: bool,
    /// Prune the repository afterwards
    pub prune: bool,
}

impl VerbOptions for ForgetOptions {
    fn verb(&self) -> Verb {
        Verb::Forget
    }

    fn apply(&self, mut request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        for id in &self.snapshot_ids {
            request = request.literal_arg(id.clone());
        }
        let keeps = [
            ("--keep-last", self.keep_last),
            ("--keep-hourly", self.keep_hourly),
            ("--keep-daily", self.keep_daily),
            ("--keep-weekly", self.keep_weekly),
            ("--keep-monthly", self.keep_monthly),
            ("--keep-yearly", self.keep_yearly),
        ];
        for (flag, count) in keeps {
            if let Some(count) = count {
                request = request.arg(flag).arg(count.to_string());
            }
        }
        request = optional(request, "--keep-within", self.keep_within.as_deref());
        request = repeated(request, "--keep-tag", &self.keep_tags);
        request = optional(request, "--host", self.host.as_deref());
        request = repeated(request, "--tag", &self.tags);
        request = repeated_paths(request, "--path", &self.paths);
        request = switch(request, "--compact", self.compact);
        request = optional(request, "--group-by", self.group_by.as_deref());
        request = switch(request, "--dry-run", self.dry_run);
        Ok(switch(request, "--prune", self.prune))
    }
}

/// Options for `restic prune`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneOptions {
    /// Tolerated unused space, e.g. `5%` or `unlimited`
    pub max_unused: Option<String>,
    /// Upper bound on data repacked in one run
    pub max_repack_size: Option<String>,
    /// Only repack packs that are cacheable
    pub repack_cacheable_only: bool,
    /// Repack small packs too
    pub repack_small: bool,
    /// Report what would be done without doing it
    pub dry_run: bool,
}

impl VerbOptions for PruneOptions {
    fn verb(&self) -> Verb {
        Verb::Prune
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        let mut request = optional(request, "--max-unused", self.max_unused.as_deref());
        request = optional(request, "--max-repack-size", self.max_repack_size.as_deref());
        request = switch(request, "--repack-cacheable-only", self.repack_cacheable_only);
        request = switch(request, "--repack-small", self.repack_small);
        Ok(switch(request, "--dry-run", self.dry_run))
    }
}

/// Options for `restic check`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Read and verify all pack data
    pub read_data: bool,
    /// Read a subset of the data, e.g. `1/5` or `10%`
    pub read_data_subset: Option<String>,
    /// Use the local cache instead of a temporary one
    pub with_cache: bool,
}

impl VerbOptions for CheckOptions {
    fn verb(&self) -> Verb {
        Verb::Check
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        let request = switch(request, "--read-data", self.read_data);
        let request = optional(request, "--read-data-subset", self.read_data_subset.as_deref());
        Ok(switch(request, "--with-cache", self.with_cache))
    }
}

/// Options for `restic ls`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Snapshot to list, or `latest`
    pub snapshot_id: String,
    /// Only list below this directory
    pub path: Option<String>,
    /// Pick `latest` among snapshots of this host
    pub host: Option<String>,
    /// Pick `latest` among snapshots with these tags
    pub tags: Vec<String>,
    /// Long listing format
    pub long: bool,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl ListOptions {
    /// List the contents of `snapshot_id`
    pub fn new(snapshot_id: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            ..Default::default()
        }
    }
}

impl VerbOptions for ListOptions {
    fn verb(&self) -> Verb {
        Verb::Ls
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if self.snapshot_id.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "ls needs a snapshot id",
            )));
        }
        let mut request = request.literal_arg(self.snapshot_id.clone());
        if let Some(path) = &self.path {
            request = request.path_arg(path.clone());
        }
        request = optional(request, "--host", self.host.as_deref());
        request = repeated(request, "--tag", &self.tags);
        request = switch(request, "--long", self.long);
        Ok(switch(request, "--recursive", self.recursive))
    }
}

/// Options for `restic find`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindOptions {
    /// Name patterns to search for
    pub patterns: Vec<String>,
    /// Match patterns case-insensitively
    pub ignore_case: bool,
    /// Long listing format
    pub long: bool,
    /// Only search snapshots of this host
    pub host: Option<String>,
    /// Only search snapshots of these paths
    pub paths: Vec<String>,
    /// Only search snapshots with these tags
    pub tags: Vec<String>,
    /// Only search these snapshots
    pub snapshots: Vec<String>,
}

impl FindOptions {
    /// Search for the given patterns
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl VerbOptions for FindOptions {
    fn verb(&self) -> Verb {
        Verb::Find
    }

    fn apply(&self, mut request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if self.patterns.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "find needs at least one pattern",
            )));
        }
        for pattern in &self.patterns {
            request = request.literal_arg(pattern.clone());
        }
        request = switch(request, "--ignore-case", self.ignore_case);
        request = switch(request, "--long", self.long);
        request = optional(request, "--host", self.host.as_deref());
        request = repeated_paths(request, "--path", &self.paths);
        request = repeated(request, "--tag", &self.tags);
        Ok(repeated(request, "--snapshot", &self.snapshots))
    }
}

/// What `restic stats` counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsMode {
    /// Size of the files as they would be restored
    #[default]
    RestoreSize,
    /// Size of unique file contents
    FilesByContents,
    /// Size of unique blobs, counted per file
    BlobsPerFile,
    /// Size of the raw repository data
    RawData,
}

impl StatsMode {
    /// The value passed to `--mode`
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsMode::RestoreSize => "restore-size",
            StatsMode::FilesByContents => "files-by-contents",
            StatsMode::BlobsPerFile => "blobs-per-file",
            StatsMode::RawData => "raw-data",
        }
    }
}

/// Options for `restic stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsOptions {
    /// Only count snapshots of this host
    pub host: Option<String>,
    /// Only count snapshots with these tags
    pub tags: Vec<String>,
    /// Only count snapshots of these paths
    pub paths: Vec<String>,
    /// Counting mode, restic's default when unset
    pub mode: Option<StatsMode>,
}

impl VerbOptions for StatsOptions {
    fn verb(&self) -> Verb {
        Verb::Stats
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        let mut request = optional(request, "--host", self.host.as_deref());
        request = repeated(request, "--tag", &self.tags);
        request = repeated_paths(request, "--path", &self.paths);
        if let Some(mode) = self.mode {
            request = request.arg("--mode").arg(mode.as_str());
        }
        Ok(request)
    }
}

/// How `restic tag` changes the tag set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagAction {
    /// Add the tags
    Add,
    /// Remove the tags
    Remove,
    /// Replace the tag set
    #[default]
    Set,
}

impl TagAction {
    fn flag(&self) -> &'static str {
        match self {
            TagAction::Add => "--add",
            TagAction::Remove => "--remove",
            TagAction::Set => "--set",
        }
    }
}

/// Options for `restic tag`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagOptions {
    /// Snapshots to modify
    pub snapshot_ids: Vec<String>,
    /// Tags to add, remove or set
    pub tags: Vec<String>,
    /// What to do with the tags
    pub action: TagAction,
}

impl TagOptions {
    /// Apply `action` with `tags` to the given snapshots
    pub fn new<I, S>(snapshot_ids: I, tags: Vec<String>, action: TagAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            snapshot_ids: snapshot_ids.into_iter().map(Into::into).collect(),
            tags,
            action,
        }
    }
}

impl VerbOptions for TagOptions {
    fn verb(&self) -> Verb {
        Verb::Tag
    }

    fn apply(&self, mut request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if self.snapshot_ids.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "tag needs at least one snapshot id",
            )));
        }
        for id in &self.snapshot_ids {
            request = request.literal_arg(id.clone());
        }
        // `--set` with no tags clears the tag set
        if self.tags.is_empty() && self.action == TagAction::Set {
            return Ok(request.arg("--set").literal_arg(""));
        }
        Ok(repeated(request, self.action.flag(), &self.tags))
    }
}

/// Options for `restic mount`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountOptions {
    /// Directory to mount the repository on
    pub mount_point: String,
    /// Only show snapshots of this host
    pub host: Option<String>,
    /// Only show snapshots with these tags
    pub tags: Vec<String>,
    /// Only show snapshots of these paths
    pub paths: Vec<String>,
    /// Let other users access the mount
    pub allow_other: bool,
    /// Let root access the mount
    pub allow_root: bool,
}

impl MountOptions {
    /// Mount on `mount_point`
    pub fn new(mount_point: impl Into<String>) -> Self {
        Self {
            mount_point: mount_point.into(),
            ..Default::default()
        }
    }
}

impl VerbOptions for MountOptions {
    fn verb(&self) -> Verb {
        Verb::Mount
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if self.mount_point.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "mount needs a mount point",
            )));
        }
        let mut request = request.path_arg(self.mount_point.clone());
        request = optional(request, "--host", self.host.as_deref());
        request = repeated(request, "--tag", &self.tags);
        request = repeated_paths(request, "--path", &self.paths);
        request = switch(request, "--allow-other", self.allow_other);
        Ok(switch(request, "--allow-root", self.allow_root))
    }
}

/// Options for `restic diff`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Older snapshot
    pub from: String,
    /// Newer snapshot
    pub to: String,
    /// Also report metadata changes
    pub metadata: bool,
}

impl DiffOptions {
    /// Compare `from` with `to`
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            metadata: false,
        }
    }
}

impl VerbOptions for DiffOptions {
    fn verb(&self) -> Verb {
        Verb::Diff
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        if self.from.is_empty() || self.to.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "diff needs two snapshot ids",
            )));
        }
        let request = request
            .literal_arg(self.from.clone())
            .literal_arg(self.to.clone());
        Ok(switch(request, "--metadata", self.metadata))
    }
}

/// Options for `restic unlock`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockOptions {
    /// Remove all locks, not only stale ones
    pub remove_all: bool,
}

impl VerbOptions for UnlockOptions {
    fn verb(&self) -> Verb {
        Verb::Unlock
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        Ok(switch(request, "--remove-all", self.remove_all))
    }
}

/// Options for `restic rebuild-index`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildIndexOptions {
    /// Read every pack file instead of trusting the existing index
    pub read_all_packs: bool,
}

impl VerbOptions for RebuildIndexOptions {
    fn verb(&self) -> Verb {
        Verb::RebuildIndex
    }

    fn apply(&self, request: CliRequestBuilder) -> Result<CliRequestBuilder> {
        Ok(switch(request, "--read-all-packs", self.read_all_packs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restic_exec::{CliRequest, ShellStyle};

    /// Render only the verb-specific part of the argument vector
    fn verb_args(options: &impl VerbOptions) -> Vec<String> {
        let base = CliRequest::builder(options.verb()).password("pw");
        let prefix = base.clone().build().to_args(ShellStyle::Posix).len();
        let request = options.apply(base).unwrap().build();
        request.to_args(ShellStyle::Posix)[prefix..].to_vec()
    }

    #[test]
    fn test_backup_arguments() {
        let options = BackupOptions {
            excludes: vec!["*.tmp".to_string()],
            exclude_caches: true,
            one_file_system: true,
            tags: vec!["daily".to_string()],
            host: Some("web-1".to_string()),
            dry_run: true,
            ..BackupOptions::new(["/home/a b", "/etc"])
        };
        assert_eq!(
            verb_args(&options),
            vec![
                r"/home/a\ b",
                "/etc",
                "--exclude",
                "'*.tmp'",
                "--exclude-caches",
                "--one-file-system",
                "--tag",
                "'daily'",
                "--host",
                "'web-1'",
                "--dry-run",
            ]
        );
    }

    #[test]
    fn test_backup_without_paths_is_invalid() {
        let err = BackupOptions::default()
            .apply(CliRequest::builder(Verb::Backup))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Restic(restic_exec::Error::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_restore_arguments() {
        let options = RestoreOptions {
            includes: vec!["/etc/nginx".to_string()],
            verify: true,
            ..RestoreOptions::new("latest", "/tmp/restore here")
        };
        assert_eq!(
            verb_args(&options),
            vec![
                "'latest'",
                "--target",
                r"/tmp/restore\ here",
                "--include",
                "'/etc/nginx'",
                "--verify",
            ]
        );
    }

    #[test]
    fn test_forget_policy_arguments() {
        let options = ForgetOptions {
            keep_daily: Some(7),
            keep_weekly: Some(4),
            keep_within: Some("1y".to_string()),
            paths: vec!["/srv/data".to_string()],
            prune: true,
            ..Default::default()
        };
        assert_eq!(
            verb_args(&options),
            vec![
                "--keep-daily",
                "7",
                "--keep-weekly",
                "4",
                "--keep-within",
                "'1y'",
                "--path",
                "/srv/data",
                "--prune",
            ]
        );
    }

    #[test]
    fn test_forget_ids_come_first() {
        let options = ForgetOptions {
            snapshot_ids: vec!["abc".to_string(), "def".to_string()],
            dry_run: true,
            ..Default::default()
        };
        assert_eq!(verb_args(&options), vec!["'abc'", "'def'", "--dry-run"]);
    }

    #[test]
    fn test_prune_and_check_arguments() {
        let prune = PruneOptions {
            max_unused: Some("5%".to_string()),
            repack_small: true,
            ..Default::default()
        };
        assert_eq!(verb_args(&prune), vec!["--max-unused", "'5%'", "--repack-small"]);

        let check = CheckOptions {
            read_data_subset: Some("1/5".to_string()),
            ..Default::default()
        };
        assert_eq!(verb_args(&check), vec!["--read-data-subset", "'1/5'"]);
    }

    #[test]
    fn test_list_arguments() {
        let options = ListOptions {
            path: Some("/home/user docs".to_string()),
            long: true,
            ..ListOptions::new("abc123")
        };
        assert_eq!(
            verb_args(&options),
            vec!["'abc123'", r"/home/user\ docs", "--long"]
        );
    }

    #[test]
    fn test_find_patterns_are_quoted() {
        let options = FindOptions {
            ignore_case: true,
            snapshots: vec!["latest".to_string()],
            ..FindOptions::new(["*.conf"])
        };
        assert_eq!(
            verb_args(&options),
            vec!["'*.conf'", "--ignore-case", "--snapshot", "'latest'"]
        );
    }

    #[test]
    fn test_find_without_patterns_is_invalid() {
        assert!(FindOptions::default().apply(CliRequest::builder(Verb::Find)).is_err());
    }

    #[test]
    fn test_stats_mode() {
        let options = StatsOptions {
            mode: Some(StatsMode::RawData),
            ..Default::default()
        };
        assert_eq!(verb_args(&options), vec!["--mode", "raw-data"]);
    }

    #[test]
    fn test_tag_flag_repeated_per_tag() {
        let options = TagOptions::new(
            ["abc"],
            vec!["keep".to_string(), "prod".to_string()],
            TagAction::Add,
        );
        assert_eq!(
            verb_args(&options),
            vec!["'abc'", "--add", "'keep'", "--add", "'prod'"]
        );
    }

    #[test]
    fn test_tag_set_defaults_and_clears() {
        let options = TagOptions {
            snapshot_ids: vec!["abc".to_string()],
            ..Default::default()
        };
        assert_eq!(options.action, TagAction::Set);
        assert_eq!(verb_args(&options), vec!["'abc'", "--set", "''"]);
    }

    #[test]
    fn test_tag_without_snapshots_is_invalid() {
        let options = TagOptions::new(Vec::<String>::new(), vec!["x".to_string()], TagAction::Add);
        assert!(options.apply(CliRequest::builder(Verb::Tag)).is_err());
    }

    #[test]
    fn test_mount_and_diff_arguments() {
        let mount = MountOptions {
            allow_other: true,
            ..MountOptions::new("/mnt/restic")
        };
        assert_eq!(verb_args(&mount), vec!["/mnt/restic", "--allow-other"]);

        let diff = DiffOptions {
            metadata: true,
            ..DiffOptions::new("abc", "def")
        };
        assert_eq!(verb_args(&diff), vec!["'abc'", "'def'", "--metadata"]);
    }

    #[test]
    fn test_init_copy_from_is_escaped() {
        let options = InitOptions {
            copy_from: Some("/srv/old repo".to_string()),
            ..Default::default()
        };
        assert_eq!(verb_args(&options), vec!["--copy-from", r"/srv/old\ repo"]);
    }

    #[test]
    fn test_options_from_yaml() {
        let options: ForgetOptions =
            serde_yaml::from_str("keep_last: 3\ntags: [daily]\n").unwrap();
        assert_eq!(options.keep_last, Some(3));
        assert_eq!(options.tags, vec!["daily"]);
    }
}
