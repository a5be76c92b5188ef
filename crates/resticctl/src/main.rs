//! Command-line front end for restic repositories

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use restic_exec::{PASSWORD_ENV, Password};
use restic_repo::{RepositoryConfig, StatsMode, TagAction};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "resticctl")]
#[command(about = "Run restic operations against a configured repository")]
#[command(version)]
struct Cli {
    /// Repository configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository location, overrides the configuration file
    #[arg(short, long, global = true)]
    repo: Option<String>,

    /// File containing the repository password
    #[arg(long, global = true)]
    password_file: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// How results are printed
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and summaries
    Table,
    /// One JSON value per line
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List snapshots
    Snapshots,

    /// Create a new repository
    Init {
        /// Copy chunker parameters from this repository
        #[arg(long)]
        copy_from: Option<String>,
    },

    /// Back up files and directories
    Backup {
        /// Paths to back up
        #[arg(required = true)]
        paths: Vec<String>,

        /// Exclude pattern (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Tag for the new snapshot (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Host name to record
        #[arg(long)]
        host: Option<String>,

        /// Stay on the file systems of the given paths
        #[arg(short = 'x', long)]
        one_file_system: bool,

        /// Report what would be stored without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Restore a snapshot
    Restore {
        /// Snapshot id or `latest`
        snapshot: String,

        /// Directory to restore into
        #[arg(short, long)]
        target: String,

        /// Only restore matching files (repeatable)
        #[arg(short, long)]
        include: Vec<String>,

        /// Skip matching files (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Verify restored files
        #[arg(long)]
        verify: bool,
    },

    /// Remove snapshots by id or retention policy
    Forget {
        /// Snapshot ids to remove
        ids: Vec<String>,

        /// Keep the last n snapshots
        #[arg(long)]
        keep_last: Option<u32>,

        /// Keep the last n daily snapshots
        #[arg(long)]
        keep_daily: Option<u32>,

        /// Keep the last n weekly snapshots
        #[arg(long)]
        keep_weekly: Option<u32>,

        /// Keep the last n monthly snapshots
        #[arg(long)]
        keep_monthly: Option<u32>,

        /// Keep the last n yearly snapshots
        #[arg(long)]
        keep_yearly: Option<u32>,

        /// Keep snapshots newer than this duration
        #[arg(long)]
        keep_within: Option<String>,

        /// Only consider snapshots with this tag (repeatable)
        #[arg(long)]
        tag: Vec<String>,

        /// Prune afterwards
        #[arg(long)]
        prune: bool,

        /// Report what would be removed
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Delete one snapshot
    Delete {
        /// Snapshot id
        id: String,

        /// Prune afterwards
        #[arg(long)]
        prune: bool,
    },

    /// Delete every snapshot in the repository
    DeleteAll {
        /// Prune afterwards
        #[arg(long)]
        prune: bool,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Remove unreferenced data
    Prune {
        /// Tolerated unused space
        #[arg(long)]
        max_unused: Option<String>,

        /// Report what would be removed
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Verify repository integrity
    Check {
        /// Read all data blobs
        #[arg(long)]
        read_data: bool,

        /// Read a subset of data blobs, e.g. `1/5`
        #[arg(long)]
        read_data_subset: Option<String>,
    },

    /// List files in a snapshot
    Ls {
        /// Snapshot id or `latest`
        snapshot: String,

        /// Directory to list
        path: Option<String>,

        /// Long listing
        #[arg(short, long)]
        long: bool,

        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
    },

    /// Find files in snapshots
    Find {
        /// Name patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Case-insensitive matching
        #[arg(short, long)]
        ignore_case: bool,

        /// Only search this snapshot (repeatable)
        #[arg(short, long)]
        snapshot: Vec<String>,
    },

    /// Show repository statistics
    Stats {
        /// Counting mode
        #[arg(long, value_parser = parse_stats_mode)]
        mode: Option<StatsMode>,
    },

    /// Modify snapshot tags
    Tag {
        /// Snapshot ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// What to do with the tags: add, remove or set
        #[arg(long, value_parser = parse_tag_action, default_value = "set")]
        action: TagAction,

        /// Tag to apply (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Compare two snapshots
    Diff {
        /// Older snapshot
        from: String,

        /// Newer snapshot
        to: String,

        /// Include metadata changes
        #[arg(long)]
        metadata: bool,
    },

    /// Mount the repository
    Mount {
        /// Directory to mount on
        mount_point: String,

        /// Allow other users to access the mount
        #[arg(long)]
        allow_other: bool,
    },

    /// Remove stale locks
    Unlock {
        /// Remove all locks
        #[arg(long)]
        remove_all: bool,
    },

    /// Rebuild the repository index
    RebuildIndex {
        /// Read every pack file
        #[arg(long)]
        read_all_packs: bool,
    },

    /// Show the restic version
    Version,
}

fn parse_stats_mode(value: &str) -> Result<StatsMode, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown stats mode: {}", value))
}

fn parse_tag_action(value: &str) -> Result<TagAction, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown tag action: {}", value))
}

/// Build the repository settings from the config file and flags
fn load_config(cli: &Cli) -> Result<RepositoryConfig> {
    let mut config = match (&cli.config, &cli.repo) {
        (Some(path), _) => RepositoryConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        (None, Some(repo)) => RepositoryConfig::new(repo.clone()),
        (None, None) => anyhow::bail!("No repository given, use --repo or --config"),
    };

    if let Some(repo) = &cli.repo {
        config.path = repo.clone();
    }
    if let Some(file) = &cli.password_file {
        config.password = None;
        config.password_file = Some(file.clone());
    }
    if config.password.is_none() && config.password_file.is_none() {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            config.password = Some(Password::new(password));
        }
    }
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    smol::block_on(async {
        if let Commands::Version = cli.command {
            return commands::version::run(cli.format).await;
        }

        let config = load_config(&cli)?;
        let format = cli.format;

        match cli.command {
            Commands::Snapshots => commands::snapshots::list(config, format).await,
            Commands::Init { copy_from } => commands::maintenance::init(config, copy_from, format).await,
            Commands::Backup {
                paths,
                exclude,
                tag,
                host,
                one_file_system,
                dry_run,
            } => {
                let options = restic_repo::BackupOptions {
                    excludes: exclude,
                    tags: tag,
                    host,
                    one_file_system,
                    dry_run,
                    ..restic_repo::BackupOptions::new(paths)
                };
                commands::backup::backup(config, options, format).await
            }
            Commands::Restore {
                snapshot,
                target,
                include,
                exclude,
                verify,
            } => {
                let options = restic_repo::RestoreOptions {
                    includes: include,
                    excludes: exclude,
                    verify,
                    ..restic_repo::RestoreOptions::new(snapshot, target)
                };
                commands::backup::restore(config, options, format).await
            }
            Commands::Forget {
                ids,
                keep_last,
                keep_daily,
                keep_weekly,
                keep_monthly,
                keep_yearly,
                keep_within,
                tag,
                prune,
                dry_run,
            } => {
                let options = restic_repo::ForgetOptions {
                    snapshot_ids: ids,
                    keep_last,
                    keep_daily,
                    keep_weekly,
                    keep_monthly,
                    keep_yearly,
                    keep_within,
                    tags: tag,
                    prune,
                    dry_run,
                    ..Default::default()
                };
                commands::snapshots::forget(config, options, format).await
            }
            Commands::Delete { id, prune } => commands::snapshots::delete(config, &id, prune).await,
            Commands::DeleteAll { prune, yes } => {
                if !yes {
                    anyhow::bail!("Refusing to delete every snapshot without --yes");
                }
                commands::snapshots::delete_all(config, prune).await
            }
            Commands::Prune { max_unused, dry_run } => {
                let options = restic_repo::PruneOptions {
                    max_unused,
                    dry_run,
                    ..Default::default()
                };
                commands::maintenance::prune(config, options, format).await
            }
            Commands::Check {
                read_data,
                read_data_subset,
            } => {
                let options = restic_repo::CheckOptions {
                    read_data,
                    read_data_subset,
                    ..Default::default()
                };
                commands::maintenance::check(config, options, format).await
            }
            Commands::Ls {
                snapshot,
                path,
                long,
                recursive,
            } => {
                let options = restic_repo::ListOptions {
                    path,
                    long,
                    recursive,
                    ..restic_repo::ListOptions::new(snapshot)
                };
                commands::inspect::ls(config, options, format).await
            }
            Commands::Find {
                patterns,
                ignore_case,
                snapshot,
            } => {
                let options = restic_repo::FindOptions {
                    ignore_case,
                    snapshots: snapshot,
                    ..restic_repo::FindOptions::new(patterns)
                };
                commands::inspect::find(config, options, format).await
            }
            Commands::Stats { mode } => {
                let options = restic_repo::StatsOptions {
                    mode,
                    ..Default::default()
                };
                commands::inspect::stats(config, options, format).await
            }
            Commands::Tag { ids, action, tag } => {
                let options = restic_repo::TagOptions::new(ids, tag, action);
                commands::snapshots::tag(config, options, format).await
            }
            Commands::Diff { from, to, metadata } => {
                let options = restic_repo::DiffOptions {
                    metadata,
                    ..restic_repo::DiffOptions::new(from, to)
                };
                commands::inspect::diff(config, options, format).await
            }
            Commands::Mount {
                mount_point,
                allow_other,
            } => {
                let options = restic_repo::MountOptions {
                    allow_other,
                    ..restic_repo::MountOptions::new(mount_point)
                };
                commands::maintenance::mount(config, options, format).await
            }
            Commands::Unlock { remove_all } => {
                let options = restic_repo::UnlockOptions { remove_all };
                commands::maintenance::unlock(config, options, format).await
            }
            Commands::RebuildIndex { read_all_packs } => {
                let options = restic_repo::RebuildIndexOptions { read_all_packs };
                commands::maintenance::rebuild_index(config, options, format).await
            }
            Commands::Version => unreachable!("handled above"),
        }
    })
}
