//! Repository operations for restic
//!
//! Builds on [`restic_exec`] to give one typed method per restic operation,
//! a snapshot model decoded from `restic snapshots`, and connection settings
//! that can be loaded from YAML or JSON files.
//!
//! ```no_run
//! use restic_repo::{BackupOptions, Repository, RepositoryConfig};
//!
//! # smol::block_on(async {
//! let config = RepositoryConfig::new("/srv/backups").with_password("correct horse");
//! let mut repository = Repository::open(config).await?;
//!
//! repository.backup(&BackupOptions::new(["/home/alice"]), None).await?;
//! for snapshot in repository.snapshots(false).await? {
//!     println!("{} {} {:?}", snapshot.short_id, snapshot.time, snapshot.paths);
//! }
//! # Ok::<_, restic_repo::Error>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod options;
pub mod repository;
pub mod snapshot;

pub use config::RepositoryConfig;
pub use error::{Error, Result};
pub use options::{
    BackupOptions, CheckOptions, DiffOptions, FindOptions, ForgetOptions, InitOptions,
    ListOptions, MountOptions, PruneOptions, RebuildIndexOptions, RestoreOptions, StatsMode,
    StatsOptions, TagAction, TagOptions, UnlockOptions, VerbOptions,
};
pub use repository::Repository;
pub use snapshot::{Snapshot, SnapshotSummary, snapshots_from_events};

use restic_exec::Runner;

/// Whether a runnable restic binary can be found
pub async fn is_restic_available() -> bool {
    Runner::from_env().is_available().await
}

/// The installed restic version.
///
/// Returns `"unavailable"` when restic cannot be run and `"unknown"` when it
/// runs but does not report a version.
pub async fn restic_version() -> String {
    match Runner::from_env().version().await {
        Ok(Some(version)) => version,
        Ok(None) => "unknown".to_string(),
        Err(_) => "unavailable".to_string(),
    }
}
