//! Repository-level operations
//!
//! [`Repository`] binds a [`RepositoryConfig`] to a [`Runner`] and exposes one
//! method per restic operation. It keeps the snapshot list it last loaded and
//! refreshes it after every operation that can change it.

use crate::config::RepositoryConfig;
use crate::options::{
    BackupOptions, CheckOptions, DiffOptions, FindOptions, ForgetOptions, InitOptions,
    ListOptions, MountOptions, PruneOptions, RebuildIndexOptions, RestoreOptions, StatsOptions,
    TagOptions, UnlockOptions, VerbOptions,
};
use crate::snapshot::{Snapshot, snapshots_from_events};
use crate::{Error, Result};
use restic_exec::{Observers, ResticMessage, Runner, Verb};
use tracing::{debug, info};

/// A restic repository and the snapshots last read from it
#[derive(Debug)]
pub struct Repository {
    config: RepositoryConfig,
    runner: Runner,
    snapshots: Option<Vec<Snapshot>>,
}

impl Repository {
    /// Wrap a configuration without touching the repository
    pub fn new(config: RepositoryConfig) -> Self {
        let runner = config.runner();
        Self {
            config,
            runner,
            snapshots: None,
        }
    }

    /// Use a specific runner instead of the one the configuration describes
    pub fn with_runner(mut self, runner: Runner) -> Self {
        self.runner = runner;
        self
    }

    /// Initialize a new repository and return a handle to it
    pub async fn create(config: RepositoryConfig, options: &InitOptions) -> Result<Self> {
        let repository = Self::new(config);
        repository.init(options, None).await?;
        Ok(repository)
    }

    /// Open an existing repository, loading its snapshot list
    pub async fn open(config: RepositoryConfig) -> Result<Self> {
        let mut repository = Self::new(config);
        repository.load_snapshots().await?;
        Ok(repository)
    }

    /// The repository location
    pub fn path(&self) -> &str {
        &self.config.path
    }

    /// The connection settings
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// The runner executing requests
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Build and run the request for `options`
    async fn execute(
        &self,
        options: &impl VerbOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        let verb = options.verb();
        let request = options.apply(self.config.request(verb))?.build();
        info!("Running restic {} on {}", verb, self.config.path);
        let events = self.runner.run_with(&request, observers).await?;
        debug!("restic {} produced {} events", verb, events.len());
        Ok(events)
    }

    /// Create the repository
    pub async fn init(
        &self,
        options: &InitOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Read the snapshot list from the repository, replacing the cached one
    pub async fn load_snapshots(&mut self) -> Result<&[Snapshot]> {
        let request = self.config.request(Verb::Snapshots).build();
        info!("Loading snapshots of {}", self.config.path);
        let events = self.runner.run(&request).await?;
        let snapshots = snapshots_from_events(events)?;
        debug!("Loaded {} snapshots", snapshots.len());
        Ok(self.snapshots.insert(snapshots).as_slice())
    }

    /// The snapshot list, loading it on first use or when `reload` is set
    pub async fn snapshots(&mut self, reload: bool) -> Result<&[Snapshot]> {
        if reload || self.snapshots.is_none() {
            return self.load_snapshots().await;
        }
        Ok(self.snapshots.as_deref().unwrap_or_default())
    }

    /// The cached snapshot list, without touching the repository
    pub fn cached_snapshots(&self) -> Option<&[Snapshot]> {
        self.snapshots.as_deref()
    }

    /// Find a snapshot by full or short id
    pub async fn snapshot(&mut self, id: &str, reload: bool) -> Result<Option<&Snapshot>> {
        let snapshots = self.snapshots(reload).await?;
        Ok(snapshots.iter().find(|snapshot| snapshot.matches_id(id)))
    }

    /// Create a new snapshot, then reload the snapshot list
    pub async fn backup(
        &mut self,
        options: &BackupOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        let events = self.execute(options, observers).await?;
        self.load_snapshots().await?;
        Ok(events)
    }

    /// Extract a snapshot
    pub async fn restore(
        &self,
        options: &RestoreOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Remove snapshots, then reload the snapshot list
    pub async fn forget(
        &mut self,
        options: &ForgetOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        let events = self.execute(options, observers).await?;
        self.load_snapshots().await?;
        Ok(events)
    }

    /// Remove one snapshot, optionally pruning its data
    pub async fn delete_snapshot(&mut self, id: &str, prune: bool) -> Result<Vec<ResticMessage>> {
        if id.is_empty() {
            return Err(Error::from(restic_exec::Error::invalid_request(
                "snapshot id must not be empty",
            )));
        }
        let forget = ForgetOptions {
            snapshot_ids: vec![id.to_string()],
            prune,
            ..Default::default()
        };
        self.forget(&forget, None).await
    }

    /// Remove every snapshot, optionally pruning afterwards.
    ///
    /// Returns the events of each `forget` run, in snapshot order.
    pub async fn delete_all_snapshots(&mut self, prune: bool) -> Result<Vec<Vec<ResticMessage>>> {
        let ids: Vec<String> = self
            .snapshots(true)
            .await?
            .iter()
            .map(|snapshot| snapshot.id.clone())
            .collect();
        info!("Deleting {} snapshots from {}", ids.len(), self.config.path);

        let mut results = Vec::with_capacity(ids.len());
        for id in &ids {
            let forget = ForgetOptions {
                snapshot_ids: vec![id.clone()],
                ..Default::default()
            };
            results.push(self.execute(&forget, None).await?);
        }
        if prune && !ids.is_empty() {
            self.execute(&PruneOptions::default(), None).await?;
        }
        self.load_snapshots().await?;
        Ok(results)
    }

    /// Remove unreferenced data, then reload the snapshot list
    pub async fn prune(
        &mut self,
        options: &PruneOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        let events = self.execute(options, observers).await?;
        self.load_snapshots().await?;
        Ok(events)
    }

    /// Verify repository integrity
    pub async fn check(
        &self,
        options: &CheckOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// List the files of a snapshot
    pub async fn list_files(
        &self,
        options: &ListOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Search snapshots for files
    pub async fn find_files(
        &self,
        options: &FindOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Repository statistics
    pub async fn stats(
        &self,
        options: &StatsOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Change snapshot tags, then reload the snapshot list
    pub async fn update_tags(
        &mut self,
        options: &TagOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        let events = self.execute(options, observers).await?;
        self.load_snapshots().await?;
        Ok(events)
    }

    /// Mount the repository; resolves once restic exits
    pub async fn mount(
        &self,
        options: &MountOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Compare two snapshots
    pub async fn diff(
        &self,
        options: &DiffOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Remove stale locks
    pub async fn unlock(
        &self,
        options: &UnlockOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }

    /// Rebuild the repository index
    pub async fn rebuild_index(
        &self,
        options: &RebuildIndexOptions,
        observers: Option<&mut Observers<'_>>,
    ) -> Result<Vec<ResticMessage>> {
        self.execute(options, observers).await
    }
}
