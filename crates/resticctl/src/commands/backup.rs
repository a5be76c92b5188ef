use super::output::{print_events, progress_observers};
use crate::OutputFormat;
use anyhow::{Context, Result};
use restic_repo::{BackupOptions, Repository, RepositoryConfig, RestoreOptions};

pub async fn backup(config: RepositoryConfig, options: BackupOptions, format: OutputFormat) -> Result<()> {
    let mut repository = Repository::new(config);
    let mut observers = progress_observers();
    let events = repository
        .backup(&options, Some(&mut observers))
        .await
        .context("Backup failed")?;
    eprintln!();

    let summaries: Vec<_> = events.into_iter().filter(|e| e.as_summary().is_some()).collect();
    print_events(&summaries, format)
}

pub async fn restore(config: RepositoryConfig, options: RestoreOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    let mut observers = progress_observers();
    let events = repository
        .restore(&options, Some(&mut observers))
        .await
        .with_context(|| format!("Failed to restore {}", options.snapshot_id))?;
    eprintln!();

    let summaries: Vec<_> = events.into_iter().filter(|e| e.as_summary().is_some()).collect();
    print_events(&summaries, format)
}
