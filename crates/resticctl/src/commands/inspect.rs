use super::output::print_events;
use crate::OutputFormat;
use anyhow::{Context, Result};
use restic_repo::{DiffOptions, FindOptions, ListOptions, Repository, RepositoryConfig, StatsOptions};

pub async fn ls(config: RepositoryConfig, options: ListOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    let events = repository
        .list_files(&options, None)
        .await
        .with_context(|| format!("Failed to list {}", options.snapshot_id))?;

    if format == OutputFormat::Json {
        return print_events(&events, format);
    }
    // `ls` prints one node per line; show their paths
    for event in &events {
        if let Some(path) = event.to_value().get("path").and_then(|p| p.as_str()) {
            println!("{}", path);
        }
    }
    Ok(())
}

pub async fn find(config: RepositoryConfig, options: FindOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    let events = repository.find_files(&options, None).await.context("Find failed")?;
    print_events(&events, format)
}

pub async fn stats(config: RepositoryConfig, options: StatsOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    let events = repository.stats(&options, None).await.context("Stats failed")?;
    print_events(&events, format)
}

pub async fn diff(config: RepositoryConfig, options: DiffOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    let events = repository
        .diff(&options, None)
        .await
        .with_context(|| format!("Failed to compare {} and {}", options.from, options.to))?;
    print_events(&events, format)
}
