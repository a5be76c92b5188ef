use super::output::{print_events, progress_observers};
use crate::OutputFormat;
use anyhow::{Context, Result};
use restic_repo::{
    CheckOptions, InitOptions, MountOptions, PruneOptions, RebuildIndexOptions, Repository,
    RepositoryConfig, UnlockOptions,
};

pub async fn init(config: RepositoryConfig, copy_from: Option<String>, format: OutputFormat) -> Result<()> {
    let path = config.path.clone();
    let options = InitOptions {
        copy_from,
        ..Default::default()
    };
    let repository = Repository::new(config);
    let events = repository
        .init(&options, None)
        .await
        .with_context(|| format!("Failed to initialize {}", path))?;
    print_events(&events, format)?;
    println!("✓ Repository created at {}", path);
    Ok(())
}

pub async fn prune(config: RepositoryConfig, options: PruneOptions, format: OutputFormat) -> Result<()> {
    let mut repository = Repository::new(config);
    let mut observers = progress_observers();
    let events = repository
        .prune(&options, Some(&mut observers))
        .await
        .context("Prune failed")?;
    print_events(&events, format)
}

pub async fn check(config: RepositoryConfig, options: CheckOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    let mut observers = progress_observers();
    let events = repository
        .check(&options, Some(&mut observers))
        .await
        .context("Check failed")?;
    print_events(&events, format)?;
    println!("✓ No errors found");
    Ok(())
}

pub async fn mount(config: RepositoryConfig, options: MountOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    println!("Mounting on {}, unmount to exit", options.mount_point);
    let mut observers = progress_observers();
    let events = repository
        .mount(&options, Some(&mut observers))
        .await
        .context("Mount failed")?;
    print_events(&events, format)
}

pub async fn unlock(config: RepositoryConfig, options: UnlockOptions, format: OutputFormat) -> Result<()> {
    let repository = Repository::new(config);
    let events = repository.unlock(&options, None).await.context("Unlock failed")?;
    print_events(&events, format)
}

pub async fn rebuild_index(
    config: RepositoryConfig,
    options: RebuildIndexOptions,
    format: OutputFormat,
) -> Result<()> {
    let repository = Repository::new(config);
    let mut observers = progress_observers();
    let events = repository
        .rebuild_index(&options, Some(&mut observers))
        .await
        .context("Rebuilding the index failed")?;
    print_events(&events, format)
}
