use super::output::print_events;
use crate::OutputFormat;
use anyhow::{Context, Result};
use comfy_table::Table;
use restic_repo::{ForgetOptions, Repository, RepositoryConfig, Snapshot, TagOptions};

pub async fn list(config: RepositoryConfig, format: OutputFormat) -> Result<()> {
    let mut repository = Repository::new(config);
    let snapshots = repository
        .snapshots(true)
        .await
        .context("Failed to load snapshots")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(snapshots)?),
        OutputFormat::Table => print_table(snapshots),
    }
    Ok(())
}

fn print_table(snapshots: &[Snapshot]) {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Time", "Host", "Tags", "Paths", "Duration"]);
    for snapshot in snapshots {
        let duration = snapshot
            .duration()
            .map(|d| format!("{:.1}s", d.as_secs_f64()))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            snapshot.short_id.clone(),
            snapshot.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            snapshot.hostname.clone(),
            snapshot.tags.join(","),
            snapshot.paths.join("\n"),
            duration,
        ]);
    }
    println!("{table}");
    println!("{} snapshots", snapshots.len());
}

pub async fn forget(config: RepositoryConfig, options: ForgetOptions, format: OutputFormat) -> Result<()> {
    let mut repository = Repository::new(config);
    let events = repository.forget(&options, None).await.context("Forget failed")?;
    print_events(&events, format)?;
    println!(
        "{} snapshots remain",
        repository.cached_snapshots().map_or(0, <[Snapshot]>::len)
    );
    Ok(())
}

pub async fn delete(config: RepositoryConfig, id: &str, prune: bool) -> Result<()> {
    let mut repository = Repository::new(config);
    repository
        .delete_snapshot(id, prune)
        .await
        .with_context(|| format!("Failed to delete snapshot {}", id))?;
    println!("✓ Deleted snapshot {}", id);
    Ok(())
}

pub async fn delete_all(config: RepositoryConfig, prune: bool) -> Result<()> {
    let mut repository = Repository::new(config);
    let deleted = repository
        .delete_all_snapshots(prune)
        .await
        .context("Failed to delete snapshots")?;
    println!("✓ Deleted {} snapshots", deleted.len());
    Ok(())
}

pub async fn tag(config: RepositoryConfig, options: TagOptions, format: OutputFormat) -> Result<()> {
    let mut repository = Repository::new(config);
    let events = repository
        .update_tags(&options, None)
        .await
        .context("Failed to update tags")?;
    print_events(&events, format)
}
