use crate::OutputFormat;
use anyhow::Result;
use restic_exec::Runner;

pub async fn run(format: OutputFormat) -> Result<()> {
    let runner = Runner::from_env();
    let version = runner.version().await?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "binary": runner.binary(), "version": version })
        ),
        OutputFormat::Table => println!(
            "{} {}",
            runner.binary(),
            version.as_deref().unwrap_or("unknown")
        ),
    }
    Ok(())
}
