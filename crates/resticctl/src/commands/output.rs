use crate::OutputFormat;
use anyhow::Result;
use restic_exec::{ErrorNotice, Observers, Progress, ResticMessage};
use std::io::{self, Write};
use tracing::warn;

/// Print the events a command returned
pub fn print_events(events: &[ResticMessage], format: OutputFormat) -> Result<()> {
    for event in events {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&event.to_value())?),
            OutputFormat::Table => match event.as_summary() {
                Some(_) => print_summary(event)?,
                None => println!("{}", serde_json::to_string_pretty(&event.to_value())?),
            },
        }
    }
    Ok(())
}

fn print_summary(event: &ResticMessage) -> Result<()> {
    println!("Summary:");
    if let serde_json::Value::Object(fields) = event.to_value() {
        for (key, value) in fields {
            if key != "message_type" {
                println!("  {}: {}", key, value);
            }
        }
    }
    Ok(())
}

/// Observers that draw a progress line on stderr and log restic's warnings
pub fn progress_observers<'a>() -> Observers<'a> {
    Observers::new()
        .on_progress(|progress| match progress {
            Progress::Message(ResticMessage::Status(status)) => {
                if let Some(done) = status.percent_done {
                    eprint!("\r{:5.1}%", done * 100.0);
                    // A missed redraw is corrected by the next status line
                    io::stderr().flush().ok();
                }
            }
            Progress::Message(_) => {}
            Progress::Text(line) => eprintln!("{}", line),
        })
        .on_error(|notice| {
            if let ErrorNotice::Stderr(line) = notice {
                warn!("restic: {}", line);
            }
        })
}
