//! Snapshot records as reported by `restic snapshots`

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use restic_exec::ResticMessage;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One snapshot in a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Full snapshot id
    pub id: String,
    /// Abbreviated id as printed by restic
    #[serde(default)]
    pub short_id: String,
    /// When the snapshot was taken
    pub time: DateTime<FixedOffset>,
    /// Snapshot this one was based on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Root tree id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<String>,
    /// Paths that were backed up
    #[serde(default, deserialize_with = "null_as_empty")]
    pub paths: Vec<String>,
    /// Host the backup ran on
    #[serde(default)]
    pub hostname: String,
    /// User the backup ran as
    #[serde(default)]
    pub username: String,
    /// Tags attached to the snapshot
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Version of restic that wrote the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_version: Option<String>,
    /// Backup statistics, recorded by restic 0.17 and later
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SnapshotSummary>,
}

/// Statistics of the backup run that produced a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    /// When the backup started
    pub backup_start: DateTime<FixedOffset>,
    /// When the backup finished
    pub backup_end: DateTime<FixedOffset>,
    /// New files
    #[serde(default)]
    pub files_new: u64,
    /// Changed files
    #[serde(default)]
    pub files_changed: u64,
    /// Unchanged files
    #[serde(default)]
    pub files_unmodified: u64,
    /// New directories
    #[serde(default)]
    pub dirs_new: u64,
    /// Changed directories
    #[serde(default)]
    pub dirs_changed: u64,
    /// Unchanged directories
    #[serde(default)]
    pub dirs_unmodified: u64,
    /// Data blobs added
    #[serde(default)]
    pub data_blobs: i64,
    /// Tree blobs added
    #[serde(default)]
    pub tree_blobs: i64,
    /// Bytes added before compression
    #[serde(default)]
    pub data_added: u64,
    /// Bytes added after compression
    #[serde(default)]
    pub data_added_packed: u64,
    /// Files scanned
    #[serde(default)]
    pub total_files_processed: u64,
    /// Bytes scanned
    #[serde(default)]
    pub total_bytes_processed: u64,
}

impl SnapshotSummary {
    /// Wall-clock duration of the backup, zero if the clock went backwards
    pub fn duration(&self) -> Duration {
        (self.backup_end - self.backup_start)
            .to_std()
            .unwrap_or_default()
    }
}

impl Snapshot {
    /// Decode one snapshot object
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::decode("snapshot", e))
    }

    /// Whether `id` names this snapshot, by full or short id
    pub fn matches_id(&self, id: &str) -> bool {
        !id.is_empty() && (self.id == id || self.short_id == id)
    }

    /// Backup duration, if the snapshot carries a summary
    pub fn duration(&self) -> Option<Duration> {
        self.summary.as_ref().map(SnapshotSummary::duration)
    }
}

/// Collect the snapshots from the events of a `restic snapshots` run.
///
/// restic prints the whole list as one JSON array; any other events are
/// ignored.
pub fn snapshots_from_events(events: Vec<ResticMessage>) -> Result<Vec<Snapshot>> {
    let mut snapshots = Vec::new();
    for event in events {
        match event {
            ResticMessage::Unstructured(Value::Array(items)) => {
                for item in items {
                    snapshots.push(Snapshot::from_json(item)?);
                }
            }
            ResticMessage::Unstructured(value @ Value::Object(_)) => {
                snapshots.push(Snapshot::from_json(value)?);
            }
            _ => {}
        }
    }
    Ok(snapshots)
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
