//! Common test utilities

use restic_repo::RepositoryConfig;
use restic_exec::ShellStyle;
use serde_json::{Value, json};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Repository location used by every fake
pub const REPO: &str = "/srv/restic repo";

/// A scripted restic that logs every invocation to `$STATE/calls.log`
pub struct FakeRestic {
    dir: TempDir,
    path: PathBuf,
}

impl FakeRestic {
    /// Write a script; `body` can use `$STATE` for files shared with the test
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restic");
        let script = format!(
            "#!/bin/sh\nSTATE='{}'\necho \"$*\" >> \"$STATE/calls.log\"\n{}\n",
            dir.path().display(),
            body
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, path }
    }

    /// Settings pointing at this script
    pub fn config(&self) -> RepositoryConfig {
        RepositoryConfig::new(REPO)
            .with_password("pw")
            .with_binary(self.path.to_str().unwrap())
            .with_shell(ShellStyle::Posix)
    }

    /// Write a file under `$STATE`
    pub fn write_state(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join(name), contents).unwrap();
    }

    /// Every recorded invocation, arguments joined by spaces
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// The verb of every recorded invocation
    pub fn verbs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| call.split(' ').nth(1).unwrap_or_default().to_string())
            .collect()
    }
}

/// A snapshot object the way `restic snapshots --json` prints it
pub fn snapshot_json(id: &str, tags: &[&str]) -> Value {
    json!({
        "time": "2024-05-01T10:00:00.5+02:00",
        "tree": "b0b0",
        "paths": ["/home/alice"],
        "hostname": "web-1",
        "username": "alice",
        "tags": tags,
        "id": format!("{}{}", id, "0".repeat(64 - id.len())),
        "short_id": id,
    })
}

/// A one-line snapshot list
pub fn snapshot_list(snapshots: &[Value]) -> String {
    format!("{}\n", serde_json::to_string(snapshots).unwrap())
}
