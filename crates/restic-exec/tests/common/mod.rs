//! Common test utilities

use restic_exec::{Runner, ShellStyle};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// A stand-in restic binary backed by a shell script
pub struct FakeRestic {
    _dir: TempDir,
    path: PathBuf,
}

impl FakeRestic {
    /// Write a script whose body runs in place of restic
    pub fn new(body: &str) -> Self {
        Self::in_dir_named("restic", body)
    }

    /// Like [`FakeRestic::new`], but the binary lives in a directory whose
    /// name needs escaping
    pub fn in_dir_named(name: &str, body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join(name);
        std::fs::create_dir_all(&bin_dir).unwrap();
        let path = bin_dir.join("restic");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { _dir: dir, path }
    }

    /// A runner pointed at this script
    pub fn runner(&self) -> Runner {
        Runner::new(self.path.to_str().unwrap()).with_style(ShellStyle::Posix)
    }

    /// Path of the script
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}
