//! Per-task private directory mounted into sandbox containers at `/app`.
//!
//! Backed by `tempfile::TempDir`, so the directory is removed on every exit
//! path (normal return, early `?`, or panic) via `Drop` — the idiomatic
//! equivalent of the original `defer os.RemoveAll(tmpDir)`.

use std::path::{Path, PathBuf};

use anyhow::Context;

pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("rc_paste_")
            .tempdir()
            .context("allocate sandbox workspace directory")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Basename used to derive unique container names per task/phase.
    pub fn basename(&self) -> String {
        self.dir
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "rc_paste".to_string())
    }

    fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> anyhow::Result<()> {
        std::fs::write(self.join(name), contents)
            .with_context(|| format!("write workspace file {name}"))
    }

    /// Missing file reads as empty string, per the spec's "missing file ->
    /// empty string" rule for stdout/stderr/compile log.
    pub fn read_file_or_empty(&self, name: &str) -> String {
        std::fs::read_to_string(self.join(name)).unwrap_or_default()
    }

    pub fn read_file_bytes(&self, name: &str) -> Option<Vec<u8>> {
        std::fs::read(self.join(name)).ok()
    }
}
