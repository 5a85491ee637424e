use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Pid file held for the lifetime of the consumer.
///
/// Removed on drop, but only while it still names this process; a file
/// rewritten by a later instance is left alone.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    pid: u32,
}

impl PidFile {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let pid = std::process::id();

        if let Some(previous) = read_pid(&path) {
            if previous != pid {
                warn!(pid_file = %path.display(), previous, "replacing pid file left by another process");
            }
        }

        fs::write(&path, format!("{pid}\n"))
            .with_context(|| format!("failed to write pid file {}", path.display()))?;

        Ok(Self { path, pid })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if read_pid(&self.path) != Some(self.pid) {
            debug!(pid_file = %self.path.display(), "pid file no longer ours; leaving it");
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(pid_file = %self.path.display(), error = %e, "failed to remove pid file");
        }
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
