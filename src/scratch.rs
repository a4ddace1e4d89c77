use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

/// Scratch location shared by every tool call of this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchPaths {
    pub dir: PathBuf,
}

impl ScratchPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    /// Path for a named scratch file. Files are created by whoever writes them.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Per-process scratch directory. Removed on [`ScratchSpace::cleanup`] or drop.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
    paths: ScratchPaths,
}

impl ScratchSpace {
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("target-mcp-").tempdir()?;
        let paths = ScratchPaths::in_dir(dir.path());
        debug!(dir = %dir.path().display(), "scratch space created");
        Ok(Self { dir, paths })
    }

    pub fn paths(&self) -> &ScratchPaths {
        &self.paths
    }

    /// Best-effort removal; failures are logged and swallowed.
    pub fn cleanup(self) {
        let dir = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(dir = %dir.display(), "scratch space removed"),
            Err(e) => debug!(dir = %dir.display(), error = %e, "scratch cleanup failed"),
        }
    }
}
