//! Crash-safe publication of cache files and directories.
//!
//! Everything is first written to a hidden sibling of its final path and then
//! renamed into place, so a reader either sees a complete entry or none at all.
//! An interrupted process can leave `.<name>.staging.*` directories behind;
//! they are never read and [`sweep_stale_staging`] removes them.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::{Builder, NamedTempFile, TempDir};
use tracing::{debug, warn};

use crate::error::{Result, TopicError};

fn parent_of(path: &Path) -> Result<&Path> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| TopicError::InvalidInput(format!("{} has no parent directory", path.display())))
}

fn hidden_prefix(path: &Path, kind: &str) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("entry");
    format!(".{name}.{kind}.")
}

/// Atomically write a single file.
///
/// `write` receives a temporary file in the same directory; it is synced and
/// renamed over `path` only when `write` succeeds.
pub fn write_file_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let parent = parent_of(path)?;
    fs::create_dir_all(parent)?;
    let mut tmp: NamedTempFile = Builder::new()
        .prefix(&hidden_prefix(path, "tmp"))
        .tempfile_in(parent)?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| TopicError::Io(e.error))?;
    Ok(())
}

/// A directory that becomes visible at `target` only once it is complete.
/// Dropping it without [`StagingDir::publish`] removes everything written so far.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
    target: PathBuf,
}

/// Outcome of [`StagingDir::publish`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    /// this writer's content is now at the target
    Renamed,
    /// another writer published the target first; this content was discarded
    LostRace,
}

impl StagingDir {
    /// Create a staging directory next to `target`, creating the parent if needed.
    pub fn new(target: &Path) -> Result<Self> {
        let parent = parent_of(target)?;
        fs::create_dir_all(parent)?;
        let dir = Builder::new()
            .prefix(&hidden_prefix(target, "staging"))
            .tempdir_in(parent)?;
        debug!(staging = %dir.path().display(), target = %target.display(), "staging directory created");
        Ok(Self { dir, target: target.to_path_buf() })
    }

    /// Where artifacts should be written
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Rename the staging directory to its target.
    pub fn publish(self) -> Result<Published> {
        match fs::rename(self.dir.path(), &self.target) {
            // the TempDir guard now points at a missing path; its cleanup is a no-op
            Ok(()) => Ok(Published::Renamed),
            Err(_) if self.target.is_dir() => Ok(Published::LostRace),
            Err(e) => Err(e.into()),
        }
    }
}

/// Remove staging directories of `target` left by writers that died before
/// publishing. Only directories untouched for at least `older_than` are
/// removed, so a concurrent writer keeps its own.
///
/// Returns the number of directories removed.
pub fn sweep_stale_staging(target: &Path, older_than: Duration) -> Result<usize> {
    let parent = parent_of(target)?;
    if !parent.is_dir() {
        return Ok(0);
    }
    let prefix = hidden_prefix(target, "staging");
    let mut removed = 0;
    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        let stale_name = entry.file_name().to_str().is_some_and(|n| n.starts_with(&prefix));
        if !stale_name || !entry.file_type()?.is_dir() {
            continue;
        }
        let age = entry
            .metadata()?
            .modified()?
            .elapsed()
            .unwrap_or(Duration::ZERO);
        if age < older_than {
            continue;
        }
        match fs::remove_dir_all(entry.path()) {
            Ok(()) => {
                warn!(path = %entry.path().display(), "removed abandoned staging directory");
                removed += 1;
            }
            Err(e) => warn!(path = %entry.path().display(), error = %e, "cannot remove abandoned staging directory"),
        }
    }
    Ok(removed)
}
