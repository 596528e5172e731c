//! One dita-worker per cache root.
//!
//! The lock file sits beside the caches it guards and holds the port of the
//! worker that owns it, so a second worker can say where the first one is.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fs2::FileExt;
use tracing::debug;

const LOCK_FILE: &str = ".worker.lock";

/// Exclusive ownership of a cache root. Released on drop.
pub struct WorkerLock {
    _file: File,
    path: PathBuf,
}

impl WorkerLock {
    pub fn acquire(cache_root: &Path, port: u16) -> Result<Self> {
        fs::create_dir_all(cache_root)
            .with_context(|| format!("Failed to create {}", cache_root.display()))?;
        let path = cache_root.join(LOCK_FILE);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .context("Failed to open worker lock file")?;

        if file.try_lock_exclusive().is_err() {
            match holder_port(&mut file) {
                Some(holder) => bail!(
                    "dita-worker is already running on port {holder} (lock: {})",
                    path.display()
                ),
                None => bail!(
                    "Another dita-worker holds {}. Remove it if no worker is running.",
                    path.display()
                ),
            }
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        write!(file, "{port}")?;
        file.flush()?;
        debug!(lock = %path.display(), port, "worker lock acquired");

        Ok(WorkerLock { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn holder_port(file: &mut File) -> Option<u16> {
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}
