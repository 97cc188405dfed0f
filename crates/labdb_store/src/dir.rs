//! Store directory management.
//!
//! On-disk layout:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK           # advisory lock, one process at a time
//! ├─ SNAPSHOT       # base tree record, replaced atomically
//! └─ commits.log    # one record appended per committed transaction
//! ```

use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const SNAPSHOT_FILE: &str = "SNAPSHOT";
const SNAPSHOT_TEMP: &str = "SNAPSHOT.tmp";
const LOG_FILE: &str = "commits.log";

/// Holds the store directory and its exclusive lock.
///
/// Only one `StoreDir` can exist per directory at a time; a second
/// open fails with [`StoreError::Locked`].
#[derive(Debug)]
pub(crate) struct StoreDir {
    path: PathBuf,
    _lock_file: File,
}

impl StoreDir {
    /// Opens or creates a store directory and takes its lock.
    pub(crate) fn open(path: &Path, create_if_missing: bool) -> StoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StoreError::invalid_format(format!(
                    "store directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(StoreError::invalid_format(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE)
    }

    pub(crate) fn snapshot_path(&self) -> PathBuf {
        self.path.join(SNAPSHOT_FILE)
    }

    /// Returns true if neither snapshot nor log exists yet.
    pub(crate) fn is_new_store(&self) -> bool {
        !self.snapshot_path().exists() && !self.log_path().exists()
    }

    /// Reads the base snapshot record, if one exists.
    pub(crate) fn load_snapshot(&self) -> StoreResult<Option<Vec<u8>>> {
        let snapshot_path = self.snapshot_path();
        if !snapshot_path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&snapshot_path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(data))
    }

    /// Replaces the base snapshot atomically.
    ///
    /// Write-then-rename: the record goes to a temp file, is synced,
    /// renamed over SNAPSHOT, and the directory is synced so the
    /// rename itself is durable.
    pub(crate) fn save_snapshot(&self, record: &[u8]) -> StoreResult<()> {
        let temp_path = self.path.join(SNAPSHOT_TEMP);

        let mut file = File::create(&temp_path)?;
        file.write_all(record)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, self.snapshot_path())?;
        self.sync_directory()?;

        Ok(())
    }

    fn sync_directory(&self) -> StoreResult<()> {
        // Windows cannot open directories for sync; rename durability
        // is handled by the OS there.
        #[cfg(unix)]
        {
            let dir = File::open(&self.path)?;
            dir.sync_all()?;
        }
        Ok(())
    }
}
