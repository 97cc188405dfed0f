//! The store handle and its transactions.

use crate::bucket::Bucket;
use crate::config::Config;
use crate::dir::StoreDir;
use crate::error::{StoreError, StoreResult};
use crate::log::CommitLog;
use crate::snapshot;
use labdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// The embedded bucket store.
///
/// A `Store` is opened once, shared by reference, and closed
/// explicitly. All access goes through [`Store::view`] and
/// [`Store::update`]; no transaction handle outlives its closure.
///
/// # Concurrency
///
/// Exactly one write transaction runs at a time; readers take an
/// immutable snapshot of the committed tree and are never blocked by
/// the writer. A commit is durable (synced to the commit log) before
/// it becomes visible to new snapshots.
pub struct Store {
    config: Config,
    /// Store directory holding the lock. `None` for in-memory stores.
    dir: Option<StoreDir>,
    log: Mutex<CommitLog>,
    /// The committed tree. Snapshots clone the `Arc`.
    root: RwLock<Arc<Bucket>>,
    /// Serializes writers.
    write_lock: Mutex<()>,
    is_open: RwLock<bool>,
}

impl Store {
    /// Opens a store at `path` with default configuration.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Locked`] if another process holds the
    /// store, or [`StoreError::Corrupted`] if the on-disk data is not
    /// a valid store.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a store at `path` with the given configuration.
    pub fn open_with_config(path: &Path, config: Config) -> StoreResult<Self> {
        let dir = StoreDir::open(path, config.create_if_missing)?;

        if !config.create_if_missing && dir.is_new_store() {
            return Err(StoreError::invalid_format(
                "store does not exist and create_if_missing is false",
            ));
        }
        if config.error_if_exists && !dir.is_new_store() {
            return Err(StoreError::invalid_format(
                "store already exists and error_if_exists is true",
            ));
        }

        let base = match dir.load_snapshot()? {
            Some(bytes) => Some(snapshot::decode_record(&bytes)?),
            None => None,
        };

        let backend = FileBackend::open(&dir.log_path())?;
        let mut log = CommitLog::new(Box::new(backend));
        let recovered = log.recover()?;

        // The log holds everything committed since the last
        // compaction; when it is empty the base snapshot stands.
        let root = recovered.or(base).unwrap_or_default();

        debug!(path = %dir.path().display(), "store opened");

        Ok(Self {
            config,
            dir: Some(dir),
            log: Mutex::new(log),
            root: RwLock::new(Arc::new(root)),
            write_lock: Mutex::new(()),
            is_open: RwLock::new(true),
        })
    }

    /// Opens a store over a pre-configured backend, without a
    /// directory or lock file.
    ///
    /// Lower-level constructor used by tests and in-memory stores.
    pub fn open_with_backend(
        config: Config,
        backend: Box<dyn StorageBackend>,
    ) -> StoreResult<Self> {
        let mut log = CommitLog::new(backend);
        let root = log.recover()?.unwrap_or_default();

        Ok(Self {
            config,
            dir: None,
            log: Mutex::new(log),
            root: RwLock::new(Arc::new(root)),
            write_lock: Mutex::new(()),
            is_open: RwLock::new(true),
        })
    }

    /// Opens a fresh non-persistent store for tests and ephemeral use.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open_with_backend(Config::default(), Box::new(InMemoryBackend::new()))
    }

    /// Runs `f` against a read-only snapshot of the committed tree.
    ///
    /// The snapshot is taken at call time; commits made while `f`
    /// runs are not visible to it.
    pub fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&ReadTransaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.ensure_open().map_err(E::from)?;
        let snapshot = Arc::clone(&self.root.read());
        let tx = ReadTransaction { root: snapshot };
        f(&tx)
    }

    /// Runs `f` against a writable copy of the tree.
    ///
    /// If `f` returns `Ok`, the new tree is committed: appended to the
    /// commit log, synced, and published. If `f` returns `Err`, or
    /// the commit itself fails, the store is left exactly as before.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut WriteTransaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.ensure_open().map_err(E::from)?;
        let _guard = self.write_lock.lock();
        // The store may have been closed between the check above and
        // taking the writer lock; nothing may commit after close.
        self.ensure_open().map_err(E::from)?;

        let working_copy = {
            let root = self.root.read();
            (**root).clone()
        };
        let mut tx = WriteTransaction { root: working_copy };
        let out = f(&mut tx)?;
        self.commit(tx.root).map_err(E::from)?;
        Ok(out)
    }

    /// Appends the new tree to the log, then publishes it.
    ///
    /// Caller holds the write lock.
    fn commit(&self, new_root: Bucket) -> StoreResult<()> {
        {
            let mut log = self.log.lock();
            log.append_commit(&new_root, self.config.sync_on_commit)?;

            if let Some(dir) = &self.dir {
                if log.size()? > self.config.max_log_size {
                    // The commit is already durable; a failed
                    // compaction only leaves a longer log.
                    if let Err(err) = Self::fold_into_snapshot(dir, &mut log, &new_root) {
                        warn!(error = %err, "compaction after commit failed");
                    }
                }
            }
        }

        *self.root.write() = Arc::new(new_root);
        Ok(())
    }

    /// Folds the committed tree into the base snapshot and empties the
    /// commit log.
    ///
    /// The snapshot is replaced atomically before the log is
    /// truncated, so a crash between the two steps leaves both copies
    /// holding the same tree.
    pub fn compact(&self) -> StoreResult<()> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock();
        self.ensure_open()?;
        let root = Arc::clone(&self.root.read());
        let mut log = self.log.lock();

        match &self.dir {
            Some(dir) => Self::fold_into_snapshot(dir, &mut log, &root)?,
            None => {
                // No snapshot file to fold into; rewrite the log as a
                // single record instead.
                log.reset()?;
                log.append_commit(&root, self.config.sync_on_commit)?;
            }
        }

        debug!("store compacted");
        Ok(())
    }

    fn fold_into_snapshot(
        dir: &StoreDir,
        log: &mut CommitLog,
        root: &Bucket,
    ) -> StoreResult<()> {
        let record = snapshot::encode_record(root)?;
        dir.save_snapshot(&record)?;
        log.reset()?;
        Ok(())
    }

    /// Returns the current size of the commit log in bytes.
    pub fn log_size(&self) -> StoreResult<u64> {
        self.ensure_open()?;
        self.log.lock().size()
    }

    /// Returns the size of the base snapshot file in bytes.
    ///
    /// Zero when no snapshot has been written yet; in-memory stores
    /// always report zero.
    pub fn snapshot_size(&self) -> StoreResult<u64> {
        self.ensure_open()?;
        match &self.dir {
            Some(dir) => {
                let path = dir.snapshot_path();
                if path.exists() {
                    Ok(std::fs::metadata(path)?.len())
                } else {
                    Ok(0)
                }
            }
            None => Ok(0),
        }
    }

    /// Closes the store, folding the final state into the snapshot.
    ///
    /// Further `view`/`update` calls fail with [`StoreError::Closed`].
    /// Closing an already-closed store is a no-op.
    pub fn close(&self) -> StoreResult<()> {
        // Writer lock first, then the open flag: every writer takes
        // these in the same order, so an in-flight update either
        // commits before the fold below or fails `Closed` afterwards.
        let _guard = self.write_lock.lock();
        let mut is_open = self.is_open.write();
        if !*is_open {
            return Ok(());
        }

        if let Some(dir) = &self.dir {
            let root = Arc::clone(&self.root.read());
            let mut log = self.log.lock();
            Self::fold_into_snapshot(dir, &mut log, &root)?;
        }

        *is_open = false;
        debug!("store closed");
        Ok(())
    }

    /// Returns true if the store is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.is_open.read()
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if *self.is_open.read() {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    /// Drops the store as if the process had died: nothing is flushed
    /// or folded, but the directory lock is released so the same
    /// process can reopen and exercise recovery.
    #[cfg(test)]
    pub(crate) fn simulate_crash(mut self) {
        *self.is_open.write() = false;
        self.dir = None;
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("is_open", &self.is_open())
            .field("persistent", &self.dir.is_some())
            .finish_non_exhaustive()
    }
}

/// A read-only snapshot of the committed tree.
///
/// Holds an immutable point-in-time view; it never observes commits
/// made after it was taken.
pub struct ReadTransaction {
    root: Arc<Bucket>,
}

impl ReadTransaction {
    /// Returns the root bucket of the snapshot.
    #[must_use]
    pub fn root(&self) -> &Bucket {
        &self.root
    }

    /// Returns the top-level bucket named `name`, if present.
    #[must_use]
    pub fn bucket(&self, name: &[u8]) -> Option<&Bucket> {
        self.root.bucket(name)
    }
}

/// A writable copy of the tree, private to one `update` call.
///
/// Mutations become visible only when the closure returns `Ok` and
/// the commit succeeds; otherwise the copy is discarded.
pub struct WriteTransaction {
    root: Bucket,
}

impl WriteTransaction {
    /// Returns the root bucket.
    #[must_use]
    pub fn root(&self) -> &Bucket {
        &self.root
    }

    /// Returns the root bucket mutably.
    pub fn root_mut(&mut self) -> &mut Bucket {
        &mut self.root
    }

    /// Returns the top-level bucket named `name`, if present.
    #[must_use]
    pub fn bucket(&self, name: &[u8]) -> Option<&Bucket> {
        self.root.bucket(name)
    }

    /// Returns the top-level bucket named `name` mutably, if present.
    pub fn bucket_mut(&mut self, name: &[u8]) -> Option<&mut Bucket> {
        self.root.bucket_mut(name)
    }

    /// Creates a top-level bucket named `name`.
    ///
    /// # Errors
    ///
    /// Fails with `BucketExists` if the bucket is already present.
    pub fn create_bucket(&mut self, name: &[u8]) -> StoreResult<&mut Bucket> {
        self.root.create_bucket(name)
    }

    /// Creates a top-level bucket named `name`, or returns the
    /// existing one.
    pub fn create_bucket_if_not_exists(&mut self, name: &[u8]) -> StoreResult<&mut Bucket> {
        self.root.create_bucket_if_not_exists(name)
    }

    /// Removes the top-level bucket named `name` and everything under
    /// it.
    ///
    /// # Errors
    ///
    /// Fails with `BucketNotFound` if no such bucket exists.
    pub fn delete_bucket(&mut self, name: &[u8]) -> StoreResult<()> {
        self.root.delete_bucket(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn put_widget(store: &Store, key: &[u8], value: &[u8]) {
        store
            .update(|tx| {
                tx.create_bucket_if_not_exists(b"widgets")?.put(key, value)?;
                Ok::<_, StoreError>(())
            })
            .unwrap();
    }

    fn get_widget(store: &Store, key: &[u8]) -> Option<Vec<u8>> {
        store
            .view(|tx| {
                Ok::<_, StoreError>(
                    tx.bucket(b"widgets")
                        .and_then(|b| b.get(key))
                        .map(<[u8]>::to_vec),
                )
            })
            .unwrap()
    }

    #[test]
    fn open_in_memory() {
        let store = create_store();
        assert!(store.is_open());
    }

    #[test]
    fn update_then_view() {
        let store = create_store();
        put_widget(&store, b"w1", b"blue");
        assert_eq!(get_widget(&store, b"w1"), Some(b"blue".to_vec()));
        assert_eq!(get_widget(&store, b"w2"), None);
    }

    #[test]
    fn failed_update_rolls_back() {
        let store = create_store();
        put_widget(&store, b"w1", b"blue");

        let result: Result<(), StoreError> = store.update(|tx| {
            tx.create_bucket_if_not_exists(b"widgets")?
                .put(b"w1", b"red")?;
            tx.create_bucket_if_not_exists(b"widgets")?
                .put(b"w2", b"green")?;
            Err(StoreError::KeyRequired)
        });
        assert!(result.is_err());

        // Neither mutation survived.
        assert_eq!(get_widget(&store, b"w1"), Some(b"blue".to_vec()));
        assert_eq!(get_widget(&store, b"w2"), None);
    }

    #[test]
    fn view_snapshot_is_isolated_from_commits() {
        let store = create_store();
        put_widget(&store, b"w1", b"before");

        store
            .view(|tx| {
                // Commit while the snapshot is held.
                put_widget(&store, b"w1", b"after");

                let seen = tx.bucket(b"widgets").unwrap().get(b"w1");
                assert_eq!(seen, Some(&b"before"[..]));
                Ok::<_, StoreError>(())
            })
            .unwrap();

        assert_eq!(get_widget(&store, b"w1"), Some(b"after".to_vec()));
    }

    #[test]
    fn closed_store_rejects_operations() {
        let store = create_store();
        store.close().unwrap();
        assert!(!store.is_open());

        let result: Result<(), StoreError> = store.view(|_| Ok(()));
        assert!(matches!(result, Err(StoreError::Closed)));

        let result: Result<(), StoreError> = store.update(|_| Ok(()));
        assert!(matches!(result, Err(StoreError::Closed)));

        // Idempotent.
        store.close().unwrap();
    }

    #[test]
    fn compact_in_memory_keeps_contents() {
        let store = create_store();
        put_widget(&store, b"w1", b"blue");
        put_widget(&store, b"w2", b"green");

        let before = store.log_size().unwrap();
        store.compact().unwrap();
        assert!(store.log_size().unwrap() < before);
        // No snapshot file without a directory.
        assert_eq!(store.snapshot_size().unwrap(), 0);

        assert_eq!(get_widget(&store, b"w1"), Some(b"blue".to_vec()));
        assert_eq!(get_widget(&store, b"w2"), Some(b"green".to_vec()));
    }
}
