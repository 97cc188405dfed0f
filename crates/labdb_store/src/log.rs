//! The commit log.
//!
//! Every committed transaction appends one complete tree record to the
//! log. Recovery scans the log front to back and keeps the last record
//! that is fully present and passes its checksum; anything after it is
//! a torn tail from an interrupted write and is truncated away.

use crate::bucket::Bucket;
use crate::error::{StoreError, StoreResult};
use crate::snapshot::{self, CRC_SIZE, HEADER_SIZE};
use labdb_storage::StorageBackend;
use tracing::{debug, warn};

/// Append-only log of committed tree records over a storage backend.
pub(crate) struct CommitLog {
    backend: Box<dyn StorageBackend>,
}

impl CommitLog {
    pub(crate) fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Scans the log and returns the last intact tree, if any.
    ///
    /// A torn or checksum-failing tail is truncated off so later
    /// appends continue from the last good record. A log whose very
    /// first bytes are not a record header is rejected as corrupted
    /// rather than silently emptied.
    pub(crate) fn recover(&mut self) -> StoreResult<Option<Bucket>> {
        let size = self.backend.size()?;
        let mut offset = 0u64;
        let mut last_good: Option<(u64, Bucket)> = None;

        while offset < size {
            match self.read_record_at(offset, size) {
                Ok((next, tree)) => {
                    last_good = Some((next, tree));
                    offset = next;
                }
                Err(err) => {
                    // The head of the log must be valid; a bad tail is
                    // an interrupted commit.
                    if offset == 0 {
                        return Err(err);
                    }
                    warn!(
                        offset,
                        error = %err,
                        "discarding torn commit log tail"
                    );
                    break;
                }
            }
        }

        let good_end = last_good.as_ref().map_or(0, |(end, _)| *end);
        if good_end < size {
            self.backend.truncate(good_end)?;
        }

        debug!(
            size = good_end,
            recovered = last_good.is_some(),
            "commit log recovered"
        );
        Ok(last_good.map(|(_, tree)| tree))
    }

    /// Reads one record at `offset`, returning the offset just past it.
    fn read_record_at(&self, offset: u64, size: u64) -> StoreResult<(u64, Bucket)> {
        if offset + (HEADER_SIZE as u64) > size {
            return Err(StoreError::corrupted("truncated record header"));
        }
        let header = self.backend.read_at(offset, HEADER_SIZE)?;
        let payload_len = snapshot::decode_header(&header)? as u64;

        let total = HEADER_SIZE as u64 + payload_len + CRC_SIZE as u64;
        if offset + total > size {
            return Err(StoreError::corrupted("truncated record body"));
        }

        let record = self.backend.read_at(offset, total as usize)?;
        let tree = snapshot::decode_record(&record)?;
        Ok((offset + total, tree))
    }

    /// Appends one committed tree to the log.
    ///
    /// With `sync` set, the record is durable before this returns.
    pub(crate) fn append_commit(&mut self, root: &Bucket, sync: bool) -> StoreResult<()> {
        let record = snapshot::encode_record(root)?;
        self.backend.append(&record)?;
        if sync {
            self.backend.sync()?;
        }
        debug!(bytes = record.len(), "commit appended");
        Ok(())
    }

    /// Empties the log. Used after the tree has been folded into the
    /// base snapshot.
    pub(crate) fn reset(&mut self) -> StoreResult<()> {
        self.backend.truncate(0)?;
        Ok(())
    }

    pub(crate) fn size(&self) -> StoreResult<u64> {
        Ok(self.backend.size()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdb_storage::InMemoryBackend;

    fn tree_with(key: &[u8], value: &[u8]) -> Bucket {
        let mut root = Bucket::new();
        root.create_bucket(b"data").unwrap().put(key, value).unwrap();
        root
    }

    #[test]
    fn empty_log_recovers_to_none() {
        let mut log = CommitLog::new(Box::new(InMemoryBackend::new()));
        assert!(log.recover().unwrap().is_none());
    }

    #[test]
    fn last_commit_wins() {
        let mut log = CommitLog::new(Box::new(InMemoryBackend::new()));
        log.append_commit(&tree_with(b"k", b"one"), true).unwrap();
        log.append_commit(&tree_with(b"k", b"two"), true).unwrap();

        let tree = log.recover().unwrap().unwrap();
        assert_eq!(tree.bucket(b"data").unwrap().get(b"k"), Some(&b"two"[..]));
    }

    #[test]
    fn torn_tail_is_discarded() {
        let mut backend = InMemoryBackend::new();
        let record = snapshot_bytes(&tree_with(b"k", b"good"));
        backend.append(&record).unwrap();
        // An interrupted commit leaves a partial record at the tail.
        let torn = snapshot_bytes(&tree_with(b"k", b"lost"));
        backend.append(&torn[..torn.len() - 5]).unwrap();

        let mut log = CommitLog::new(Box::new(backend));
        let tree = log.recover().unwrap().unwrap();
        assert_eq!(tree.bucket(b"data").unwrap().get(b"k"), Some(&b"good"[..]));

        // The tail is gone; a fresh append then recovers cleanly.
        log.append_commit(&tree_with(b"k", b"next"), true).unwrap();
        let tree = log.recover().unwrap().unwrap();
        assert_eq!(tree.bucket(b"data").unwrap().get(b"k"), Some(&b"next"[..]));
    }

    #[test]
    fn garbage_head_is_rejected() {
        let backend = InMemoryBackend::with_data(b"this is not a commit log".to_vec());
        let mut log = CommitLog::new(Box::new(backend));
        assert!(matches!(
            log.recover(),
            Err(StoreError::Corrupted { .. })
        ));
    }

    #[test]
    fn reset_empties_log() {
        let mut log = CommitLog::new(Box::new(InMemoryBackend::new()));
        log.append_commit(&tree_with(b"k", b"v"), true).unwrap();
        log.reset().unwrap();
        assert_eq!(log.size().unwrap(), 0);
        assert!(log.recover().unwrap().is_none());
    }

    fn snapshot_bytes(tree: &Bucket) -> Vec<u8> {
        crate::snapshot::encode_record(tree).unwrap()
    }
}
