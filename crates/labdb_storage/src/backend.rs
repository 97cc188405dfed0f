//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level byte store underneath the labdb commit log.
///
/// A backend is an append-only region of bytes with random reads.
/// The commit log appends one record per transaction, reads them all
/// back on open, and truncates after compaction or when discarding a
/// torn tail.
///
/// # Invariants
///
/// - `append` returns the offset the data was written at
/// - `read_at` returns exactly the bytes previously appended there
/// - after `sync` returns, all appended data survives process death
/// - backends are `Send + Sync`; interior locking keeps reads and
///   appends consistent
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Fails with `ReadPastEnd` if the range extends beyond the
    /// current size, or with `Io` on an underlying I/O failure.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends `data` at the end, returning the offset it was written at.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Forces all appended data down to durable storage.
    ///
    /// For file backends this is an fsync; commit latency is paid here.
    fn sync(&mut self) -> StorageResult<()>;

    /// Discards everything at and after `new_size`.
    ///
    /// Used to drop a torn tail record on open and to reset the log
    /// after compaction.
    ///
    /// # Errors
    ///
    /// Fails with `TruncateBeyondEnd` if `new_size` exceeds the
    /// current size.
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;

    /// Returns the current size in bytes (the next append offset).
    fn size(&self) -> StorageResult<u64>;
}
