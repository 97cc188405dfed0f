//! Timestamp leaves shared by every record kind.
//!
//! Timestamps are stored as RFC 3339 text with nanosecond precision in
//! UTC, so the stored bytes sort chronologically and survive a decode
//! round trip without losing precision.

use chrono::{DateTime, SecondsFormat, Utc};
use labdb_store::Bucket;

use crate::error::{MetadataError, MetadataResult};
use crate::keys::{KEY_CREATED_AT, KEY_UPDATED_AT};

/// Writes both timestamp leaves into a record bucket.
pub fn write_timestamps(
    bucket: &mut Bucket,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> MetadataResult<()> {
    bucket.put(KEY_CREATED_AT, encode(created_at).as_bytes())?;
    bucket.put(KEY_UPDATED_AT, encode(updated_at).as_bytes())?;
    Ok(())
}

/// Reads `(created_at, updated_at)` from a record bucket.
pub fn read_timestamps(bucket: &Bucket) -> MetadataResult<(DateTime<Utc>, DateTime<Utc>)> {
    let created_at = read_leaf(bucket, KEY_CREATED_AT, "created_at")?;
    let updated_at = read_leaf(bucket, KEY_UPDATED_AT, "updated_at")?;
    Ok((created_at, updated_at))
}

fn read_leaf(bucket: &Bucket, key: &[u8], label: &str) -> MetadataResult<DateTime<Utc>> {
    let raw = bucket
        .get(key)
        .ok_or_else(|| MetadataError::corrupt(format!("missing {label} timestamp")))?;
    let text = std::str::from_utf8(raw)
        .map_err(|_| MetadataError::corrupt(format!("{label} timestamp is not UTF-8")))?;
    decode(text).ok_or_else(|| MetadataError::corrupt(format!("unparseable {label} timestamp {text:?}")))
}

fn encode(when: DateTime<Utc>) -> String {
    when.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|when| when.with_timezone(&Utc))
}
