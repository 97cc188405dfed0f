//! Bucket and leaf names used by the on-disk record layout.

/// Namespace bucket holding all scenario records.
pub const BUCKET_SCENARIOS: &[u8] = b"scenarios";

/// Leaf storing the record identifier.
pub const KEY_ID: &[u8] = b"id";
/// Leaf storing the RFC 3339 creation timestamp.
pub const KEY_CREATED_AT: &[u8] = b"created_at";
/// Leaf storing the RFC 3339 last-modification timestamp.
pub const KEY_UPDATED_AT: &[u8] = b"updated_at";

/// Sub-bucket holding the scenario definition.
pub const BUCKET_DEFINITION: &[u8] = b"definition";
/// Sub-bucket holding named object definitions.
pub const BUCKET_OBJECTS: &[u8] = b"objects";
/// Sub-bucket holding the seed stage mapping.
pub const BUCKET_SEED: &[u8] = b"seed";
/// Sub-bucket holding the benchmark stage mapping.
pub const BUCKET_BENCHMARK: &[u8] = b"benchmark";

/// Leaf storing an object's type discriminator.
pub const KEY_TYPE: &[u8] = b"type";
/// Leaf storing an object's source reference.
pub const KEY_REFERENCE: &[u8] = b"reference";
/// Leaf storing an object's chunker setting.
pub const KEY_CHUNKER: &[u8] = b"chunker";
/// Leaf storing an object's layout setting.
pub const KEY_LAYOUT: &[u8] = b"layout";
