//! Binary encoding of a bucket tree into a checksummed record.
//!
//! One record holds one complete tree:
//!
//! ```text
//! magic (4) | version (2) | payload length (4) | payload | crc32 (4)
//! ```
//!
//! The payload encodes a bucket as an entry count followed by its
//! entries in key order; each entry is a length-prefixed key, a tag
//! byte, and either a length-prefixed leaf value or a nested bucket.
//! The CRC covers everything before it, so a torn or corrupted record
//! is detectable without decoding.

use crate::bucket::{Bucket, Entry};
use crate::error::{StoreError, StoreResult};

/// Magic bytes identifying a labdb tree record.
pub(crate) const RECORD_MAGIC: [u8; 4] = *b"LBKT";

/// Current record format version.
pub(crate) const RECORD_VERSION: u16 = 1;

/// Record header size: magic (4) + version (2) + payload length (4).
pub(crate) const HEADER_SIZE: usize = 10;

/// Trailing CRC size.
pub(crate) const CRC_SIZE: usize = 4;

const TAG_VALUE: u8 = 1;
const TAG_BUCKET: u8 = 2;

/// Encodes a tree into a full record (header, payload, CRC).
pub(crate) fn encode_record(root: &Bucket) -> StoreResult<Vec<u8>> {
    let mut payload = Vec::new();
    encode_bucket(root, &mut payload);

    let len = u32::try_from(payload.len())
        .map_err(|_| StoreError::corrupted("tree payload exceeds 4 GiB"))?;

    let mut data = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
    data.extend_from_slice(&RECORD_MAGIC);
    data.extend_from_slice(&RECORD_VERSION.to_le_bytes());
    data.extend_from_slice(&len.to_le_bytes());
    data.extend_from_slice(&payload);

    let crc = compute_crc32(&data);
    data.extend_from_slice(&crc.to_le_bytes());

    Ok(data)
}

/// Decodes a complete record, verifying header and CRC.
pub(crate) fn decode_record(bytes: &[u8]) -> StoreResult<Bucket> {
    if bytes.len() < HEADER_SIZE + CRC_SIZE {
        return Err(StoreError::corrupted("record shorter than header"));
    }

    let payload_len = decode_header(&bytes[..HEADER_SIZE])? as usize;
    let expected = HEADER_SIZE + payload_len + CRC_SIZE;
    if bytes.len() != expected {
        return Err(StoreError::corrupted(format!(
            "record length mismatch: expected {expected} bytes, got {}",
            bytes.len()
        )));
    }

    let body = &bytes[..HEADER_SIZE + payload_len];
    let crc_bytes = &bytes[HEADER_SIZE + payload_len..];
    if !crc_matches(body, crc_bytes) {
        return Err(StoreError::corrupted("record checksum mismatch"));
    }

    decode_payload(&bytes[HEADER_SIZE..HEADER_SIZE + payload_len])
}

/// Parses a record header, returning the payload length.
pub(crate) fn decode_header(header: &[u8]) -> StoreResult<u32> {
    if header.len() != HEADER_SIZE {
        return Err(StoreError::corrupted("truncated record header"));
    }
    if header[..4] != RECORD_MAGIC {
        return Err(StoreError::corrupted("bad record magic"));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != RECORD_VERSION {
        return Err(StoreError::corrupted(format!(
            "unsupported record version {version}"
        )));
    }
    Ok(u32::from_le_bytes([header[6], header[7], header[8], header[9]]))
}

/// Checks the trailing CRC against the record body.
pub(crate) fn crc_matches(body: &[u8], crc_bytes: &[u8]) -> bool {
    if crc_bytes.len() != CRC_SIZE {
        return false;
    }
    let stored = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    compute_crc32(body) == stored
}

/// Decodes a record payload back into a bucket tree.
pub(crate) fn decode_payload(payload: &[u8]) -> StoreResult<Bucket> {
    let mut cursor = Cursor::new(payload);
    let root = decode_bucket(&mut cursor)?;
    if !cursor.is_at_end() {
        return Err(StoreError::corrupted("trailing bytes after tree"));
    }
    Ok(root)
}

fn encode_bucket(bucket: &Bucket, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(bucket.entries().len() as u32).to_le_bytes());
    for (key, entry) in bucket.entries() {
        buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
        buf.extend_from_slice(key);
        match entry {
            Entry::Value(v) => {
                buf.push(TAG_VALUE);
                buf.extend_from_slice(&(v.len() as u32).to_le_bytes());
                buf.extend_from_slice(v);
            }
            Entry::Bucket(b) => {
                buf.push(TAG_BUCKET);
                encode_bucket(b, buf);
            }
        }
    }
}

fn decode_bucket(cursor: &mut Cursor<'_>) -> StoreResult<Bucket> {
    let count = cursor.read_u32()?;
    let mut bucket = Bucket::new();

    for _ in 0..count {
        let key_len = cursor.read_u32()? as usize;
        let key = cursor.read_bytes(key_len)?.to_vec();
        match cursor.read_u8()? {
            TAG_VALUE => {
                let val_len = cursor.read_u32()? as usize;
                let value = cursor.read_bytes(val_len)?.to_vec();
                bucket.put(&key, &value)?;
            }
            TAG_BUCKET => {
                let sub = decode_bucket(cursor)?;
                *bucket.create_bucket(&key)? = sub;
            }
            tag => {
                return Err(StoreError::corrupted(format!("unknown entry tag {tag}")));
            }
        }
    }

    Ok(bucket)
}

/// CRC32 (IEEE polynomial) over `data`.
pub(crate) fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}


/// A bounds-checked reader over a payload slice.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_u8(&mut self) -> StoreResult<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    fn read_u32(&mut self) -> StoreResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_bytes(&mut self, len: usize) -> StoreResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| StoreError::corrupted("tree payload truncated"))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }
}
