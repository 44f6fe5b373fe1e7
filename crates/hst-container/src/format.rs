//! Binary container format.
//!
//! ```text
//! "HSTC" | version: u32 BE | entry count: u32 BE
//! entry*:
//!   type byte | varint path len | path | varint name len | name
//!   | varint uncompressed len | varint compressed len | crc32: u32 BE
//!   | zstd(bincode(histogram))
//! BLAKE3 of everything above (32 bytes)
//! ```
//!
//! Entries are written parents first, so a reader can rebuild the tree in
//! a single pass. Directory entries carry an empty payload.

use hst_hist::NativeHistogram;
use hst_types::{split_key, KeyPath, ObjectKind};
use tracing::trace;

use crate::dir::{Directory, Node};
use crate::error::{ContainerError, ContainerResult};

pub const MAGIC: &[u8; 4] = b"HSTC";
pub const VERSION: u32 = 1;

const HEADER_LEN: usize = 12;
const CHECKSUM_LEN: usize = 32;

/// Serialize the tree below `root`.
pub fn encode(root: &Directory, compression_level: i32) -> ContainerResult<Vec<u8>> {
    let nodes = root.walk();

    let mut data = Vec::new();
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&VERSION.to_be_bytes());
    data.extend_from_slice(&(nodes.len() as u32).to_be_bytes());

    for (key, node) in &nodes {
        let KeyPath { path, name } = split_key(key);
        let payload = match node {
            Node::Dir(_) => Vec::new(),
            Node::Object(hist) => {
                bincode::serialize(hist).map_err(|e| ContainerError::Serialization(e.to_string()))?
            }
        };
        let compressed = if payload.is_empty() {
            Vec::new()
        } else {
            zstd::encode_all(payload.as_slice(), compression_level)
                .map_err(|e| ContainerError::CompressionFailed(e.to_string()))?
        };

        data.push(node.kind().type_byte());
        encode_varint(&mut data, path.len() as u64);
        data.extend_from_slice(path.as_bytes());
        encode_varint(&mut data, name.len() as u64);
        data.extend_from_slice(name.as_bytes());
        encode_varint(&mut data, payload.len() as u64);
        encode_varint(&mut data, compressed.len() as u64);
        data.extend_from_slice(&crc32fast::hash(&compressed).to_be_bytes());
        data.extend_from_slice(&compressed);

        trace!(key = %key, kind = %node.kind(), bytes = compressed.len(), "encoded entry");
    }

    let checksum = *blake3::hash(&data).as_bytes();
    data.extend_from_slice(&checksum);
    Ok(data)
}

/// BLAKE3 trailer of an encoded container.
pub fn checksum(data: &[u8]) -> Option<[u8; 32]> {
    let start = data.len().checked_sub(CHECKSUM_LEN)?;
    data[start..].try_into().ok()
}

/// Rebuild the tree from an encoded container.
pub fn decode(data: &[u8], verify_checksum: bool) -> ContainerResult<Directory> {
    if data.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(corrupt(0, "container data too short"));
    }
    if &data[0..4] != MAGIC {
        return Err(ContainerError::InvalidMagic {
            expected: String::from_utf8_lossy(MAGIC).into(),
            actual: String::from_utf8_lossy(&data[0..4]).into(),
        });
    }
    let version = read_u32(data, 4)?;
    if version != VERSION {
        return Err(ContainerError::UnsupportedVersion(version));
    }
    let count = read_u32(data, 8)?;

    let body_end = data.len() - CHECKSUM_LEN;
    if verify_checksum && blake3::hash(&data[..body_end]).as_bytes() != &data[body_end..] {
        return Err(ContainerError::ChecksumMismatch);
    }

    let body = &data[..body_end];
    let mut root = Directory::new();
    let mut pos = HEADER_LEN;
    for _ in 0..count {
        pos = decode_entry(body, pos, &mut root)?;
    }
    if pos != body_end {
        return Err(corrupt(pos, "trailing bytes after last entry"));
    }
    Ok(root)
}

fn decode_entry(data: &[u8], start: usize, root: &mut Directory) -> ContainerResult<usize> {
    let mut pos = start;
    let type_byte = *data.get(pos).ok_or_else(|| corrupt(start, "missing entry"))?;
    pos += 1;
    let kind = ObjectKind::from_type_byte(type_byte)
        .ok_or_else(|| corrupt(start, format!("unknown type byte: {type_byte}")))?;

    let path = read_str(data, &mut pos, start)?;
    let name = read_str(data, &mut pos, start)?;
    let uncompressed_size = read_len(data, &mut pos, start)?;
    let compressed_size = read_len(data, &mut pos, start)?;
    let expected_crc = read_u32(data, pos)?;
    pos += 4;

    let end = pos
        .checked_add(compressed_size)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| corrupt(start, "compressed data extends beyond container"))?;
    let compressed = &data[pos..end];

    let key = if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}/{name}")
    };
    if crc32fast::hash(compressed) != expected_crc {
        return Err(ContainerError::CrcMismatch { path: key });
    }

    if !kind.is_histogram() {
        if compressed_size != 0 {
            return Err(corrupt(start, "directory entry with payload"));
        }
        root.mkdirs(&key)?;
        return Ok(end);
    }

    let payload =
        zstd::decode_all(compressed).map_err(|e| ContainerError::DecompressionFailed(e.to_string()))?;
    if payload.len() != uncompressed_size {
        return Err(corrupt(
            start,
            format!(
                "size mismatch: expected {uncompressed_size}, got {}",
                payload.len()
            ),
        ));
    }
    let hist: NativeHistogram =
        bincode::deserialize(&payload).map_err(|e| ContainerError::Serialization(e.to_string()))?;
    if hist.kind() != kind {
        return Err(corrupt(
            start,
            format!("entry typed {kind} holds a {}", hist.kind()),
        ));
    }
    hist.validate()
        .map_err(|e| corrupt(start, format!("{key}: {e}")))?;

    root.mkdirs(path)?.write_object(name, hist)?;
    trace!(key = %key, %kind, "decoded entry");
    Ok(end)
}

fn corrupt(offset: usize, reason: impl Into<String>) -> ContainerError {
    ContainerError::CorruptEntry {
        offset: offset as u64,
        reason: reason.into(),
    }
}

fn read_u32(data: &[u8], pos: usize) -> ContainerResult<u32> {
    data.get(pos..pos + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or_else(|| corrupt(pos, "truncated u32"))
}

fn read_len(data: &[u8], pos: &mut usize, start: usize) -> ContainerResult<usize> {
    let (value, consumed) = decode_varint(&data[*pos..]).map_err(|e| match e {
        ContainerError::CorruptEntry { reason, .. } => corrupt(start, reason),
        other => other,
    })?;
    *pos += consumed;
    usize::try_from(value).map_err(|_| corrupt(start, "length overflows usize"))
}

fn read_str<'a>(data: &'a [u8], pos: &mut usize, start: usize) -> ContainerResult<&'a str> {
    let len = read_len(data, pos, start)?;
    let end = pos
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| corrupt(start, "name extends beyond container"))?;
    let text = std::str::from_utf8(&data[*pos..end])
        .map_err(|_| corrupt(start, "name is not valid UTF-8"))?;
    *pos = end;
    Ok(text)
}

/// Encode a u64 as a variable-length integer.
pub(crate) fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a variable-length integer. Returns (value, bytes_consumed).
pub(crate) fn decode_varint(data: &[u8]) -> ContainerResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        if shift >= 64 {
            return Err(corrupt(0, "varint overflow"));
        }
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(corrupt(0, "truncated varint"))
}
