//! Block compression for VEC3 data.
//!
//! Compressed blocks are plain gzip members. The container always stores the
//! uncompressed size next to a compressed block, and [`decompress`] refuses
//! any block that does not inflate to exactly that size.

use std::io::{Read, Write};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Largest up-front allocation made for one inflated block.
const MAX_PREALLOC: usize = 1 << 20;

/// Compress data into a gzip member.
///
/// The gzip header carries no timestamp, so equal input gives equal output.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress a gzip member and verify its size.
///
/// # Arguments
/// * `data` - Compressed gzip bytes
/// * `expected_size` - Uncompressed size declared by the container
///
/// Fails with [`Error::CorruptData`] when the inflated length differs from
/// `expected_size`. At most `expected_size + 1` bytes are inflated, so an
/// oversized block reports `actual` as `expected_size + 1`. Memory grows
/// with the inflated bytes, not with the declared size.
pub fn decompress(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data).take((expected_size as u64).saturating_add(1));
    let mut decompressed = Vec::with_capacity(expected_size.min(MAX_PREALLOC));

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::Decompress(e.to_string()))?;

    if decompressed.len() != expected_size {
        return Err(Error::CorruptData {
            expected: expected_size,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}
