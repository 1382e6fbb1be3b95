//! Gzip compression of backup payloads.

use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use std::io::Read;

use ludosafe_common::{Error, Result};

/// Compress a payload with gzip.
///
/// # Errors
/// - Returns [`Error::Io`] if the encoder fails
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(data, Compression::default());
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed)?;
    Ok(compressed)
}

/// Decompress a gzip payload.
///
/// # Errors
/// - Returns [`Error::Decompression`] if the input is not gzip data or is
///   corrupted
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::Decompression(format!("Gzip decompression failed: {}", e)))?;
    Ok(decompressed)
}
