//! Raw descriptor encoding
//!
//! A raw descriptor is a file descriptor tree serialized with bincode and
//! wrapped in a gzip stream. The gzip header carries no timestamp or file
//! name, so equal trees always produce equal bytes.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::descriptorpb::FileDescriptorProto;
use crate::error::{DescriptorError, Result};

/// Gzip `data`
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).map_err(DescriptorError::Compress)?;
    encoder.finish().map_err(DescriptorError::Compress)
}

/// Inflate a gzip stream
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut out)
        .map_err(DescriptorError::Decompress)?;
    Ok(out)
}

/// Serialize and compress a file descriptor into raw descriptor bytes
pub fn encode_file(file: &FileDescriptorProto) -> Result<Vec<u8>> {
    let bytes = bincode::serde::encode_to_vec(file, bincode::config::standard())
        .map_err(|e| DescriptorError::Encode(e.to_string()))?;
    compress(&bytes)
}

/// Decompress and decode raw descriptor bytes
///
/// Raw descriptors come from this crate's own derivation or from generated
/// code, so any failure here means the bytes were corrupted.
pub fn decode_file(raw: &[u8]) -> Result<FileDescriptorProto> {
    let bytes = decompress(raw)?;
    let (file, consumed): (FileDescriptorProto, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
            .map_err(|e| DescriptorError::Decode(e.to_string()))?;
    if consumed != bytes.len() {
        return Err(DescriptorError::TrailingBytes {
            consumed,
            len: bytes.len(),
        });
    }
    tracing::debug!(file = file.name(), raw_len = raw.len(), "decoded raw descriptor");
    Ok(file)
}
