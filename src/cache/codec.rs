//! Payload Codec Module
//!
//! Optional compression applied to serialized entries before they are written.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{CacheError, Result};

// == Codec ==
/// Reversible string-to-string transform applied to stored payloads.
pub trait Codec: Send + Sync {
    fn compress(&self, input: &str) -> Result<String>;
    fn decompress(&self, input: &str) -> Result<String>;
}

// == LZ4 Codec ==
/// LZ4 block compression, base64-wrapped so the payload stays a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn compress(&self, input: &str) -> Result<String> {
        let packed = lz4::block::compress(input.as_bytes(), None, true)
            .map_err(|e| CacheError::Codec(format!("LZ4 compression error: {}", e)))?;
        Ok(BASE64.encode(packed))
    }

    fn decompress(&self, input: &str) -> Result<String> {
        let packed = BASE64
            .decode(input)
            .map_err(|e| CacheError::Codec(format!("invalid base64 payload: {}", e)))?;
        let bytes = lz4::block::decompress(&packed, None)
            .map_err(|e| CacheError::Codec(format!("LZ4 decompression error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| CacheError::Codec(e.to_string()))
    }
}
