//! Per-direction compression contexts.
//!
//! A connection state owns one context per direction. The null method
//! passes fragments through untouched. Zlib (available behind the
//! `zlib` feature) compresses each fragment as an independent stream;
//! inflation is capped so a hostile peer cannot expand a small record
//! past the plaintext fragment limit.

use crate::error::{Error, Result};
use crate::record::MAX_FRAGMENT_SIZE;
use crate::registry::CompressionMethod;

/// A compressed fragment may exceed the plaintext cap by this much.
pub const MAX_COMPRESSED_SIZE: usize = MAX_FRAGMENT_SIZE + 1024;

/// Compression context for one direction.
#[derive(Debug)]
pub enum CompressionContext {
    /// Identity transform.
    Null,

    /// Per-record zlib streams.
    #[cfg(feature = "zlib")]
    Zlib,
}

impl CompressionContext {
    /// Create a context for a negotiated method.
    pub fn new(method: CompressionMethod) -> Result<Self> {
        match method {
            CompressionMethod::Null => Ok(CompressionContext::Null),
            #[cfg(feature = "zlib")]
            CompressionMethod::Zlib => Ok(CompressionContext::Zlib),
            #[cfg(not(feature = "zlib"))]
            CompressionMethod::Zlib => Err(Error::UnsupportedFeature(
                "zlib compression not built in".into(),
            )),
        }
    }

    /// The method this context implements.
    pub fn method(&self) -> CompressionMethod {
        match self {
            CompressionContext::Null => CompressionMethod::Null,
            #[cfg(feature = "zlib")]
            CompressionContext::Zlib => CompressionMethod::Zlib,
        }
    }

    /// Compress an outgoing fragment.
    pub fn compress(&mut self, fragment: &[u8]) -> Result<Vec<u8>> {
        let out = match self {
            CompressionContext::Null => fragment.to_vec(),
            #[cfg(feature = "zlib")]
            CompressionContext::Zlib => zlib::deflate(fragment)?,
        };
        if out.len() > MAX_COMPRESSED_SIZE {
            return Err(Error::RecordOverflow);
        }
        Ok(out)
    }

    /// Decompress an incoming fragment.
    pub fn decompress(&mut self, fragment: &[u8]) -> Result<Vec<u8>> {
        let out = match self {
            CompressionContext::Null => fragment.to_vec(),
            #[cfg(feature = "zlib")]
            CompressionContext::Zlib => zlib::inflate(fragment)?,
        };
        if out.len() > MAX_FRAGMENT_SIZE {
            return Err(Error::DecompressionFailure);
        }
        Ok(out)
    }
}

#[cfg(feature = "zlib")]
mod zlib {
    use super::{Error, Result, MAX_FRAGMENT_SIZE};
    use std::io::Read;

    pub(super) fn deflate(fragment: &[u8]) -> Result<Vec<u8>> {
        let mut encoder =
            flate2::bufread::ZlibEncoder::new(fragment, flate2::Compression::default());
        let mut out = Vec::new();
        encoder
            .read_to_end(&mut out)
            .map_err(|e| Error::InternalError(format!("deflate failed: {}", e)))?;
        Ok(out)
    }

    pub(super) fn inflate(fragment: &[u8]) -> Result<Vec<u8>> {
        let decoder = flate2::bufread::ZlibDecoder::new(fragment);
        let mut out = Vec::new();
        // Read one byte past the cap so overgrowth is detectable.
        decoder
            .take(MAX_FRAGMENT_SIZE as u64 + 1)
            .read_to_end(&mut out)
            .map_err(|_| Error::DecompressionFailure)?;
        if out.len() > MAX_FRAGMENT_SIZE {
            return Err(Error::DecompressionFailure);
        }
        Ok(out)
    }
}
