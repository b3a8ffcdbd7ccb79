use crate::config::Limit;
use crate::error::BodyError;
use bytes::Bytes;
use flate2::read::{GzDecoder, ZlibDecoder};
use http::header::CONTENT_ENCODING;
use http::HeaderMap;
use std::io::Read;

const BROTLI_BUFFER_SIZE: usize = 4096;

/// A request `Content-Encoding` this crate can undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentCoding {
    Identity,
    Gzip,
    Deflate,
    Brotli,
    Zstd,
}

impl ContentCoding {
    pub(crate) fn from_headers(headers: &HeaderMap) -> Result<Self, BodyError> {
        let Some(value) = headers.get(CONTENT_ENCODING) else {
            return Ok(ContentCoding::Identity);
        };

        let value = value.to_str().map_err(|_| BodyError::unsupported_encoding(String::from_utf8_lossy(value.as_bytes())))?;
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => Ok(ContentCoding::Identity),
            "gzip" | "x-gzip" => Ok(ContentCoding::Gzip),
            "deflate" => Ok(ContentCoding::Deflate),
            "br" => Ok(ContentCoding::Brotli),
            "zstd" => Ok(ContentCoding::Zstd),
            other => Err(BodyError::unsupported_encoding(other)),
        }
    }

    #[inline]
    pub(crate) fn is_identity(self) -> bool {
        self == ContentCoding::Identity
    }

    /// Decompresses `bytes`, failing once the output goes over `limit`.
    pub(crate) fn inflate(self, bytes: Bytes, limit: Limit) -> Result<Bytes, BodyError> {
        match self {
            ContentCoding::Identity => Ok(bytes),
            ContentCoding::Gzip => read_capped(GzDecoder::new(&bytes[..]), limit),
            ContentCoding::Deflate => read_capped(ZlibDecoder::new(&bytes[..]), limit),
            ContentCoding::Brotli => read_capped(brotli::Decompressor::new(&bytes[..], BROTLI_BUFFER_SIZE), limit),
            ContentCoding::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(&bytes[..]).map_err(|e| BodyError::malformed("zstd", e))?;
                read_capped(decoder, limit)
            }
        }
    }
}

fn read_capped<R: Read>(reader: R, limit: Limit) -> Result<Bytes, BodyError> {
    let mut out = Vec::new();
    reader
        .take(limit.as_u64().saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| BodyError::malformed("compressed", e))?;

    if limit.is_exceeded_by(out.len() as u64) {
        return Err(BodyError::payload_too_large(limit.as_u64()));
    }
    Ok(Bytes::from(out))
}
