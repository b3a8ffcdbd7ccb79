//! Buffered decoders for the json, xml, urlencoded and text paths.
//!
//! Every decoder reads the body up to its size limit, inflates it according to
//! `Content-Encoding`, turns the bytes into text with the configured charset and then parses
//! that text. The text is kept as the raw body when requested.

mod form;
mod inflate;
mod json;
mod limited;
mod text;

pub(crate) use form::decode_form;
pub(crate) use json::decode_json;
pub(crate) use text::decode_text;

use inflate::ContentCoding;
use limited::read_limited;

use crate::body::ReqBody;
use crate::config::{Encoding, Limit};
use crate::content_type::content_length;
use crate::error::BodyError;
use http::HeaderMap;

/// Per-path options for the buffered decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DecodeOptions {
    pub(crate) limit: Limit,
    pub(crate) encoding: Encoding,
    pub(crate) include_raw: bool,
}

/// Reads, inflates and charset-decodes a body into text.
pub(crate) async fn read_text(headers: &HeaderMap, body: ReqBody, options: DecodeOptions) -> Result<String, BodyError> {
    let coding = ContentCoding::from_headers(headers)?;
    // a declared length only describes the bytes on the wire when nothing was compressed
    let declared = if coding.is_identity() { content_length(headers) } else { None };

    let bytes = read_limited(body, options.limit, declared).await?;
    let bytes = coding.inflate(bytes, options.limit)?;
    Ok(options.encoding.decode(&bytes))
}


#[cfg(test)]
mod tests {
    use super::read_text;
    use super::test_util::{body, headers, options};
    use crate::config::{Encoding, Limit};
    use crate::error::BodyError;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[tokio::test]
    async fn read_plain_text() {
        let text = read_text(&headers(Some(5), None), body("hello"), options(Limit::kb(1))).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn read_gzip_text() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all("compressed hello".as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        // content length counts the compressed bytes
        let headers = headers(Some(compressed.len()), Some("gzip"));
        let text = read_text(&headers, body(compressed), options(Limit::kb(1))).await.unwrap();
        assert_eq!(text, "compressed hello");
    }

    #[tokio::test]
    async fn inflated_size_is_limited() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&[b'a'; 4096]).unwrap();
        let compressed = encoder.finish().unwrap();
        assert!(compressed.len() < 1024);

        let result = read_text(&headers(None, Some("gzip")), body(compressed), options(Limit::kb(1))).await;
        assert!(matches!(result, Err(BodyError::PayloadTooLarge { limit: 1024 })));
    }

    #[tokio::test]
    async fn read_latin1_text() {
        let mut options = options(Limit::kb(1));
        options.encoding = Encoding::Latin1;
        let text = read_text(&headers(None, None), body(&b"na\xEFve"[..]), options).await.unwrap();
        assert_eq!(text, "naïve");
    }
}
