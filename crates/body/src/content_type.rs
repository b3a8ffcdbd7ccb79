//! Content type matching for the decode paths.

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use http::HeaderMap;
use mime::Mime;
use std::fmt;

/// The decoder a request body is routed to.
///
/// Paths are tried in declaration order; the first enabled path whose media types match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodePath {
    Json,
    Xml,
    UrlEncoded,
    Text,
    Multipart,
}

impl DecodePath {
    /// Every path in priority order.
    pub const ALL: [DecodePath; 5] =
        [DecodePath::Json, DecodePath::Xml, DecodePath::UrlEncoded, DecodePath::Text, DecodePath::Multipart];

    pub fn name(self) -> &'static str {
        match self {
            DecodePath::Json => "json",
            DecodePath::Xml => "xml",
            DecodePath::UrlEncoded => "urlencoded",
            DecodePath::Text => "text",
            DecodePath::Multipart => "multipart",
        }
    }

    /// Whether `mime` is handled by this path.
    ///
    /// - json: `application/json`
    /// - xml: `application/xml`
    /// - urlencoded: `application/x-www-form-urlencoded`
    /// - text: `text/plain`
    /// - multipart: `multipart/*`
    ///
    /// Parameters such as `charset` are ignored. Other media types, including `+json` and
    /// `+xml` suffixes, match no path and are left undecoded.
    pub fn matches(self, mime: &Mime) -> bool {
        let (type_, subtype) = (mime.type_(), mime.subtype());
        match self {
            DecodePath::Json => type_ == mime::APPLICATION && subtype == mime::JSON,
            DecodePath::Xml => type_ == mime::APPLICATION && subtype == mime::XML,
            DecodePath::UrlEncoded => type_ == mime::APPLICATION && subtype == mime::WWW_FORM_URLENCODED,
            DecodePath::Text => type_ == mime::TEXT && subtype == mime::PLAIN,
            DecodePath::Multipart => type_ == mime::MULTIPART,
        }
    }
}

impl fmt::Display for DecodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the `Content-Type` header; a missing or unparsable header yields `None`.
pub fn media_type(headers: &HeaderMap) -> Option<Mime> {
    headers.get(CONTENT_TYPE)?.to_str().ok()?.parse().ok()
}

/// Whether the headers announce a body: a `Transfer-Encoding` or a numeric `Content-Length`.
pub fn declares_body(headers: &HeaderMap) -> bool {
    headers.contains_key(TRANSFER_ENCODING) || content_length(headers).is_some()
}

/// The declared `Content-Length`, if present and numeric.
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}
