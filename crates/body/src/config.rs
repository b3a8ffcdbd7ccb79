//! Body parser configuration.
//!
//! A [`BodyConfig`] is resolved once when a [`BodyParser`](crate::BodyParser) is built and is
//! never mutated afterwards. Every option has a default, and the struct can be deserialized from
//! a partial document:
//!
//! ```
//! use micro_body::{BodyConfig, Limit};
//!
//! let config: BodyConfig = serde_json::from_str(r#"{"multipart": true, "form_limit": "1mb"}"#).unwrap();
//! assert!(config.multipart);
//! assert_eq!(config.form_limit, Limit::mb(1));
//! assert_eq!(config.json_limit, Limit::mb(10));
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const KB: u64 = 1 << 10;
const MB: u64 = 1 << 20;
const GB: u64 = 1 << 30;
const TB: u64 = 1 << 40;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid size limit: {value:?}")]
    InvalidLimit { value: String },

    #[error("unsupported text encoding: {label:?}")]
    UnsupportedEncoding { label: String },
}

impl ConfigError {
    pub fn invalid_limit<S: ToString>(value: S) -> Self {
        Self::InvalidLimit { value: value.to_string() }
    }

    pub fn unsupported_encoding<S: ToString>(label: S) -> Self {
        Self::UnsupportedEncoding { label: label.to_string() }
    }
}

/// A byte size limit.
///
/// Parses from a plain byte count or a 1024-based human string such as `"56kb"` or `"1.5mb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "LimitRepr")]
pub struct Limit(u64);

impl Limit {
    pub const fn bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn kb(kb: u64) -> Self {
        Self(kb * KB)
    }

    pub const fn mb(mb: u64) -> Self {
        Self(mb * MB)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether `size` bytes go over this limit.
    #[inline]
    pub const fn is_exceeded_by(self, size: u64) -> bool {
        size > self.0
    }
}

impl From<u64> for Limit {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl FromStr for Limit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let (number, unit) = match lower.find(|c: char| c.is_ascii_alphabetic()) {
            Some(idx) => (lower[..idx].trim_end(), &lower[idx..]),
            None => (lower.as_str(), "b"),
        };

        let multiplier = match unit {
            "b" => 1,
            "kb" => KB,
            "mb" => MB,
            "gb" => GB,
            "tb" => TB,
            _ => return Err(ConfigError::invalid_limit(trimmed)),
        };

        if let Ok(whole) = number.parse::<u64>() {
            return whole.checked_mul(multiplier).map(Limit).ok_or_else(|| ConfigError::invalid_limit(trimmed));
        }

        match number.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(Limit((value * multiplier as f64).floor() as u64)),
            _ => Err(ConfigError::invalid_limit(trimmed)),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "0b"),
            n if n % GB == 0 => write!(f, "{}gb", n / GB),
            n if n % MB == 0 => write!(f, "{}mb", n / MB),
            n if n % KB == 0 => write!(f, "{}kb", n / KB),
            n => write!(f, "{n}b"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Bytes(u64),
    Human(String),
}

impl TryFrom<LimitRepr> for Limit {
    type Error = ConfigError;

    fn try_from(repr: LimitRepr) -> Result<Self, Self::Error> {
        match repr {
            LimitRepr::Bytes(bytes) => Ok(Limit(bytes)),
            LimitRepr::Human(s) => s.parse(),
        }
    }
}

/// Charset used to turn body bytes into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin1",
        }
    }

    /// Decodes `bytes`. Invalid UTF-8 sequences become U+FFFD and a leading byte order mark is
    /// dropped.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8_lossy(bytes).into_owned()
            }
            Encoding::Latin1 => bytes.iter().copied().map(char::from).collect(),
        }
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "binary" => Ok(Encoding::Latin1),
            _ => Err(ConfigError::unsupported_encoding(s)),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = ConfigError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Options handed to the multipart decoder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MultipartOptions {
    /// Directory uploaded files are written to. Defaults to the OS temp dir.
    pub upload_dir: PathBuf,
    /// Keep the original file extension on the stored file.
    pub keep_extensions: bool,
    /// Maximum number of non-file fields.
    pub max_fields: usize,
    /// Maximum summed size of all non-file field values.
    pub max_fields_size: Limit,
    /// Maximum size of a single uploaded file.
    pub max_file_size: Limit,
    /// Charset of non-file field values.
    pub encoding: Encoding,
}

impl Default for MultipartOptions {
    fn default() -> Self {
        Self {
            upload_dir: std::env::temp_dir(),
            keep_extensions: false,
            max_fields: 1000,
            max_fields_size: Limit::mb(2),
            max_file_size: Limit::mb(200),
            encoding: Encoding::Utf8,
        }
    }
}

/// Resolved body parser options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Skip decoding for GET, HEAD and DELETE requests.
    pub strict: bool,

    pub json: bool,
    pub xml: bool,
    pub urlencoded: bool,
    pub text: bool,
    pub multipart: bool,

    pub json_limit: Limit,
    pub xml_limit: Limit,
    pub form_limit: Limit,
    pub text_limit: Limit,

    /// Charset for json, xml, urlencoded and text bodies.
    pub encoding: Encoding,
    /// Only accept JSON objects and arrays at the top level.
    pub json_strict: bool,
    /// Keep the decoded text next to the parsed value.
    pub include_raw: bool,

    pub multipart_options: MultipartOptions,

    /// Store the result in the request's `http::Extensions`.
    pub patch_request: bool,
    /// Store the result on the [`RequestContext`](crate::RequestContext).
    pub patch_context: bool,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            strict: true,
            json: true,
            xml: true,
            urlencoded: true,
            text: true,
            multipart: false,
            json_limit: Limit::mb(10),
            xml_limit: Limit::mb(10),
            form_limit: Limit::kb(56),
            text_limit: Limit::kb(56),
            encoding: Encoding::Utf8,
            json_strict: true,
            include_raw: true,
            multipart_options: MultipartOptions::default(),
            patch_request: false,
            patch_context: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BodyConfig, ConfigError, Encoding, Limit, MultipartOptions};

    #[test]
    fn parse_human_limits() {
        assert_eq!("56kb".parse::<Limit>().unwrap(), Limit::bytes(56 * 1024));
        assert_eq!("10mb".parse::<Limit>().unwrap(), Limit::mb(10));
        assert_eq!("10 MB".parse::<Limit>().unwrap(), Limit::mb(10));
        assert_eq!("1.5mb".parse::<Limit>().unwrap(), Limit::bytes(1_572_864));
        assert_eq!("2gb".parse::<Limit>().unwrap(), Limit::bytes(2 * 1024 * 1024 * 1024));
        assert_eq!("512".parse::<Limit>().unwrap(), Limit::bytes(512));
        assert_eq!("512b".parse::<Limit>().unwrap(), Limit::bytes(512));
    }

    #[test]
    fn reject_bad_limits() {
        assert_eq!("ten mb".parse::<Limit>(), Err(ConfigError::invalid_limit("ten mb")));
        assert!("10xb".parse::<Limit>().is_err());
        assert!("-1kb".parse::<Limit>().is_err());
        assert!("".parse::<Limit>().is_err());
    }

    #[test]
    fn display_limits() {
        assert_eq!(Limit::kb(56).to_string(), "56kb");
        assert_eq!(Limit::mb(10).to_string(), "10mb");
        assert_eq!(Limit::bytes(1000).to_string(), "1000b");
    }

    #[test]
    fn decode_encodings() {
        assert_eq!(Encoding::Utf8.decode("héllo".as_bytes()), "héllo");
        assert_eq!(Encoding::Utf8.decode(b"\xEF\xBB\xBFbom"), "bom");
        assert_eq!(Encoding::Utf8.decode(b"bad \xFF"), "bad \u{FFFD}");
        assert_eq!(Encoding::Latin1.decode(b"caf\xE9"), "café");
    }

    #[test]
    fn parse_encoding_labels() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("iso-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("koi8-r".parse::<Encoding>(), Err(ConfigError::unsupported_encoding("koi8-r")));
    }

    #[test]
    fn defaults() {
        let config = BodyConfig::default();
        assert!(config.strict);
        assert!(config.json && config.xml && config.urlencoded && config.text);
        assert!(!config.multipart);
        assert_eq!(config.json_limit, Limit::mb(10));
        assert_eq!(config.xml_limit, Limit::mb(10));
        assert_eq!(config.form_limit, Limit::kb(56));
        assert_eq!(config.text_limit, Limit::kb(56));
        assert_eq!(config.encoding, Encoding::Utf8);
        assert!(!config.patch_request);
        assert!(config.patch_context);
        assert_eq!(config.multipart_options, MultipartOptions::default());
    }

    #[test]
    fn deserialize_partial_config() {
        let config: BodyConfig = serde_json::from_str(
            r#"{
                "strict": false,
                "text_limit": 1024,
                "encoding": "latin1",
                "multipart_options": {"keep_extensions": true, "max_file_size": "1mb"}
            }"#,
        )
        .unwrap();

        assert!(!config.strict);
        assert_eq!(config.text_limit, Limit::kb(1));
        assert_eq!(config.encoding, Encoding::Latin1);
        assert!(config.multipart_options.keep_extensions);
        assert_eq!(config.multipart_options.max_file_size, Limit::mb(1));
        assert_eq!(config.multipart_options.max_fields, 1000);
        assert_eq!(config.json_limit, Limit::mb(10));
    }

    #[test]
    fn deserialize_rejects_bad_values() {
        assert!(serde_json::from_str::<BodyConfig>(r#"{"json_limit": "lots"}"#).is_err());
        assert!(serde_json::from_str::<BodyConfig>(r#"{"encoding": "ebcdic"}"#).is_err());
    }
}
