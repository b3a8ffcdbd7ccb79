use http::StatusCode;
use std::error::Error;
use std::io;
use thiserror::Error;

/// Boxed error used at the handler boundary.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Coarse classification of a [`BodyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SizeLimitExceeded,
    MalformedPayload,
    UnsupportedEncoding,
    Stream,
}

#[derive(Error, Debug)]
pub enum BodyError {
    #[error("request entity too large, limit: {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("too many fields, limit: {max}")]
    TooManyFields { max: usize },

    #[error("request size did not match content length, expected: {expected}, received: {received}")]
    LengthMismatch { expected: u64, received: u64 },

    #[error("invalid {what} body: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("unsupported content encoding: {encoding}")]
    UnsupportedEncoding { encoding: String },

    #[error("stream error: {source}")]
    Stream {
        #[from]
        source: io::Error,
    },
}

impl BodyError {
    pub fn payload_too_large(limit: u64) -> Self {
        Self::PayloadTooLarge { limit }
    }

    pub fn too_many_fields(max: usize) -> Self {
        Self::TooManyFields { max }
    }

    pub fn length_mismatch(expected: u64, received: u64) -> Self {
        Self::LengthMismatch { expected, received }
    }

    pub fn malformed<S: ToString>(what: &'static str, reason: S) -> Self {
        Self::Malformed { what, reason: reason.to_string() }
    }

    pub fn unsupported_encoding<S: ToString>(encoding: S) -> Self {
        Self::UnsupportedEncoding { encoding: encoding.to_string() }
    }

    pub fn stream<E: Into<BoxError>>(e: E) -> Self {
        Self::Stream { source: io::Error::other(e) }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BodyError::PayloadTooLarge { .. } | BodyError::TooManyFields { .. } => ErrorKind::SizeLimitExceeded,
            BodyError::Malformed { .. } => ErrorKind::MalformedPayload,
            BodyError::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            BodyError::LengthMismatch { .. } | BodyError::Stream { .. } => ErrorKind::Stream,
        }
    }

    /// The response status a server would normally answer with.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::SizeLimitExceeded => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::UnsupportedEncoding => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::MalformedPayload | ErrorKind::Stream => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<multer::Error> for BodyError {
    fn from(e: multer::Error) -> Self {
        match e {
            multer::Error::FieldSizeExceeded { limit, .. } | multer::Error::StreamSizeExceeded { limit } => {
                Self::payload_too_large(limit)
            }
            multer::Error::StreamReadFailed(source) => Self::stream(source),
            other => Self::malformed("multipart", other),
        }
    }
}
