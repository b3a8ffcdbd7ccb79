use crate::error::{BodyError, BoxError};
use crate::fields::MultiMap;
use crate::multipart::MultipartBody;
use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body_util::combinators::BoxBody;
use http_body_util::BodyExt;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The request byte stream handed through the pipeline.
pub type ReqBody = BoxBody<Bytes, BoxError>;

/// Decoded form fields.
pub type FieldMap = MultiMap<String>;

/// A request body that can be consumed at most once.
///
/// Cloning shares the same slot, so whichever stage takes the body first owns it and later
/// stages observe it as consumed.
#[derive(Clone, Debug)]
pub struct OptionReqBody {
    inner: Arc<Mutex<Option<ReqBody>>>,
}

impl From<ReqBody> for OptionReqBody {
    fn from(body: ReqBody) -> Self {
        OptionReqBody { inner: Arc::new(Mutex::new(Some(body))) }
    }
}

impl OptionReqBody {
    /// Boxes any `http_body::Body` with `Bytes` frames.
    pub fn from_body<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let body: ReqBody = body.map_err(Into::into).boxed();
        Self::from(body)
    }

    /// An already consumed body.
    pub fn empty() -> Self {
        OptionReqBody { inner: Arc::new(Mutex::new(None)) }
    }

    pub async fn can_consume(&self) -> bool {
        let guard = self.inner.lock().await;
        guard.is_some()
    }

    /// Whether there may still be bytes to read.
    pub async fn has_pending_data(&self) -> bool {
        let guard = self.inner.lock().await;
        guard.as_ref().is_some_and(|body| !body.is_end_stream())
    }

    /// Takes the body out, leaving the slot consumed.
    pub async fn take(&self) -> Option<ReqBody> {
        let mut guard = self.inner.lock().await;
        guard.take()
    }

    pub async fn apply<T, F, Fut>(&self, f: F) -> Result<T, BodyError>
    where
        F: FnOnce(ReqBody) -> Fut,
        Fut: Future<Output = Result<T, BodyError>>,
    {
        let Some(req_body) = self.take().await else {
            return Err(BodyError::stream("body has been consumed"));
        };

        f(req_body).await
    }
}

/// The decoded value of a request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Parsed {
    /// Nothing was decoded: strict mode skipped the request, no decode path matched, or a
    /// decode error was handed to the error callback.
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(FieldMap),
    /// Text and XML bodies.
    Text(String),
    Multipart(MultipartBody),
}

impl Parsed {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Parsed::Empty)
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Parsed::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&FieldMap> {
        match self {
            Parsed::Form(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Parsed::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_multipart(&self) -> Option<&MultipartBody> {
        match self {
            Parsed::Multipart(multipart) => Some(multipart),
            _ => None,
        }
    }
}

/// The outcome of decoding one request.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParsedBody {
    parsed: Parsed,
    raw: Option<String>,
}

impl ParsedBody {
    pub fn new(parsed: Parsed, raw: Option<String>) -> Self {
        Self { parsed, raw }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parsed(&self) -> &Parsed {
        &self.parsed
    }

    /// The decoded text the value was parsed from, when it was retained.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn into_parts(self) -> (Parsed, Option<String>) {
        (self.parsed, self.raw)
    }
}

impl From<Parsed> for ParsedBody {
    fn from(parsed: Parsed) -> Self {
        Self { parsed, raw: None }
    }
}
