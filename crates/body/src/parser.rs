//! The body parsing pipeline stage.
//!
//! [`BodyParser`] picks at most one decode path per request from the `Content-Type` header,
//! decodes the body with it and stores the [`ParsedBody`] where the configuration asks for it.
//! As a [`HandlerDecorator`] it wraps the next stage, which runs once the body is decoded.

use crate::body::{OptionReqBody, ParsedBody};
use crate::config::{BodyConfig, Encoding, Limit, MultipartOptions};
use crate::content_type::{declares_body, media_type, DecodePath};
use crate::decode::{decode_form, decode_json, decode_text, DecodeOptions};
use crate::decorator::HandlerDecorator;
use crate::error::{BodyError, BoxError};
use crate::handler::RequestHandler;
use crate::multipart::{decode_multipart, FileBeginCallback, FileDescriptor};
use crate::request::RequestContext;
use async_trait::async_trait;
use http::{HeaderMap, Method};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Methods that carry no body by convention; skipped entirely in strict mode.
const BODYLESS_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::DELETE];

/// Receives a decode error together with the request; the pipeline then continues with an
/// empty body.
pub type ErrorCallback = Arc<dyn Fn(&BodyError, &mut RequestContext) + Send + Sync>;

/// Decodes request bodies according to a [`BodyConfig`].
///
/// Cloning is cheap: the configuration and callbacks are shared.
#[derive(Clone)]
pub struct BodyParser {
    inner: Arc<Inner>,
}

struct Inner {
    config: BodyConfig,
    on_error: Option<ErrorCallback>,
    on_file_begin: Option<FileBeginCallback>,
}

impl BodyParser {
    pub fn new(config: BodyConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> BodyParserBuilder {
        BodyParserBuilder::new()
    }

    pub fn config(&self) -> &BodyConfig {
        &self.inner.config
    }

    /// Whether strict mode skips requests with this method.
    pub fn skips(&self, method: &Method) -> bool {
        self.inner.config.strict && BODYLESS_METHODS.contains(method)
    }

    /// The decode path for a request, if any.
    ///
    /// The paths are tried in the order json, xml, urlencoded, text, multipart; the first one
    /// that is enabled and matches the media type wins.
    pub fn select(&self, method: &Method, headers: &HeaderMap, has_body: bool) -> Option<DecodePath> {
        if self.skips(method) || !has_body {
            return None;
        }

        let mime = media_type(headers)?;
        DecodePath::ALL.into_iter().find(|path| self.enabled(*path) && path.matches(&mime))
    }

    fn enabled(&self, path: DecodePath) -> bool {
        let config = &self.inner.config;
        match path {
            DecodePath::Json => config.json,
            DecodePath::Xml => config.xml,
            DecodePath::UrlEncoded => config.urlencoded,
            DecodePath::Text => config.text,
            DecodePath::Multipart => config.multipart,
        }
    }

    fn decode_options(&self, limit: Limit) -> DecodeOptions {
        let config = &self.inner.config;
        DecodeOptions { limit, encoding: config.encoding, include_raw: config.include_raw }
    }

    /// Decodes the body of `req` without storing the result.
    ///
    /// A request that matches no decode path yields an empty body and its stream is left
    /// untouched for later stages.
    pub async fn parse(&self, req: &RequestContext, req_body: &OptionReqBody) -> Result<ParsedBody, BodyError> {
        if self.skips(req.method()) {
            trace!(method = %req.method(), "strict mode, skip body parsing");
            return Ok(ParsedBody::empty());
        }

        let headers = req.headers();
        let has_body = declares_body(headers) || req_body.has_pending_data().await;
        let Some(path) = self.select(req.method(), headers, has_body) else {
            trace!(has_body, content_type = ?headers.get(http::header::CONTENT_TYPE), "no decode path matched");
            return Ok(ParsedBody::empty());
        };

        debug!(%path, method = %req.method(), uri = %req.uri(), "decode request body");
        let config = &self.inner.config;
        req_body
            .apply(|body| async move {
                match path {
                    DecodePath::Json => {
                        decode_json(headers, body, self.decode_options(config.json_limit), config.json_strict).await
                    }
                    DecodePath::Xml => decode_text(headers, body, self.decode_options(config.xml_limit)).await,
                    DecodePath::UrlEncoded => decode_form(headers, body, self.decode_options(config.form_limit)).await,
                    DecodePath::Text => decode_text(headers, body, self.decode_options(config.text_limit)).await,
                    DecodePath::Multipart => {
                        decode_multipart(headers, body, &config.multipart_options, self.inner.on_file_begin.as_ref())
                            .await
                    }
                }
            })
            .await
    }

    /// Decodes the body of `req` and stores the result.
    ///
    /// When decoding fails and an error callback is configured, the callback sees the error
    /// and an empty body is stored instead; without a callback the error is returned and
    /// nothing is stored.
    pub async fn apply(&self, req: &mut RequestContext, req_body: &OptionReqBody) -> Result<(), BodyError> {
        let parsed = match self.parse(req, req_body).await {
            Ok(parsed) => parsed,
            Err(e) => {
                let Some(on_error) = &self.inner.on_error else {
                    return Err(e);
                };
                warn!(cause = %e, method = %req.method(), uri = %req.uri(), "failed to decode request body");
                on_error(&e, req);
                ParsedBody::empty()
            }
        };

        self.store(req, parsed);
        Ok(())
    }

    fn store(&self, req: &mut RequestContext, parsed: ParsedBody) {
        let config = &self.inner.config;
        match (config.patch_request, config.patch_context) {
            (true, true) => {
                req.extensions_mut().insert(parsed.clone());
                req.set_body(parsed);
            }
            (true, false) => {
                req.extensions_mut().insert(parsed);
            }
            (false, true) => req.set_body(parsed),
            (false, false) => {}
        }
    }
}

impl Default for BodyParser {
    fn default() -> Self {
        Self::new(BodyConfig::default())
    }
}

impl fmt::Debug for BodyParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyParser")
            .field("config", &self.inner.config)
            .field("on_error", &self.inner.on_error.is_some())
            .field("on_file_begin", &self.inner.on_file_begin.is_some())
            .finish()
    }
}

impl<H: RequestHandler> HandlerDecorator<H> for BodyParser {
    type Output = BodyParserHandler<H>;

    fn decorate(&self, handler: H) -> Self::Output {
        BodyParserHandler { parser: self.clone(), handler }
    }
}

/// A handler that decodes the request body before calling the wrapped handler.
#[derive(Debug)]
pub struct BodyParserHandler<H> {
    parser: BodyParser,
    handler: H,
}

#[async_trait]
impl<H: RequestHandler> RequestHandler for BodyParserHandler<H> {
    type Output = H::Output;

    async fn invoke(&self, mut req: RequestContext, req_body: OptionReqBody) -> Result<H::Output, BoxError> {
        self.parser.apply(&mut req, &req_body).await?;
        self.handler.invoke(req, req_body).await
    }
}

#[derive(Default)]
pub struct BodyParserBuilder {
    config: BodyConfig,
    on_error: Option<ErrorCallback>,
    on_file_begin: Option<FileBeginCallback>,
}

impl fmt::Debug for BodyParserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyParserBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}

impl BodyParserBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Replaces every option with `config`; callbacks are kept.
    pub fn config(mut self, config: BodyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    pub fn xml(mut self, enabled: bool) -> Self {
        self.config.xml = enabled;
        self
    }

    pub fn urlencoded(mut self, enabled: bool) -> Self {
        self.config.urlencoded = enabled;
        self
    }

    pub fn text(mut self, enabled: bool) -> Self {
        self.config.text = enabled;
        self
    }

    pub fn multipart(mut self, enabled: bool) -> Self {
        self.config.multipart = enabled;
        self
    }

    pub fn json_limit(mut self, limit: Limit) -> Self {
        self.config.json_limit = limit;
        self
    }

    pub fn xml_limit(mut self, limit: Limit) -> Self {
        self.config.xml_limit = limit;
        self
    }

    pub fn form_limit(mut self, limit: Limit) -> Self {
        self.config.form_limit = limit;
        self
    }

    pub fn text_limit(mut self, limit: Limit) -> Self {
        self.config.text_limit = limit;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn json_strict(mut self, strict: bool) -> Self {
        self.config.json_strict = strict;
        self
    }

    pub fn include_raw(mut self, include_raw: bool) -> Self {
        self.config.include_raw = include_raw;
        self
    }

    pub fn multipart_options(mut self, options: MultipartOptions) -> Self {
        self.config.multipart_options = options;
        self
    }

    pub fn patch_request(mut self, enabled: bool) -> Self {
        self.config.patch_request = enabled;
        self
    }

    pub fn patch_context(mut self, enabled: bool) -> Self {
        self.config.patch_context = enabled;
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&BodyError, &mut RequestContext) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Called for every uploaded file before its content is written.
    pub fn on_file_begin<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &mut FileDescriptor) + Send + Sync + 'static,
    {
        self.on_file_begin = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> BodyParser {
        BodyParser { inner: Arc::new(Inner { config: self.config, on_error: self.on_error, on_file_begin: self.on_file_begin }) }
    }
}
