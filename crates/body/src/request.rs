//! The per-request context handed through the pipeline.

use crate::body::{Parsed, ParsedBody};
use http::request::Parts;
use http::{Extensions, HeaderMap, Method, Uri, Version};

/// The head of a request plus the slot the body parser fills in.
///
/// A stage that decodes the body stores the result here with [`set_body`](Self::set_body);
/// later stages read it back through [`body`](Self::body) and [`raw_body`](Self::raw_body).
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
    body: Option<ParsedBody>,
}

impl RequestContext {
    pub fn new(parts: Parts) -> Self {
        Self { parts, body: None }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn version(&self) -> Version {
        self.parts.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// The request extensions; the body parser stores a [`ParsedBody`] here when
    /// `patch_request` is enabled.
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// The decoded body, if a body parser stored one.
    pub fn body(&self) -> Option<&Parsed> {
        self.body.as_ref().map(ParsedBody::parsed)
    }

    /// The decoded text the body was parsed from, if it was retained.
    pub fn raw_body(&self) -> Option<&str> {
        self.body.as_ref().and_then(ParsedBody::raw)
    }

    pub fn parsed_body(&self) -> Option<&ParsedBody> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: ParsedBody) {
        self.body = Some(body);
    }

    pub fn take_body(&mut self) -> Option<ParsedBody> {
        self.body.take()
    }

    pub fn into_parts(self) -> (Parts, Option<ParsedBody>) {
        (self.parts, self.body)
    }
}

impl From<Parts> for RequestContext {
    fn from(parts: Parts) -> Self {
        Self::new(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::RequestContext;
    use crate::body::{Parsed, ParsedBody};
    use http::{Method, Request};

    fn context() -> RequestContext {
        let (parts, _) = Request::post("/users?page=1").header("x-trace", "abc").body(()).unwrap().into_parts();
        RequestContext::from(parts)
    }

    #[test]
    fn exposes_request_head() {
        let ctx = context();

        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.uri().path(), "/users");
        assert_eq!(ctx.headers().get("x-trace").unwrap(), "abc");
        assert!(ctx.body().is_none());
        assert!(ctx.raw_body().is_none());
    }

    #[test]
    fn body_slot() {
        let mut ctx = context();
        ctx.set_body(ParsedBody::new(Parsed::Text("hi".into()), Some("hi".into())));

        assert_eq!(ctx.body(), Some(&Parsed::Text("hi".into())));
        assert_eq!(ctx.raw_body(), Some("hi"));

        let taken = ctx.take_body().unwrap();
        assert_eq!(taken.raw(), Some("hi"));
        assert!(ctx.parsed_body().is_none());
    }

    #[test]
    fn extensions_are_request_local() {
        let mut ctx = context();
        ctx.extensions_mut().insert(ParsedBody::empty());

        let (parts, body) = ctx.into_parts();
        assert!(parts.extensions.get::<ParsedBody>().is_some());
        assert!(body.is_none());
    }
}
