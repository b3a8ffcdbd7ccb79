//! Request body parsing for async HTTP pipelines.
//!
//! A [`BodyParser`] looks at the `Content-Type` of a request and decodes its body as JSON,
//! XML (kept as text), `application/x-www-form-urlencoded`, plain text or
//! `multipart/form-data`. The result is a [`ParsedBody`] stored on the [`RequestContext`]
//! and/or in the request extensions, after which the next pipeline stage runs.
//!
//! ```
//! use bytes::Bytes;
//! use http::Request;
//! use http_body_util::Full;
//! use micro_body::{BodyParser, Limit, OptionReqBody, Parsed, RequestContext};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), micro_body::BodyError> {
//! let parser = BodyParser::builder().text_limit(Limit::kb(1)).build();
//!
//! let (parts, _) = Request::post("/notes")
//!     .header("content-type", "text/plain")
//!     .header("content-length", 5)
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//! let mut req = RequestContext::new(parts);
//! let body = OptionReqBody::from_body(Full::new(Bytes::from_static(b"hello")));
//!
//! parser.apply(&mut req, &body).await?;
//! assert_eq!(req.body(), Some(&Parsed::Text("hello".into())));
//! # Ok(())
//! # }
//! ```

mod body;
mod config;
mod content_type;
mod decode;
mod decorator;
mod error;
mod handler;
mod parser;
mod request;

pub mod fields;
pub mod multipart;

pub use body::{FieldMap, OptionReqBody, Parsed, ParsedBody, ReqBody};
pub use config::{BodyConfig, ConfigError, Encoding, Limit, MultipartOptions};
pub use content_type::DecodePath;
pub use decorator::HandlerDecorator;
pub use error::{BodyError, BoxError, ErrorKind};
pub use handler::{handler_fn, FnHandler, RequestHandler};
pub use parser::{BodyParser, BodyParserBuilder, BodyParserHandler, ErrorCallback};
pub use request::RequestContext;
