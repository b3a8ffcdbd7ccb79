use crate::handler::RequestHandler;

/// Wraps a handler into another handler.
pub trait HandlerDecorator<In: RequestHandler> {
    type Output: RequestHandler;

    fn decorate(&self, handler: In) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::HandlerDecorator;
    use crate::body::{OptionReqBody, Parsed};
    use crate::error::BoxError;
    use crate::handler::{handler_fn, RequestHandler};
    use crate::parser::BodyParser;
    use crate::request::RequestContext;
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::Request;
    use http_body_util::Full;

    struct Suffix<H> {
        inner: H,
        suffix: &'static str,
    }

    #[async_trait]
    impl<H: RequestHandler<Output = String>> RequestHandler for Suffix<H> {
        type Output = String;

        async fn invoke(&self, req: RequestContext, req_body: OptionReqBody) -> Result<String, BoxError> {
            let output = self.inner.invoke(req, req_body).await?;
            Ok(output + self.suffix)
        }
    }

    struct AddSuffix(&'static str);

    impl<H: RequestHandler<Output = String>> HandlerDecorator<H> for AddSuffix {
        type Output = Suffix<H>;

        fn decorate(&self, handler: H) -> Self::Output {
            Suffix { inner: handler, suffix: self.0 }
        }
    }

    #[tokio::test]
    async fn decorators_stack_around_parser() {
        let handler = handler_fn(|req: RequestContext, _body: OptionReqBody| async move {
            Ok::<_, BoxError>(req.body().and_then(Parsed::as_text).unwrap_or_default().to_string())
        });
        let handler = AddSuffix("!").decorate(BodyParser::default().decorate(handler));
        let (parts, _) = Request::post("/").header("content-type", "text/plain").body(()).unwrap().into_parts();

        let body = OptionReqBody::from_body(Full::new(Bytes::from_static(b"hi")));

        let output = handler.invoke(RequestContext::new(parts), body).await.unwrap();
        assert_eq!(output, "hi!");
    }
}
