use crate::body::OptionReqBody;
use crate::error::BoxError;
use crate::request::RequestContext;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

/// One stage of request processing.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    type Output: Send;

    async fn invoke(&self, req: RequestContext, req_body: OptionReqBody) -> Result<Self::Output, BoxError>;
}

/// a handler backed by an async fn or closure
pub struct FnHandler<F, Fut> {
    f: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(RequestContext, OptionReqBody) -> Fut,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

impl<F, Fut> fmt::Debug for FnHandler<F, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

pub fn handler_fn<F, Fut, O, E>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(RequestContext, OptionReqBody) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, E>> + Send,
    O: Send + 'static,
    E: Into<BoxError> + 'static,
{
    FnHandler::new(f)
}

#[async_trait]
impl<F, Fut, O, E> RequestHandler for FnHandler<F, Fut>
where
    F: Fn(RequestContext, OptionReqBody) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, E>> + Send,
    O: Send + 'static,
    E: Into<BoxError> + 'static,
{
    type Output = O;

    async fn invoke(&self, req: RequestContext, req_body: OptionReqBody) -> Result<O, BoxError> {
        (self.f)(req, req_body).await.map_err(Into::into)
    }
}
