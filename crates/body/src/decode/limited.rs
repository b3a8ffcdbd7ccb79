use crate::body::ReqBody;
use crate::config::Limit;
use crate::error::BodyError;
use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use tracing::trace;

/// Buffers `body`, failing as soon as it goes over `limit`.
///
/// A `declared` length above the limit is rejected without reading anything, and a declared
/// length that differs from what was received is an error.
pub(crate) async fn read_limited(mut body: ReqBody, limit: Limit, declared: Option<u64>) -> Result<Bytes, BodyError> {
    if let Some(length) = declared
        && limit.is_exceeded_by(length)
    {
        trace!(length, %limit, "declared content length exceeds limit");
        return Err(BodyError::payload_too_large(limit.as_u64()));
    }

    let capacity = declared.unwrap_or(0).min(limit.as_u64());
    let mut buf = BytesMut::with_capacity(usize::try_from(capacity).unwrap_or(0));

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(BodyError::stream)?;
        let Ok(data) = frame.into_data() else {
            // trailers carry no payload
            continue;
        };

        if limit.is_exceeded_by((buf.len() + data.len()) as u64) {
            return Err(BodyError::payload_too_large(limit.as_u64()));
        }
        buf.extend_from_slice(&data);
    }

    if let Some(expected) = declared
        && expected != buf.len() as u64
    {
        return Err(BodyError::length_mismatch(expected, buf.len() as u64));
    }

    Ok(buf.freeze())
}
