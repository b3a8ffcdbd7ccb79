use crate::body::{FieldMap, Parsed, ParsedBody, ReqBody};
use crate::decode::{read_text, DecodeOptions};
use crate::error::BodyError;
use http::HeaderMap;

/// Decodes an `application/x-www-form-urlencoded` body. Repeated keys collect into a list.
pub(crate) async fn decode_form(headers: &HeaderMap, body: ReqBody, options: DecodeOptions) -> Result<ParsedBody, BodyError> {
    let text = read_text(headers, body, options).await?;
    let fields = parse_form(&text)?;
    Ok(ParsedBody::new(Parsed::Form(fields), options.include_raw.then_some(text)))
}

pub(crate) fn parse_form(text: &str) -> Result<FieldMap, BodyError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(text).map_err(|e| BodyError::malformed("urlencoded", e))?;
    Ok(pairs.into_iter().collect())
}
