use crate::body::{Parsed, ParsedBody, ReqBody};
use crate::decode::{read_text, DecodeOptions};
use crate::error::BodyError;
use http::HeaderMap;
use serde_json::{Map, Value};

/// Decodes a JSON body.
///
/// With `strict` set only objects and arrays are accepted at the top level and an empty body
/// decodes to `{}`. Otherwise any JSON value is accepted and an empty body decodes to `""`.
pub(crate) async fn decode_json(
    headers: &HeaderMap,
    body: ReqBody,
    options: DecodeOptions,
    strict: bool,
) -> Result<ParsedBody, BodyError> {
    let text = read_text(headers, body, options).await?;
    let value = parse_json(&text, strict)?;
    Ok(ParsedBody::new(Parsed::Json(value), options.include_raw.then_some(text)))
}

pub(crate) fn parse_json(text: &str, strict: bool) -> Result<Value, BodyError> {
    if text.is_empty() {
        return Ok(if strict { Value::Object(Map::new()) } else { Value::String(String::new()) });
    }

    if strict && !text.trim_start_matches([' ', '\t', '\n', '\r']).starts_with(['{', '[']) {
        return Err(BodyError::malformed("json", "only objects and arrays are accepted"));
    }

    serde_json::from_str(text).map_err(|e| BodyError::malformed("json", e))
}
