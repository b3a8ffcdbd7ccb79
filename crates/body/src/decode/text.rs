use crate::body::{Parsed, ParsedBody, ReqBody};
use crate::decode::{read_text, DecodeOptions};
use crate::error::BodyError;
use http::HeaderMap;

/// Decodes a text or XML body. XML is not parsed into a tree.
pub(crate) async fn decode_text(headers: &HeaderMap, body: ReqBody, options: DecodeOptions) -> Result<ParsedBody, BodyError> {
    let text = read_text(headers, body, options).await?;
    let raw = options.include_raw.then(|| text.clone());
    Ok(ParsedBody::new(Parsed::Text(text), raw))
}

#[cfg(test)]
mod tests {
    use super::decode_text;
    use crate::config::Limit;
    use crate::decode::test_util::{body, headers, options};
    use crate::error::BodyError;

    #[tokio::test]
    async fn decode_text_body() {
        let parsed = decode_text(&headers(Some(11), None), body("hello world"), options(Limit::kb(56))).await.unwrap();

        assert_eq!(parsed.parsed().as_text(), Some("hello world"));
        assert_eq!(parsed.raw(), Some("hello world"));
    }

    #[tokio::test]
    async fn decode_xml_as_text() {
        let xml = "<user><name>alice</name></user>";
        let parsed = decode_text(&headers(None, None), body(xml), options(Limit::mb(10))).await.unwrap();

        assert_eq!(parsed.parsed().as_text(), Some(xml));
    }

    #[tokio::test]
    async fn oversized_text() {
        let result = decode_text(&headers(Some(11), None), body("hello world"), options(Limit::bytes(10))).await;
        assert!(matches!(result, Err(BodyError::PayloadTooLarge { .. })));
    }
}
