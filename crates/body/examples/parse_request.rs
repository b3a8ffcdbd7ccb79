use bytes::Bytes;
use http::Request;
use http_body_util::Full;
use micro_body::{
    handler_fn, BodyParser, BoxError, HandlerDecorator, OptionReqBody, Parsed, RequestContext, RequestHandler,
};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

async fn echo_handler(req: RequestContext, _body: OptionReqBody) -> Result<String, BoxError> {
    let summary = match req.body() {
        Some(Parsed::Json(value)) => format!("json: {value}"),
        Some(Parsed::Form(fields)) => format!("form: {}", serde_json::to_string(fields)?),
        Some(Parsed::Text(text)) => format!("text: {text}"),
        Some(Parsed::Multipart(multipart)) => format!("multipart: {}", serde_json::to_string(multipart)?),
        Some(Parsed::Empty) | None => "no body".to_string(),
    };
    Ok(summary)
}

fn request(method: &str, content_type: &str, payload: &'static str) -> (RequestContext, OptionReqBody) {
    let (parts, _) = Request::builder()
        .method(method)
        .uri("/echo")
        .header("content-type", content_type)
        .header("content-length", payload.len())
        .body(())
        .expect("request should be valid")
        .into_parts();
    (RequestContext::new(parts), OptionReqBody::from_body(Full::new(Bytes::from_static(payload.as_bytes()))))
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let parser = BodyParser::builder()
        .multipart(true)
        .on_file_begin(|name, file| info!(field = name, path = %file.path().display(), "receiving upload"))
        .build();
    let handler = parser.decorate(handler_fn(echo_handler));

    let requests = [
        request("POST", "application/json", r#"{"name":"alice","roles":["admin"]}"#),
        request("PUT", "application/x-www-form-urlencoded", "name=alice&tag=a&tag=b"),
        request("POST", "text/plain; charset=utf-8", "hello world"),
        request(
            "POST",
            "multipart/form-data; boundary=demo",
            "--demo\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nholiday\r\n\
             --demo\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"beach.txt\"\r\n\
             Content-Type: text/plain\r\n\r\nsand and sea\r\n--demo--\r\n",
        ),
        request("GET", "application/json", r#"{"ignored":true}"#),
        request("POST", "application/json", "not json"),
    ];

    for (req, body) in requests {
        let method = req.method().clone();
        match handler.invoke(req, body).await {
            Ok(summary) => info!(%method, %summary, "handled"),
            Err(e) => match e.downcast_ref::<micro_body::BodyError>() {
                Some(body_error) => {
                    warn!(%method, status = %body_error.status_code(), cause = %body_error, "rejected request body");
                }
                None => error!(%method, cause = %e, "handler failed"),
            },
        }
    }
}
