use bencher::{multipart_fields, TestCase, TestFile};
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use futures::stream;
use http::Request;
use http_body_util::Full;
use micro_body::multipart::{accumulate, MultipartEvent};
use micro_body::{BodyError, BodyParser, Limit, OptionReqBody, RequestContext};
use std::hint::black_box;
use tokio::runtime::Runtime;

static USER: TestFile = TestFile::new("user.json", include_str!("../resources/body/user.json"));
static ORDERS: TestFile = TestFile::new("orders.json", include_str!("../resources/body/orders.json"));
static FORM: TestFile = TestFile::new("form.txt", include_str!("../resources/body/form.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::json("small_json", USER), TestCase::json("large_json", ORDERS), TestCase::form("form", FORM)]
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime should build")
}

fn request(content_type: &str, payload: Bytes) -> (RequestContext, OptionReqBody) {
    let (parts, _) = Request::post("/bench")
        .header("content-type", content_type)
        .header("content-length", payload.len())
        .body(())
        .expect("request should be valid")
        .into_parts();
    (RequestContext::new(parts), OptionReqBody::from_body(Full::new(payload)))
}

fn benchmark_body_parser(criterion: &mut Criterion) {
    let runtime = runtime();
    let parser = BodyParser::builder().multipart(true).form_limit(Limit::kb(64)).build();
    let parser = &parser;

    let mut group = criterion.benchmark_group("body_parser");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.to_async(&runtime).iter_batched(
                || request(case.content_type(), Bytes::from_static(case.file().content().as_bytes())),
                |(mut req, body)| async move {
                    parser.apply(&mut req, &body).await.expect("body should decode");
                    black_box(req)
                },
                BatchSize::SmallInput,
            );
        });
    }

    let (content_type, payload) = multipart_fields(256);
    let payload = Bytes::from(payload);
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("multipart_fields", |b| {
        b.to_async(&runtime).iter_batched(
            || request(&content_type, payload.clone()),
            |(mut req, body)| async move {
                parser.apply(&mut req, &body).await.expect("multipart should decode");
                black_box(req)
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn benchmark_accumulator(criterion: &mut Criterion) {
    let runtime = runtime();
    let mut group = criterion.benchmark_group("accumulator");

    for count in [16_usize, 256, 4096] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.to_async(&runtime).iter_batched(
                || {
                    (0..count)
                        .map(|i| Ok(MultipartEvent::Field { name: format!("field{}", i % 32), value: i.to_string() }))
                        .collect::<Vec<Result<MultipartEvent, BodyError>>>()
                },
                |events| async move { black_box(accumulate(stream::iter(events)).await.expect("no errors")) },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(parser, benchmark_body_parser, benchmark_accumulator);
criterion_main!(parser);
