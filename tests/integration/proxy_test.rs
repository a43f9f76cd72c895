// End-to-end proxy tests: router + transformation middleware + stub origin
//
// Covers:
// - Eligible image responses are resized and re-encoded with fresh headers
// - A repeated request with the returned ETag gets 304 Not Modified
// - Non-image, parameterless, broken and non-GET exchanges pass through
// - A request that would reproduce the source serves the origin bytes
// - /health and /metrics are answered locally
// - An unreachable origin yields 502

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use utsushi::config::ImageConfig;

use super::test_harness::{body_bytes, jpeg, ProxyTestHarness};

#[tokio::test]
async fn test_image_is_transformed() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness
        .get("/getmedia/1f3c/photo.jpg?width=200&height=200&fit=cover&crop=north&format=webp")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "image/webp");
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=31536000");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "inline; filename=photo.webp"
    );
    let etag = headers[header::ETAG].to_str().unwrap();
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert_ne!(etag, "\"origin-etag\"");
    assert!(headers.get(header::LAST_MODIFIED).is_none());

    let body = body_bytes(response).await;
    assert_eq!(
        headers[header::CONTENT_LENGTH],
        body.len().to_string().as_str()
    );
    let img = image::load_from_memory(&body).expect("transformed body should decode");
    assert_eq!((img.width(), img.height()), (200, 200));

    assert_eq!(harness.metrics.transformed_count(), 1);
}

#[tokio::test]
async fn test_matching_etag_returns_not_modified() {
    let harness = ProxyTestHarness::with_stub_origin().await;
    let uri = "/getmedia/1f3c/photo.jpg?maxSideSize=100";

    let first = harness.get(uri).await;
    assert_eq!(first.status(), StatusCode::OK);
    let etag = first.headers()[header::ETAG].clone();

    let second = harness
        .send(
            Request::get(uri)
                .header(header::IF_NONE_MATCH, etag.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(second.headers()[header::ETAG], etag);
    assert!(second.headers().get(header::CONTENT_TYPE).is_none());
    assert!(body_bytes(second).await.is_empty());
    assert_eq!(harness.metrics.not_modified_count(), 1);
}

#[tokio::test]
async fn test_stale_etag_gets_full_response() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness
        .send(
            Request::get("/getmedia/1f3c/photo.jpg?width=50")
                .header(header::IF_NONE_MATCH, "\"origin-etag\"")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
}

#[tokio::test]
async fn test_request_without_dimensions_passes_through() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness.get("/getmedia/1f3c/photo.jpg?format=webp").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.headers()[header::ETAG], "\"origin-etag\"");
    assert_eq!(body_bytes(response).await, jpeg(400, 200));
    assert_eq!(harness.metrics.passthrough_count("no_params"), 1);
}

#[tokio::test]
async fn test_max_side_larger_than_image_serves_original() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness.get("/getmedia/1f3c/photo.jpg?maxSideSize=500").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.headers()[header::ETAG], "\"origin-etag\"");
    assert_eq!(body_bytes(response).await, jpeg(400, 200));
    assert_eq!(harness.metrics.passthrough_count("unchanged"), 1);
    assert_eq!(harness.metrics.transformed_count(), 0);
}

#[tokio::test]
async fn test_parameter_names_are_case_insensitive() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness.get("/getmedia/1f3c/photo.jpg?WIDTH=100&Format=png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let img = image::load_from_memory(&body_bytes(response).await).unwrap();
    assert_eq!((img.width(), img.height()), (100, 50));
}

#[tokio::test]
async fn test_non_image_passes_through() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness.get("/getmedia/1f3c/notes.txt?width=100").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, "plain text");
    assert_eq!(harness.metrics.passthrough_count("not_image"), 1);
}

#[tokio::test]
async fn test_undecodable_image_passes_through() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness.get("/getmedia/1f3c/broken.jpg?width=100").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(body_bytes(response).await, "definitely not a jpeg");
    assert_eq!(harness.metrics.failure_count("decode"), 1);
}

#[tokio::test]
async fn test_origin_errors_are_untouched() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness.get("/getmedia/1f3c/gone.jpg?width=100").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, "missing");
}

#[tokio::test]
async fn test_other_routes_are_proxied() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/echo?width=100")
                .body(Body::from("payload"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, "payload");
    assert_eq!(harness.metrics.request_count(), 0);
}

#[tokio::test]
async fn test_disabled_prefix_passes_through() {
    let addr = super::test_harness::start_origin().await;
    let harness = ProxyTestHarness::new(
        format!("http://{}", addr),
        ImageConfig {
            process_media_library: false,
            ..ImageConfig::default()
        },
    );

    let response = harness.get("/getmedia/1f3c/photo.jpg?width=50").await;

    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(body_bytes(response).await, jpeg(400, 200));
}

#[tokio::test]
async fn test_health_endpoint() {
    let harness = ProxyTestHarness::with_stub_origin().await;

    let response = harness.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["uptime_seconds"].is_u64());
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_metrics_endpoint_reports_transformations() {
    let harness = ProxyTestHarness::with_stub_origin().await;
    harness.get("/getmedia/1f3c/photo.jpg?width=100").await;

    let response = harness.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let text = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(text.contains("image_requests_total 1"));
    assert!(text.contains("image_transformed_total 1"));
}

#[tokio::test]
async fn test_unreachable_origin_is_bad_gateway() {
    // Bind and drop to get a port nothing listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let harness = ProxyTestHarness::new(format!("http://{}", addr), ImageConfig::default());

    let response = harness.get("/getmedia/1f3c/photo.jpg?width=100").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
