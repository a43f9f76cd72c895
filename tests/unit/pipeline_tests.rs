// Request pipeline unit tests

use http::{Method, Request};
use utsushi::pipeline::{parse_query, RequestContext};

fn parts(uri: &str, if_none_match: Option<&str>) -> http::request::Parts {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(value) = if_none_match {
        builder = builder.header(http::header::IF_NONE_MATCH, value);
    }
    builder.body(()).unwrap().into_parts().0
}

// Test: RequestContext captures path, query and validator from request parts
#[test]
fn test_context_from_request_parts() {
    let parts = parts(
        "/getmedia/1f3c/photo.jpg?width=800&fit=cover&crop=north",
        Some("\"abc\""),
    );
    let ctx = RequestContext::from_parts(&parts);

    assert_eq!(*ctx.method(), Method::GET);
    assert_eq!(ctx.path(), "/getmedia/1f3c/photo.jpg");
    assert_eq!(ctx.query_params()["width"], "800");
    assert_eq!(ctx.query_params()["fit"], "cover");
    assert_eq!(ctx.query_params()["crop"], "north");
    assert_eq!(ctx.if_none_match(), Some("\"abc\""));
}

// Test: Each request gets its own UUID
#[test]
fn test_request_ids_are_unique() {
    let first = RequestContext::new(Method::GET, "/a");
    let second = RequestContext::new(Method::GET, "/a");

    assert_ne!(first.request_id(), second.request_id());
    assert_eq!(first.request_id().len(), 36);
    assert!(first.timestamp() > 0);
}

#[test]
fn test_context_without_query() {
    let ctx = RequestContext::from_parts(&parts("/getContentAsset/x/y.png", None));
    assert!(ctx.query_params().is_empty());
    assert!(ctx.if_none_match().is_none());
}

#[test]
fn test_parse_query_decoding() {
    let params = parse_query("format=image%2Fwebp&name=a+b&flag&=ignored&width=10&width=20");

    assert_eq!(params["format"], "image/webp");
    assert_eq!(params["name"], "a b");
    assert_eq!(params["flag"], "");
    assert_eq!(params["width"], "10");
    assert!(!params.contains_key(""));
}

// Test: Parameter names match regardless of case, values keep theirs
#[test]
fn test_mixed_case_parameter_names_resolve() {
    use utsushi::transform::{FitMode, ImageConfig, ImageFormat, TransformRequest};

    let ctx = RequestContext::from_parts(&parts(
        "/getmedia/1f3c/photo.jpg?Width=10&MAXSIDESIZE=20&Fit=Cover&FORMAT=webp",
        None,
    ));

    let request =
        TransformRequest::resolve(ctx.query_params(), ImageFormat::Jpeg, &ImageConfig::default())
            .unwrap();
    assert_eq!(request.width, Some(10));
    assert_eq!(request.max_side_size, Some(20));
    assert_eq!(request.fit, FitMode::Cover);
    assert_eq!(request.format, ImageFormat::WebP);
}
