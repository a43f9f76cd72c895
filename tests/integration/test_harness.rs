// Test utilities: stub origin server and a router wired to it

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tower::ServiceExt;
use utsushi::config::{Config, ImageConfig, OriginConfig, ServerConfig};
use utsushi::metrics::Metrics;
use utsushi::proxy::build_app;

/// JPEG test image of the given size
pub fn jpeg(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 251) as u8, (y % 241) as u8, 90])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("Failed to encode test JPEG");
    Bytes::from(out.into_inner())
}

async fn media(Path((_id, name)): Path<(String, String)>) -> Response {
    match name.as_str() {
        "photo.jpg" => (
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::ETAG, "\"origin-etag\""),
                (header::LAST_MODIFIED, "Wed, 21 Oct 2015 07:28:00 GMT"),
            ],
            jpeg(400, 200),
        )
            .into_response(),
        "notes.txt" => ([(header::CONTENT_TYPE, "text/plain")], "plain text").into_response(),
        // Declared as an image, but not decodable
        "broken.jpg" => ([(header::CONTENT_TYPE, "image/jpeg")], "definitely not a jpeg")
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "missing").into_response(),
    }
}

/// Start the stub origin and return its address
pub async fn start_origin() -> SocketAddr {
    let app = Router::new()
        .route("/getmedia/{id}/{name}", get(media))
        .route("/echo", get(|| async { "echo" }).post(|body: Bytes| async move { body }));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub origin");
    let addr = listener.local_addr().expect("stub origin address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Router under test wired to `origin_url`
pub struct ProxyTestHarness {
    app: Router,
    pub metrics: Arc<Metrics>,
}

impl ProxyTestHarness {
    pub fn new(origin_url: String, images: ImageConfig) -> Self {
        let config = Config {
            server: ServerConfig {
                request_timeout: 5,
                ..ServerConfig::default()
            },
            origin: OriginConfig { url: origin_url },
            image_processing: images,
        };
        let metrics = Arc::new(Metrics::new());
        let app = build_app(&config, metrics.clone()).expect("Failed to build app");
        Self { app, metrics }
    }

    pub async fn with_stub_origin() -> Self {
        let addr = start_origin().await;
        Self::new(format!("http://{}", addr), ImageConfig::default())
    }

    pub async fn send(&self, request: axum::http::Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(
            axum::http::Request::get(uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }
}

pub async fn body_bytes(response: Response) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
}
