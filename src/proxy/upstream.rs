//! Upstream request handling for the proxy.
//!
//! Every request that is not served locally is forwarded to the configured
//! origin over a pooled HTTP/1 client. The origin response body is streamed
//! back untouched; the transformation middleware decides whether to buffer it.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName};
use http::uri::{PathAndQuery, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use super::AppState;
use crate::config::OriginConfig;
use crate::error::ProxyError;

/// Connection-scoped headers that must not be forwarded (RFC 9110 §7.6.1)
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Pooled client plus the origin's base URL
#[derive(Clone)]
pub struct Origin {
    client: Client<HttpConnector, Full<Bytes>>,
    base: Uri,
    timeout: Duration,
}

impl Origin {
    pub fn new(config: &OriginConfig, timeout: Duration) -> Result<Self, ProxyError> {
        let base: Uri = config
            .url
            .trim()
            .parse()
            .map_err(|e| ProxyError::Config(format!("invalid origin.url: {}", e)))?;
        if base.scheme_str() != Some("http") || base.authority().is_none() {
            return Err(ProxyError::Config(format!(
                "origin.url '{}' must be an absolute http:// URL",
                config.url
            )));
        }

        let client = Client::builder(TokioExecutor::new()).build_http();

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    /// Map an incoming request URI onto the origin, keeping path and query.
    ///
    /// A base URL with a path (`http://origin/content`) is used as a prefix.
    pub fn target_uri(&self, incoming: &Uri) -> Result<Uri, ProxyError> {
        let prefix = self.base.path().trim_end_matches('/');
        let path_and_query = incoming
            .path_and_query()
            .map(PathAndQuery::as_str)
            .unwrap_or("/");
        let joined: PathAndQuery = format!("{}{}", prefix, path_and_query)
            .parse()
            .map_err(|e| ProxyError::Internal(format!("invalid upstream path: {}", e)))?;

        let mut parts = self.base.clone().into_parts();
        parts.path_and_query = Some(joined);
        Uri::from_parts(parts)
            .map_err(|e| ProxyError::Internal(format!("invalid upstream URI: {}", e)))
    }

    /// Send the request to the origin and return its response with a streaming body
    pub async fn forward(&self, request: Request) -> Result<Response, ProxyError> {
        let (mut parts, body) = request.into_parts();

        let body = body
            .collect()
            .await
            .map_err(|e| ProxyError::Internal(format!("failed to read request body: {}", e)))?
            .to_bytes();

        parts.uri = self.target_uri(&parts.uri)?;
        strip_hop_by_hop(&mut parts.headers);
        // Let the client derive Host from the origin URI
        parts.headers.remove(header::HOST);

        debug!(method = %parts.method, uri = %parts.uri, "Forwarding to origin");

        let upstream = http::Request::from_parts(parts, Full::new(body));
        let response: http::Response<Incoming> =
            tokio::time::timeout(self.timeout, self.client.request(upstream))
                .await
                .map_err(|_| {
                    ProxyError::Upstream(format!("origin timed out after {:?}", self.timeout))
                })?
                .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let (mut parts, incoming) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(incoming)))
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Router fallback: everything not served locally goes to the origin
pub async fn forward_to_origin(State(state): State<AppState>, request: Request) -> Response {
    match state.origin.forward(request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
