// Request pipeline module - per-request context shared by the middleware and the transformer

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use http::request::Parts;
use http::{header, Method};
use uuid::Uuid;

/// Request context that holds what the transformation pipeline needs to know
/// about an HTTP request once the inner service has consumed it
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: Method,
    path: String,
    query_params: HashMap<String, String>,
    if_none_match: Option<String>,
    timestamp: u64,
}

impl RequestContext {
    /// Create a new RequestContext from HTTP request information
    /// Automatically generates a unique request ID (UUID v4) and captures current timestamp
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path: path.into(),
            query_params: HashMap::new(),
            if_none_match: None,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Capture the context from request parts before they are handed to the inner service
    pub fn from_parts(parts: &Parts) -> Self {
        let mut ctx = Self::new(parts.method.clone(), parts.uri.path());
        ctx.query_params = parse_query(parts.uri.query().unwrap_or(""));
        ctx.if_none_match = parts
            .headers
            .get(header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        ctx
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query_params = parse_query(query);
        self
    }

    pub fn with_if_none_match(mut self, value: impl Into<String>) -> Self {
        self.if_none_match = Some(value.into());
        self
    }

    /// Get the unique request ID
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request path (no query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the decoded query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Raw `If-None-Match` header value, if the client sent one
    pub fn if_none_match(&self) -> Option<&str> {
        self.if_none_match.as_deref()
    }

    /// Get the request timestamp (Unix epoch seconds)
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Parse a raw query string.
///
/// Keys and values are percent-decoded (`+` is a space). Keys are ASCII
/// lowercased, so `Width` and `width` name the same parameter. A key without
/// `=` maps to an empty value. When a key repeats, the first occurrence wins.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key).to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }
        params
            .entry(key)
            .or_insert_with(|| decode_component(value));
    }
    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
