//! Response handler module for the proxy.
//!
//! Buffers origin bodies for the transformer and builds the responses it
//! decides on.
//!
//! # Design
//!
//! Functions take the response head as `Parts` and return a finished
//! `Response`, so the middleware only sequences them.

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::response::Parts;
use http::StatusCode;

use crate::constants::TRANSFORMED_CACHE_CONTROL;
use crate::transform::TransformedImage;

/// Headers describing the origin body; invalid once the body is replaced
const STALE_BODY_HEADERS: [HeaderName; 8] = [
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::ETAG,
    header::LAST_MODIFIED,
    header::CONTENT_DISPOSITION,
    header::CACHE_CONTROL,
    header::ACCEPT_RANGES,
    header::TRANSFER_ENCODING,
];

// ============================================================================
// Result Types
// ============================================================================

/// Result of buffering a response chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferResult {
    /// Chunk was successfully buffered.
    Buffered {
        /// New total buffer size after adding chunk.
        total_size: usize,
    },
    /// Response exceeded max size, buffering disabled.
    ExceededMaxSize {
        /// Size that would have been reached.
        attempted_size: usize,
    },
    /// No chunk to buffer (empty frame).
    Empty,
}

/// Outcome of reading an origin body into memory
pub enum BufferedBody {
    /// The whole body, within the size limit
    Complete(Bytes),
    /// The limit was hit; this body replays what was read and streams the rest
    Oversized(Body),
}

// ============================================================================
// Response Buffering Functions
// ============================================================================

/// Buffer a response chunk, checking against the max size.
///
/// A chunk that would push the buffer past `max_size` is not appended.
pub fn buffer_response_chunk(buffer: &mut Vec<u8>, chunk: &[u8], max_size: usize) -> BufferResult {
    if chunk.is_empty() {
        return BufferResult::Empty;
    }

    let new_size = buffer.len() + chunk.len();

    if new_size <= max_size {
        buffer.extend_from_slice(chunk);
        BufferResult::Buffered {
            total_size: new_size,
        }
    } else {
        BufferResult::ExceededMaxSize {
            attempted_size: new_size,
        }
    }
}

/// Read a body into memory, up to `max_size` bytes.
///
/// Errors are origin failures (connection reset mid-body and the like).
pub async fn buffer_body(body: Body, max_size: usize) -> Result<BufferedBody, axum::Error> {
    let mut frames = body.into_data_stream();
    let mut buffer = Vec::new();

    while let Some(chunk) = frames.next().await {
        let chunk = chunk?;
        if let BufferResult::ExceededMaxSize { .. } =
            buffer_response_chunk(&mut buffer, &chunk, max_size)
        {
            let read = Bytes::from(std::mem::take(&mut buffer));
            let replay = stream::iter([Ok::<_, axum::Error>(read), Ok(chunk)]);
            return Ok(BufferedBody::Oversized(Body::from_stream(replay.chain(frames))));
        }
    }

    Ok(BufferedBody::Complete(Bytes::from(buffer)))
}

// ============================================================================
// Response Builders
// ============================================================================

/// Origin response head with a transformed body.
///
/// Origin headers are kept except those describing the old body.
pub fn transformed_response(mut parts: Parts, image: TransformedImage) -> Response {
    for name in STALE_BODY_HEADERS.iter() {
        parts.headers.remove(name);
    }

    let headers = &mut parts.headers;
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(image.format.content_type()),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(image.data.len()));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(TRANSFORMED_CACHE_CONTROL),
    );
    insert_etag(headers, &image.etag);
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&image.file_name, image.format.extension()),
    );

    Response::from_parts(parts, Body::from(image.data))
}

/// Bare 304 carrying only the entity tag
pub fn not_modified_response(etag: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_MODIFIED;
    insert_etag(response.headers_mut(), etag);
    response
}

/// Origin response rebuilt from its head and the bytes already read
pub fn passthrough_response(parts: Parts, bytes: Bytes) -> Response {
    Response::from_parts(parts, Body::from(bytes))
}

fn insert_etag(headers: &mut HeaderMap, etag: &str) {
    // Base64 inside quotes is always a valid header value
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert(header::ETAG, value);
    }
}

/// `inline; filename=<name>`, falling back to a generic name when the path
/// segment cannot be carried in a header
fn content_disposition(file_name: &str, extension: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("inline; filename={}", file_name)).unwrap_or_else(|_| {
        HeaderValue::from_str(&format!("inline; filename=image.{}", extension))
            .unwrap_or_else(|_| HeaderValue::from_static("inline"))
    })
}

// ============================================================================
// Tests
// ============================================================================
