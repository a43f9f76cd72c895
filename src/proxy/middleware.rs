//! Image transformation middleware
//!
//! Wraps the inner service, lets it produce the origin response, and only
//! buffers the body when the response head says a transformation is possible.
//! Anything else is streamed through untouched.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{header, HeaderMap};
use tracing::{debug, Instrument};

use super::response_handler::{
    buffer_body, not_modified_response, passthrough_response, transformed_response,
    BufferedBody,
};
use crate::error::ProxyError;
use crate::pipeline::RequestContext;
use crate::transform::{ImageTransformer, PassThroughReason, RawImage, TransformOutcome};

/// Axum middleware driving [`ImageTransformer`] for one request
pub async fn image_transform_middleware(
    State(transformer): State<Arc<ImageTransformer>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let ctx = RequestContext::from_parts(&parts);
    let request = Request::from_parts(parts, body);

    if !transformer.wants(&ctx) {
        return next.run(request).await;
    }

    let span = tracing::debug_span!(
        "image_request",
        request_id = %ctx.request_id(),
        path = %ctx.path()
    );
    handle(transformer, ctx, request, next)
        .instrument(span)
        .await
}

async fn handle(
    transformer: Arc<ImageTransformer>,
    ctx: RequestContext,
    request: Request,
    next: Next,
) -> Response {
    transformer.metrics().increment_request_count();

    let response = next.run(request).await;

    let content_type = header_str(response.headers(), header::CONTENT_TYPE);
    let content_length = header_str(response.headers(), header::CONTENT_LENGTH)
        .and_then(|v| v.trim().parse::<u64>().ok());

    if let Err(reason) = transformer.screen(
        &ctx,
        response.status(),
        content_type.as_deref(),
        content_length,
    ) {
        debug!(reason = reason.as_str(), "Streaming origin response through");
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match buffer_body(body, transformer.config().max_body_size).await {
        Ok(BufferedBody::Complete(bytes)) => bytes,
        Ok(BufferedBody::Oversized(body)) => {
            transformer
                .metrics()
                .increment_passthrough(PassThroughReason::TooLarge.as_str());
            debug!("Origin body exceeds max_body_size, streaming through");
            return Response::from_parts(parts, body);
        }
        Err(e) => {
            return ProxyError::Upstream(format!("origin body failed: {}", e)).into_response();
        }
    };

    let image = RawImage {
        bytes: bytes.clone(),
        content_type: content_type.unwrap_or_default(),
        path: ctx.path().to_string(),
    };

    match transformer.transform(&ctx, parts.status, image).await {
        TransformOutcome::Transformed(image) => transformed_response(parts, image),
        TransformOutcome::NotModified { etag } => not_modified_response(&etag),
        TransformOutcome::PassThrough(_) => passthrough_response(parts, bytes),
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
