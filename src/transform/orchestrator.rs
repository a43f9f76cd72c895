//! Transformation orchestrator
//!
//! Framework-agnostic decision logic for one buffered origin response:
//! classify, resolve parameters, short-circuit on a matching validator, and
//! otherwise run the codec pipeline on the rayon pool. Every failure path
//! degrades to serving the original bytes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::StatusCode;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::classifier::{is_eligible_exchange, is_eligible_path, source_format};
use super::codec::{Codec, ImageCodec};
use super::config::ImageConfig;
use super::error::ImageError;
use super::etag::{etag_header_value, fingerprint, matches_if_none_match};
use super::params::{ImageFormat, TransformRequest};
use super::processor::{process_image, ProcessedImage};
use crate::metrics::Metrics;
use crate::pipeline::RequestContext;

/// Buffered origin response body plus what is known about it
#[derive(Debug, Clone)]
pub struct RawImage {
    pub bytes: Bytes,
    /// Declared `Content-Type`; empty when the origin sent none
    pub content_type: String,
    /// Request path, used for extension fallback and the output file name
    pub path: String,
}

/// Why a response was served unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThroughReason {
    Disabled,
    /// Not a GET, not a 200, or outside the image routes
    NotEligible,
    NotImage,
    NoParameters,
    TooLarge,
    /// The planned output is the source image itself
    Unchanged,
    Failed,
}

impl PassThroughReason {
    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::NotEligible => "not_eligible",
            Self::NotImage => "not_image",
            Self::NoParameters => "no_params",
            Self::TooLarge => "too_large",
            Self::Unchanged => "unchanged",
            Self::Failed => "failed",
        }
    }
}

/// A transformed body ready to be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedImage {
    pub data: Bytes,
    pub format: ImageFormat,
    /// Quoted strong entity tag
    pub etag: String,
    /// `<stem>.<ext>` for `Content-Disposition`
    pub file_name: String,
    pub output_size: (u32, u32),
}

/// Result of running the orchestrator over one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    PassThrough(PassThroughReason),
    NotModified { etag: String },
    Transformed(TransformedImage),
}

/// Shared, immutable transformation service
#[derive(Clone)]
pub struct ImageTransformer {
    config: Arc<ImageConfig>,
    codec: Arc<dyn Codec>,
    metrics: Arc<Metrics>,
}

impl ImageTransformer {
    pub fn new(config: Arc<ImageConfig>, metrics: Arc<Metrics>) -> Self {
        Self::with_codec(config, Arc::new(ImageCodec), metrics)
    }

    pub fn with_codec(config: Arc<ImageConfig>, codec: Arc<dyn Codec>, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            codec,
            metrics,
        }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Cheap pre-check on the request alone: is it worth buffering the response?
    pub fn wants(&self, ctx: &RequestContext) -> bool {
        self.config.enabled
            && *ctx.method() == http::Method::GET
            && is_eligible_path(ctx.path(), &self.config)
    }

    /// Decide from the response head alone whether the body is worth buffering.
    ///
    /// On `Err` the response should be streamed through untouched; the reason
    /// has already been counted.
    pub fn screen(
        &self,
        ctx: &RequestContext,
        status: StatusCode,
        content_type: Option<&str>,
        content_length: Option<u64>,
    ) -> Result<(), PassThroughReason> {
        match self.screen_head(ctx, status, content_type, content_length) {
            Ok(_) => Ok(()),
            Err(reason) => {
                self.metrics.increment_passthrough(reason.as_str());
                Err(reason)
            }
        }
    }

    fn screen_head(
        &self,
        ctx: &RequestContext,
        status: StatusCode,
        content_type: Option<&str>,
        content_length: Option<u64>,
    ) -> Result<(ImageFormat, TransformRequest), PassThroughReason> {
        if !self.config.enabled {
            return Err(PassThroughReason::Disabled);
        }
        if !is_eligible_exchange(ctx.method(), status) || !is_eligible_path(ctx.path(), &self.config)
        {
            return Err(PassThroughReason::NotEligible);
        }
        let source =
            source_format(content_type, ctx.path()).ok_or(PassThroughReason::NotImage)?;
        if content_length.is_some_and(|len| len > self.config.max_body_size as u64) {
            return Err(PassThroughReason::TooLarge);
        }
        TransformRequest::resolve(ctx.query_params(), source, &self.config)
            .map(|request| (source, request))
            .ok_or(PassThroughReason::NoParameters)
    }

    /// Decide what to send for one buffered origin response
    pub async fn transform(
        &self,
        ctx: &RequestContext,
        status: StatusCode,
        image: RawImage,
    ) -> TransformOutcome {
        let outcome = self.run(ctx, status, image).await;
        match &outcome {
            TransformOutcome::PassThrough(reason) => {
                self.metrics.increment_passthrough(reason.as_str());
            }
            TransformOutcome::NotModified { .. } => self.metrics.increment_not_modified(),
            TransformOutcome::Transformed(_) => {}
        }
        outcome
    }

    async fn run(&self, ctx: &RequestContext, status: StatusCode, image: RawImage) -> TransformOutcome {
        let content_length = image.bytes.len() as u64;
        let (source, request) = match self.screen_head(
            ctx,
            status,
            Some(image.content_type.as_str()),
            Some(content_length),
        ) {
            Ok(screened) => screened,
            Err(reason) => return TransformOutcome::PassThrough(reason),
        };

        let etag = etag_header_value(&fingerprint(&image.bytes, &request));
        if matches_if_none_match(ctx.if_none_match(), &etag) {
            debug!(request_id = %ctx.request_id(), path = %image.path, "ETag matched, 304");
            return TransformOutcome::NotModified { etag };
        }

        match self
            .process_off_reactor(image.bytes.clone(), request, source)
            .await
        {
            Ok((None, _)) => {
                debug!(
                    request_id = %ctx.request_id(),
                    path = %image.path,
                    "Requested geometry and format match the source, serving original"
                );
                TransformOutcome::PassThrough(PassThroughReason::Unchanged)
            }
            Ok((Some(processed), elapsed)) => {
                let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                self.metrics
                    .record_transformed(image.bytes.len(), processed.data.len(), elapsed_ms);
                debug!(
                    request_id = %ctx.request_id(),
                    path = %image.path,
                    from = ?processed.original_size,
                    to = ?processed.output_size,
                    format = %request.format,
                    bytes_in = image.bytes.len(),
                    bytes_out = processed.data.len(),
                    elapsed_ms,
                    "Image transformed"
                );
                TransformOutcome::Transformed(TransformedImage {
                    file_name: output_file_name(&image.path, request.format),
                    output_size: processed.output_size,
                    data: Bytes::from(processed.data),
                    format: request.format,
                    etag,
                })
            }
            Err(e) => {
                self.metrics.increment_failure(e.stage());
                warn!(
                    request_id = %ctx.request_id(),
                    path = %image.path,
                    operation = e.stage(),
                    error = %e,
                    "Image transformation failed, serving original"
                );
                TransformOutcome::PassThrough(PassThroughReason::Failed)
            }
        }
    }

    /// Run the codec pipeline on the rayon pool and await it.
    ///
    /// Dropping the returned future closes the channel, which the worker
    /// notices at its next stage boundary.
    async fn process_off_reactor(
        &self,
        bytes: Bytes,
        request: TransformRequest,
        source: ImageFormat,
    ) -> Result<(Option<ProcessedImage>, Duration), ImageError> {
        let (tx, rx) = oneshot::channel();
        let codec = Arc::clone(&self.codec);
        let config = Arc::clone(&self.config);

        rayon::spawn(move || {
            let started = Instant::now();
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                process_image(
                    codec.as_ref(),
                    &bytes,
                    &request,
                    source,
                    &config,
                    &|| tx.is_closed(),
                )
            }));
            // A panicking codec drops the sender; the receiver sees it as a failure
            if let Ok(result) = result {
                let _ = tx.send(result.map(|processed| (processed, started.elapsed())));
            }
        });

        rx.await
            .unwrap_or_else(|_| Err(ImageError::decode_failed("codec worker panicked")))
    }
}

/// `Content-Disposition` file name: last path segment without its extension,
/// `image` when that is empty, plus the output extension.
pub fn output_file_name(path: &str, format: ImageFormat) -> String {
    let segment = path.rsplit('/').next().unwrap_or("");
    let stem = match segment.rfind('.') {
        Some(idx) => &segment[..idx],
        None => segment,
    };
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{}.{}", stem, format.extension())
}
