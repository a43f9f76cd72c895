//! Transformation pipeline: decode → plan → resize → crop → encode

use super::codec::Codec;
use super::config::ImageConfig;
use super::dimensions::{plan_geometry, Bounds};
use super::error::ImageError;
use super::params::{ImageFormat, TransformRequest};

/// Result of a completed transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// Encoded output bytes
    pub data: Vec<u8>,
    /// Original dimensions (width, height)
    pub original_size: (u32, u32),
    /// Output dimensions (width, height)
    pub output_size: (u32, u32),
}

/// Run every stage for one request.
///
/// Returns `Ok(None)` when the planned output is the source itself (same
/// size, no crop, same format); the caller should serve the original bytes.
///
/// `cancelled` is polled between stages; once it reports true the pipeline
/// stops with [`ImageError::Cancelled`] and drops whatever it holds.
pub fn process_image(
    codec: &dyn Codec,
    data: &[u8],
    request: &TransformRequest,
    source_format: ImageFormat,
    config: &ImageConfig,
    cancelled: &dyn Fn() -> bool,
) -> Result<Option<ProcessedImage>, ImageError> {
    let checkpoint = || {
        if cancelled() {
            Err(ImageError::Cancelled)
        } else {
            Ok(())
        }
    };

    checkpoint()?;
    let decoded = codec.decode(data)?;
    let original_size = (decoded.width(), decoded.height());

    let geometry = plan_geometry(
        request,
        original_size.0,
        original_size.1,
        Bounds::from(config),
    );
    let resize_size = (geometry.resize_width, geometry.resize_height);
    if resize_size == original_size && geometry.crop.is_none() && request.format == source_format {
        return Ok(None);
    }

    let pixels = resize_size.0 as u64 * resize_size.1 as u64;
    if pixels > config.max_resize_pixels {
        return Err(ImageError::resize_failed(format!(
            "{}x{} exceeds the {} pixel resize budget",
            resize_size.0, resize_size.1, config.max_resize_pixels
        )));
    }

    checkpoint()?;
    let resized = if resize_size != original_size {
        let resized = codec.resize(&decoded, resize_size.0, resize_size.1)?;
        drop(decoded);
        resized
    } else {
        decoded
    };

    checkpoint()?;
    let output = match geometry.crop {
        Some(rect) => codec.crop(&resized, rect),
        None => resized,
    };
    let output_size = (output.width(), output.height());

    checkpoint()?;
    let data = codec.encode(&output, request.format, config.quality)?;

    Ok(Some(ProcessedImage {
        data,
        original_size,
        output_size,
    }))
}
