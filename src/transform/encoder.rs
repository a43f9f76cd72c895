//! Output encoders
//!
//! One encoder per supported output format, all taking raw RGBA pixels:
//! - JPEG and WebP are lossy and honor the configured quality
//! - PNG is lossless and ignores it

use std::io::Cursor;

use super::error::ImageError;
use super::params::ImageFormat;

/// Quality settings for lossy encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self {
            quality: crate::constants::DEFAULT_QUALITY,
        }
    }
}

impl EncoderQuality {
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Trait for image encoders
///
/// Object-safe so the factory can hand out boxed encoders per format.
pub trait ImageEncoder: Send + Sync {
    /// Encode raw RGBA pixels (4 bytes per pixel)
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<Vec<u8>, ImageError>;
}

/// JPEG encoder using the image crate
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<Vec<u8>, ImageError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;

        // JPEG has no alpha channel
        let rgb_data = rgba_to_rgb(data);

        let mut output = Cursor::new(Vec::new());
        ImageJpegEncoder::new_with_quality(&mut output, quality.quality)
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8)
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: EncoderQuality,
    ) -> Result<Vec<u8>, ImageError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImagePngEncoder::new(&mut output)
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// Lossy WebP encoder backed by libwebp (`webp` crate).
///
/// The image crate can only write lossless WebP, which would ignore quality.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<Vec<u8>, ImageError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ImageError::encode_failed(
                "webp",
                format!("expected {} bytes of RGBA, got {}", expected, data.len()),
            ));
        }

        let memory = webp::Encoder::from_rgba(data, width, height)
            .encode_simple(false, quality.quality as f32)
            .map_err(|e| ImageError::encode_failed("webp", format!("{:?}", e)))?;

        Ok(memory.to_vec())
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: ImageFormat) -> Box<dyn ImageEncoder> {
        match format {
            ImageFormat::Jpeg => Box::new(JpegEncoder),
            ImageFormat::Png => Box::new(PngEncoder),
            ImageFormat::WebP => Box::new(WebPEncoder),
        }
    }
}

/// Convert RGBA to RGB by discarding the alpha channel
fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for chunk in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }
    rgb
}
