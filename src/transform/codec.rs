//! Codec adapter
//!
//! Decode, resize, crop and encode behind a small trait so the orchestrator
//! can be driven by a mock in tests.

use std::io::Cursor;
use std::num::NonZeroU32;

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::DynamicImage;

use super::crop::Rect;
use super::encoder::{EncoderFactory, EncoderQuality};
use super::error::ImageError;
use super::params::ImageFormat;

/// Decoded pixel buffer passed between stages
pub type Bitmap = DynamicImage;

/// Image codec operations used by the transformation pipeline
#[cfg_attr(test, mockall::automock)]
pub trait Codec: Send + Sync {
    /// Decode encoded bytes. Empty or undecodable input is an error.
    fn decode(&self, data: &[u8]) -> Result<Bitmap, ImageError>;

    /// Resize to exactly `width` x `height`
    fn resize(&self, bitmap: &Bitmap, width: u32, height: u32) -> Result<Bitmap, ImageError>;

    /// Extract `rect`; the rectangle must lie inside the bitmap
    fn crop(&self, bitmap: &Bitmap, rect: Rect) -> Bitmap;

    /// Encode to `format`; `quality` is clamped to 1..=100
    fn encode(&self, bitmap: &Bitmap, format: ImageFormat, quality: u8)
        -> Result<Vec<u8>, ImageError>;
}

/// Codec backed by the `image`, `fast_image_resize` and `webp` crates
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, data: &[u8]) -> Result<Bitmap, ImageError> {
        if data.is_empty() {
            return Err(ImageError::decode_failed("empty input"));
        }

        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImageError::decode_failed(e.to_string()))?
            .decode()
            .map_err(|e| ImageError::decode_failed(e.to_string()))
    }

    /// Lanczos3 convolution via fast-image-resize
    fn resize(&self, bitmap: &Bitmap, width: u32, height: u32) -> Result<Bitmap, ImageError> {
        let src_width = NonZeroU32::new(bitmap.width())
            .ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
        let src_height = NonZeroU32::new(bitmap.height())
            .ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
        let dst_width =
            NonZeroU32::new(width).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
        let dst_height = NonZeroU32::new(height)
            .ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

        let src_image = Image::from_vec_u8(
            src_width,
            src_height,
            bitmap.to_rgba8().into_raw(),
            PixelType::U8x4,
        )
        .map_err(|e| {
            ImageError::resize_failed(format!("Failed to create source image: {:?}", e))
        })?;

        let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

        Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3))
            .resize(&src_image.view(), &mut dst_image.view_mut())
            .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

        let rgba = image::RgbaImage::from_raw(width, height, dst_image.into_vec())
            .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn crop(&self, bitmap: &Bitmap, rect: Rect) -> Bitmap {
        bitmap.crop_imm(rect.x, rect.y, rect.width, rect.height)
    }

    fn encode(
        &self,
        bitmap: &Bitmap,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, ImageError> {
        let rgba = bitmap.to_rgba8();
        EncoderFactory::create(format).encode(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            EncoderQuality::with_quality(quality),
        )
    }
}
