use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONTENT_ITEM_ASSET_PREFIX, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEIGHT,
    DEFAULT_MAX_RESIZE_PIXELS, DEFAULT_MAX_SIDE_SIZE, DEFAULT_MAX_WIDTH, DEFAULT_MEDIA_LIBRARY_PREFIX, DEFAULT_QUALITY,
};

/// Process-wide image transformation settings.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ImageConfig {
    /// Global switch; when false every response passes through
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Transform images served under the media library prefix
    #[serde(default = "default_true")]
    pub process_media_library: bool,

    /// Transform images served under the content item asset prefix
    #[serde(default = "default_true")]
    pub process_content_item_assets: bool,

    #[serde(default = "default_media_library_prefix")]
    pub media_library_prefix: String,

    #[serde(default = "default_content_item_asset_prefix")]
    pub content_item_asset_prefix: String,

    /// Requested widths above this are capped
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Requested heights above this are capped
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Requested `maxSideSize` values above this are capped
    #[serde(default = "default_max_side_size")]
    pub max_side_size: u32,

    /// Quality for lossy formats (JPEG, WebP), 1-100
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Origin bodies larger than this are never buffered for transformation
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Resize targets with more pixels than this fail instead of allocating
    #[serde(default = "default_max_resize_pixels")]
    pub max_resize_pixels: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            process_media_library: true,
            process_content_item_assets: true,
            media_library_prefix: default_media_library_prefix(),
            content_item_asset_prefix: default_content_item_asset_prefix(),
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            max_side_size: DEFAULT_MAX_SIDE_SIZE,
            quality: DEFAULT_QUALITY,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_resize_pixels: DEFAULT_MAX_RESIZE_PIXELS,
        }
    }
}

impl ImageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.quality) {
            return Err(format!(
                "image_processing.quality must be between 1 and 100, got {}",
                self.quality
            ));
        }

        for (name, value) in [
            ("max_width", self.max_width),
            ("max_height", self.max_height),
            ("max_side_size", self.max_side_size),
        ] {
            if value == 0 {
                return Err(format!("image_processing.{} must be greater than 0", name));
            }
        }

        if self.max_resize_pixels == 0 {
            return Err("image_processing.max_resize_pixels must be greater than 0".to_string());
        }

        for (name, prefix) in [
            ("media_library_prefix", &self.media_library_prefix),
            ("content_item_asset_prefix", &self.content_item_asset_prefix),
        ] {
            if !prefix.starts_with('/') {
                return Err(format!(
                    "image_processing.{} '{}' does not start with /",
                    name, prefix
                ));
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_media_library_prefix() -> String {
    DEFAULT_MEDIA_LIBRARY_PREFIX.to_string()
}

fn default_content_item_asset_prefix() -> String {
    DEFAULT_CONTENT_ITEM_ASSET_PREFIX.to_string()
}

fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

fn default_max_height() -> u32 {
    DEFAULT_MAX_HEIGHT
}

fn default_max_side_size() -> u32 {
    DEFAULT_MAX_SIDE_SIZE
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_max_resize_pixels() -> u64 {
    DEFAULT_MAX_RESIZE_PIXELS
}
