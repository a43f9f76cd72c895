//! Transformation parameter parsing
//!
//! Query parameters: `?width=800&height=600&maxSideSize=1200&format=webp&fit=cover&crop=north`
//!
//! Every parameter is optional. Malformed values never fail a request: a bad
//! number means "not specified", an unknown fit or crop falls back to its
//! default, and an unsupported format keeps the source format.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::config::ImageConfig;
use super::error::ImageError;

/// Image formats the proxy can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Match a MIME type against the supported set.
    ///
    /// Case-insensitive; media type parameters (`; charset=...`) are ignored and
    /// the legacy `image/jpg` alias is accepted.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Infer a format from a path's file extension
    pub fn from_extension(path: &str) -> Option<Self> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Normalize a `format` query value: `webp` becomes `image/webp`,
    /// `image/jpg` becomes `image/jpeg`.
    pub fn from_query_value(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.contains('/') {
            Self::from_mime(value)
        } else {
            Self::from_mime(&format!("image/{}", value))
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// How to reconcile the requested box with the original aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitMode {
    /// Scale to fit inside the box, preserving aspect ratio
    #[default]
    Contain = 0,
    /// Scale to cover the box, then crop the excess
    Cover = 1,
    /// Stretch to the exact box (may distort)
    Fill = 2,
}

impl FromStr for FitMode {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contain" => Ok(FitMode::Contain),
            "cover" => Ok(FitMode::Cover),
            "fill" => Ok(FitMode::Fill),
            _ => Err(ImageError::invalid_param(
                "fit",
                format!("unknown fit mode: {}", s),
            )),
        }
    }
}

/// Anchor of the kept region when `fit=cover` crops an oversized image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CropPosition {
    #[default]
    Center = 0,
    North = 1,
    South = 2,
    West = 3,
    East = 4,
    NorthWest = 5,
    NorthEast = 6,
    SouthWest = 7,
    SouthEast = 8,
}

/// Horizontal component of a crop anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAnchor {
    West,
    Center,
    East,
}

/// Vertical component of a crop anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    North,
    Center,
    South,
}

impl CropPosition {
    pub fn horizontal(&self) -> HorizontalAnchor {
        match self {
            Self::West | Self::NorthWest | Self::SouthWest => HorizontalAnchor::West,
            Self::East | Self::NorthEast | Self::SouthEast => HorizontalAnchor::East,
            Self::Center | Self::North | Self::South => HorizontalAnchor::Center,
        }
    }

    pub fn vertical(&self) -> VerticalAnchor {
        match self {
            Self::North | Self::NorthWest | Self::NorthEast => VerticalAnchor::North,
            Self::South | Self::SouthWest | Self::SouthEast => VerticalAnchor::South,
            Self::Center | Self::West | Self::East => VerticalAnchor::Center,
        }
    }
}

impl FromStr for CropPosition {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "center" => Ok(CropPosition::Center),
            "north" => Ok(CropPosition::North),
            "south" => Ok(CropPosition::South),
            "west" => Ok(CropPosition::West),
            "east" => Ok(CropPosition::East),
            "northwest" => Ok(CropPosition::NorthWest),
            "northeast" => Ok(CropPosition::NorthEast),
            "southwest" => Ok(CropPosition::SouthWest),
            "southeast" => Ok(CropPosition::SouthEast),
            _ => Err(ImageError::invalid_param(
                "crop",
                format!("unknown crop position: {}", s),
            )),
        }
    }
}

/// Validated, clamped transformation parameters for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub max_side_size: Option<u32>,
    /// Output format (the source format unless overridden)
    pub format: ImageFormat,
    pub fit: FitMode,
    pub crop: CropPosition,
}

impl TransformRequest {
    /// Resolve query parameters against the configured limits.
    ///
    /// Keys are expected lowercased, as [`crate::pipeline::parse_query`]
    /// produces them. Returns `None` when no dimension survives parsing,
    /// meaning the response should pass through untouched.
    pub fn resolve(
        query: &HashMap<String, String>,
        source_format: ImageFormat,
        config: &ImageConfig,
    ) -> Option<Self> {
        let width = parse_dimension(query.get("width")).map(|w| w.min(config.max_width));
        let height = parse_dimension(query.get("height")).map(|h| h.min(config.max_height));
        let max_side_size =
            parse_dimension(query.get("maxsidesize")).map(|m| m.min(config.max_side_size));

        if width.is_none() && height.is_none() && max_side_size.is_none() {
            return None;
        }

        let format = query
            .get("format")
            .and_then(|f| ImageFormat::from_query_value(f))
            .unwrap_or(source_format);

        let fit = query
            .get("fit")
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();

        let crop = query
            .get("crop")
            .and_then(|c| c.parse().ok())
            .unwrap_or_default();

        Some(Self {
            width,
            height,
            max_side_size,
            format,
            fit,
            crop,
        })
    }
}

/// Parse a pixel dimension; absent, non-numeric or non-positive means "not specified"
fn parse_dimension(value: Option<&String>) -> Option<u32> {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}
