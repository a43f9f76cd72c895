//! Crop rectangle planning for `fit=cover`

use super::params::{CropPosition, HorizontalAnchor, VerticalAnchor};

/// Pixel rectangle inside a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` bitmap
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Compute the region of a resized image to keep so it fits the target box.
///
/// When the resized image does not exceed the box on either axis the whole
/// image is returned.
pub fn plan_crop(
    resized_width: u32,
    resized_height: u32,
    target_width: u32,
    target_height: u32,
    anchor: CropPosition,
) -> Rect {
    if resized_width <= target_width && resized_height <= target_height {
        return Rect::full(resized_width, resized_height);
    }

    let crop_width = resized_width.min(target_width);
    let crop_height = resized_height.min(target_height);
    let spare_x = resized_width - crop_width;
    let spare_y = resized_height - crop_height;

    let x = match anchor.horizontal() {
        HorizontalAnchor::West => 0,
        HorizontalAnchor::East => spare_x,
        HorizontalAnchor::Center => spare_x / 2,
    };
    let y = match anchor.vertical() {
        VerticalAnchor::North => 0,
        VerticalAnchor::South => spare_y,
        VerticalAnchor::Center => spare_y / 2,
    };

    Rect::new(x, y, crop_width, crop_height)
}
