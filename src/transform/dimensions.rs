//! Target dimension planning
//!
//! Pure functions: no decoding happens here, only arithmetic on the original
//! size and the resolved request.

use super::config::ImageConfig;
use super::crop::{plan_crop, Rect};
use super::params::{FitMode, TransformRequest};

/// Largest output size allowed on each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Bounds {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

impl From<&ImageConfig> for Bounds {
    fn from(config: &ImageConfig) -> Self {
        Self::new(config.max_width, config.max_height)
    }
}

/// Derived geometry for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Size the decoded bitmap is resized to
    pub resize_width: u32,
    pub resize_height: u32,
    /// Region of the resized bitmap to keep (`fit=cover` only)
    pub crop: Option<Rect>,
}

impl Geometry {
    /// Final output size after any crop
    pub fn output_size(&self) -> (u32, u32) {
        match self.crop {
            Some(rect) => (rect.width, rect.height),
            None => (self.resize_width, self.resize_height),
        }
    }
}

/// Compute target dimensions.
///
/// Priority: `max_side_size`, then width only, then height only, then the
/// width/height box according to `fit`. With nothing requested the original
/// size is returned. The result is never smaller than 1x1.
pub fn plan_dimensions(
    width: Option<u32>,
    height: Option<u32>,
    max_side_size: Option<u32>,
    original_width: u32,
    original_height: u32,
    fit: FitMode,
) -> (u32, u32) {
    let ow = original_width.max(1);
    let oh = original_height.max(1);

    if let Some(max_side) = max_side_size.filter(|m| *m > 0) {
        if ow.max(oh) <= max_side {
            return (ow, oh);
        }
        return if ow >= oh {
            (max_side, scale(oh, max_side, ow))
        } else {
            (scale(ow, max_side, oh), max_side)
        };
    }

    match (width.filter(|w| *w > 0), height.filter(|h| *h > 0)) {
        (Some(w), None) => (w, scale(oh, w, ow)),
        (None, Some(h)) => (scale(ow, h, oh), h),
        (Some(w), Some(h)) => {
            // w/ow vs h/oh, cross-multiplied to stay exact. The axis whose
            // ratio wins is pinned to the box and the other one is scaled.
            let width_ratio = w as u64 * oh as u64;
            let height_ratio = h as u64 * ow as u64;
            let fit_width = match fit {
                FitMode::Fill => return (w, h),
                FitMode::Cover => width_ratio >= height_ratio,
                FitMode::Contain => width_ratio <= height_ratio,
            };
            if fit_width {
                (w, scale(oh, w, ow))
            } else {
                (scale(ow, h, oh), h)
            }
        }
        (None, None) => (ow, oh),
    }
}

/// Shrink `(width, height)` uniformly until both axes are within `bounds`.
///
/// Sizes already inside the bounds are returned unchanged.
pub fn fit_within(width: u32, height: u32, bounds: Bounds) -> (u32, u32) {
    let max_width = bounds.max_width.max(1);
    let max_height = bounds.max_height.max(1);
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    // max_width/width vs max_height/height; the smaller ratio wins
    let width_ratio = max_width as u64 * height.max(1) as u64;
    let height_ratio = max_height as u64 * width.max(1) as u64;
    if width_ratio <= height_ratio {
        (max_width, scale(height, max_width, width))
    } else {
        (scale(width, max_height, height), max_height)
    }
}

/// Compute the full geometry (resize size plus optional crop) for a request.
///
/// Without a crop the output is kept inside `bounds`: a width-only request on
/// a very tall source must not derive an unbounded height. With `fit=cover`
/// the crop is never larger than the (already clamped) requested box.
pub fn plan_geometry(
    request: &TransformRequest,
    original_width: u32,
    original_height: u32,
    bounds: Bounds,
) -> Geometry {
    let (resize_width, resize_height) = plan_dimensions(
        request.width,
        request.height,
        request.max_side_size,
        original_width,
        original_height,
        request.fit,
    );

    let crop = match (request.fit, request.width, request.height, request.max_side_size) {
        (FitMode::Cover, Some(w), Some(h), None) => {
            let rect = plan_crop(resize_width, resize_height, w, h, request.crop);
            (rect != Rect::full(resize_width, resize_height)).then_some(rect)
        }
        _ => None,
    };

    let (resize_width, resize_height) = match crop {
        Some(_) => (resize_width, resize_height),
        None => fit_within(resize_width, resize_height, bounds),
    };

    Geometry {
        resize_width,
        resize_height,
        crop,
    }
}

/// `value * numerator / denominator`, truncated, at least 1
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = value as f64 * numerator as f64 / denominator.max(1) as f64;
    (scaled as u32).max(1)
}
