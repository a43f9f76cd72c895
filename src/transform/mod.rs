//! On-the-fly image transformation
//!
//! Resizes, crops and re-encodes images served under the media library and
//! content item asset routes, driven by query parameters:
//!
//! ```text
//! /getmedia/1f3c/photo.jpg?width=800&height=600&fit=cover&crop=north&format=webp
//! ```
//!
//! Responses that are not images, carry no dimension parameters or fail to
//! decode are served unchanged. Transformed responses carry a strong ETag so
//! repeat requests can be answered with `304 Not Modified` without decoding.

pub mod classifier;
pub mod codec;
pub mod config;
pub mod crop;
pub mod dimensions;
pub mod encoder;
pub mod error;
pub mod etag;
pub mod orchestrator;
pub mod params;
pub mod processor;

pub use codec::{Codec, ImageCodec};
pub use config::ImageConfig;
pub use error::ImageError;
pub use orchestrator::{
    ImageTransformer, PassThroughReason, RawImage, TransformOutcome, TransformedImage,
};
pub use params::{CropPosition, FitMode, ImageFormat, TransformRequest};
