//! Image transformation error types
//!
//! Every variant here is recoverable from the middleware's point of view:
//! the orchestrator logs it and serves the original bytes instead.

use std::fmt;

/// Errors that can occur while transforming an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    // === Codec Errors ===
    /// Input bytes are empty or not a decodable image
    DecodeFailed { message: String },
    /// Resize operation failed (zero target or allocation failure)
    ResizeFailed { message: String },
    /// Encoding to the output format failed
    EncodeFailed { format: String, message: String },

    // === Parameter Errors ===
    /// A query value could not be parsed
    InvalidParameter { param: String, message: String },

    // === Scheduling ===
    /// The client went away before the transformation finished
    Cancelled,
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            ImageError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            ImageError::InvalidParameter { param, message } => {
                write!(f, "Invalid parameter '{}': {}", param, message)
            }
            ImageError::Cancelled => write!(f, "Transformation cancelled"),
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    /// Pipeline stage that produced the error, used as a log/metric label
    pub fn stage(&self) -> &'static str {
        match self {
            ImageError::DecodeFailed { .. } => "decode",
            ImageError::ResizeFailed { .. } => "resize",
            ImageError::EncodeFailed { .. } => "encode",
            ImageError::InvalidParameter { .. } => "params",
            ImageError::Cancelled => "cancelled",
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn invalid_param(param: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
