//! Cache validation
//!
//! The fingerprint identifies "these source bytes transformed with these
//! parameters", so it can be checked against `If-None-Match` before any
//! decoding happens.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use super::params::TransformRequest;

/// Derive the fingerprint for a source body and resolved request.
///
/// SHA-256 over the raw bytes, then width, height and max side size as
/// u32 little-endian (0 when absent), the fit and crop discriminants as u32
/// little-endian, and the output content type. Base64 encoded.
pub fn fingerprint(bytes: &[u8], request: &TransformRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    for value in [
        request.width.unwrap_or(0),
        request.height.unwrap_or(0),
        request.max_side_size.unwrap_or(0),
        request.fit as u32,
        request.crop as u32,
    ] {
        hasher.update(value.to_le_bytes());
    }
    hasher.update(request.format.content_type().as_bytes());

    STANDARD.encode(hasher.finalize())
}

/// Strong entity tag header value for a fingerprint
pub fn etag_header_value(fingerprint: &str) -> String {
    format!("\"{}\"", fingerprint)
}

/// Byte-exact comparison of the client's `If-None-Match` with our ETag.
///
/// Lists and weak validators are not interpreted.
pub fn matches_if_none_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|value| value == etag)
}
