//! Request classification: which responses are candidates for transformation

use http::{Method, StatusCode};

use super::config::ImageConfig;
use super::params::ImageFormat;

/// Declared content type that says nothing about the payload
const GENERIC_BINARY: &str = "application/octet-stream";

/// Check whether `path` starts with `prefix` on a whole-segment boundary.
///
/// ASCII case-insensitive: `/getmedia` matches `/GetMedia/x.jpg` and
/// `/getmedia`, but not `/getmediax`.
pub fn starts_with_segments(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    if path.len() < prefix.len() || !path.is_char_boundary(prefix.len()) {
        return false;
    }

    let (head, rest) = path.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix) && (rest.is_empty() || rest.starts_with('/'))
}

/// Whether the path falls under an enabled image route
pub fn is_eligible_path(path: &str, config: &ImageConfig) -> bool {
    (config.process_media_library && starts_with_segments(path, &config.media_library_prefix))
        || (config.process_content_item_assets
            && starts_with_segments(path, &config.content_item_asset_prefix))
}

/// Whether the request/response pair can carry a transformable body.
///
/// Only successful GETs are considered; HEAD, errors and redirects pass through.
pub fn is_eligible_exchange(method: &Method, status: StatusCode) -> bool {
    method == Method::GET && status == StatusCode::OK
}

/// Determine the source image format.
///
/// The declared content type wins; when it is missing or generic binary the
/// path extension is used instead. Anything outside the supported set is
/// not an image as far as the proxy is concerned.
pub fn source_format(content_type: Option<&str>, path: &str) -> Option<ImageFormat> {
    match content_type.map(str::trim).filter(|ct| !ct.is_empty()) {
        Some(ct) if !is_generic_binary(ct) => ImageFormat::from_mime(ct),
        _ => ImageFormat::from_extension(path),
    }
}

fn is_generic_binary(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(GENERIC_BINARY))
        .unwrap_or(false)
}
