// Constants module - centralized default values for configuration
//
// Every default used by the config layer lives here so the YAML
// defaults, the `Default` impls and the tests agree on one value.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default upstream request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Image processing defaults
// =============================================================================

/// Default maximum output width in pixels
pub const DEFAULT_MAX_WIDTH: u32 = 5000;

/// Default maximum output height in pixels
pub const DEFAULT_MAX_HEIGHT: u32 = 5000;

/// Default maximum value accepted for `maxSideSize`
pub const DEFAULT_MAX_SIDE_SIZE: u32 = 5000;

/// Default encoder quality for lossy formats (JPEG, WebP)
pub const DEFAULT_QUALITY: u8 = 80;

/// Route prefix served by the media library
pub const DEFAULT_MEDIA_LIBRARY_PREFIX: &str = "/getmedia";

/// Route prefix served for content item assets
pub const DEFAULT_CONTENT_ITEM_ASSET_PREFIX: &str = "/getContentAsset";

/// Largest origin body that will be buffered for transformation (50 MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Largest intermediate bitmap (width * height) a resize may allocate
pub const DEFAULT_MAX_RESIZE_PIXELS: u64 = 100_000_000;

// =============================================================================
// Response defaults
// =============================================================================

/// Cache-Control value for transformed images (one year, shared caches allowed)
pub const TRANSFORMED_CACHE_CONTROL: &str = "public, max-age=31536000";

// =============================================================================
// Logging defaults
// =============================================================================

/// Filter directive used when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "info";
