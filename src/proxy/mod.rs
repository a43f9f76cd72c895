// Proxy module - axum router in front of the origin content server
// Forwards everything to the origin and rewrites eligible image responses

pub mod middleware;
pub mod response_handler;
pub mod special_endpoints;
pub mod upstream;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::get;
use axum::Router;

use crate::config::Config;
use crate::error::ProxyError;
use crate::metrics::Metrics;
use crate::transform::ImageTransformer;

pub use middleware::image_transform_middleware;
pub use upstream::Origin;

/// Shared state for the local endpoints and the origin fallback
#[derive(Clone)]
pub struct AppState {
    pub origin: Origin,
    pub metrics: Arc<Metrics>,
    /// Proxy start time (for uptime in /health)
    pub started_at: Instant,
}

/// Build the full application from configuration
pub fn build_app(config: &Config, metrics: Arc<Metrics>) -> Result<Router, ProxyError> {
    let origin = Origin::new(
        &config.origin,
        Duration::from_secs(config.server.request_timeout),
    )?;
    let transformer = Arc::new(ImageTransformer::new(
        Arc::new(config.image_processing.clone()),
        Arc::clone(&metrics),
    ));

    Ok(router(origin, transformer, metrics))
}

/// Assemble routes around an already-built origin and transformer
pub fn router(origin: Origin, transformer: Arc<ImageTransformer>, metrics: Arc<Metrics>) -> Router {
    let state = AppState {
        origin,
        metrics,
        started_at: Instant::now(),
    };

    Router::new()
        .route("/health", get(special_endpoints::health))
        .route("/metrics", get(special_endpoints::metrics))
        .fallback(upstream::forward_to_origin)
        .layer(axum::middleware::from_fn_with_state(
            transformer,
            image_transform_middleware,
        ))
        .with_state(state)
}
