// Logging module for structured logging using the tracing crate

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::constants::DEFAULT_LOG_FILTER;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },
}

/// Build the event filter from a `RUST_LOG`-style directive, `info` when absent
pub fn build_filter(directive: Option<&str>) -> Result<EnvFilter, LoggingError> {
    match directive.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive).map_err(|source| {
            LoggingError::InvalidFilter {
                directive: directive.to_string(),
                source,
            }
        }),
        None => Ok(EnvFilter::new(DEFAULT_LOG_FILTER)),
    }
}

/// Initialize the global tracing subscriber.
///
/// Events go to stdout, filtered by `RUST_LOG`. With [`LogFormat::Json`]
/// each event is a single JSON object.
///
/// Calling this again after a subscriber is installed is a no-op, so tests
/// can call it freely.
///
/// # Examples
///
/// ```
/// use utsushi::config::LogFormat;
/// use utsushi::logging::init_subscriber;
///
/// init_subscriber(LogFormat::Text).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(format: LogFormat) -> Result<(), LoggingError> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.try_init().is_ok(),
    };

    if !installed {
        tracing::debug!("Tracing subscriber already installed, keeping it");
    }

    Ok(())
}
