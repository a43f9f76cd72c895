// Utsushi image transformation proxy library

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod proxy;
pub mod server;
pub mod transform;
