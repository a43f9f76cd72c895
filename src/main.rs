use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use utsushi::config::Config;

/// Utsushi - on-the-fly image resizing, cropping and re-encoding proxy
#[derive(Parser, Debug)]
#[command(name = "utsushi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    config
        .validate()
        .map_err(|e| anyhow!(e))
        .context("Invalid configuration")?;

    utsushi::logging::init_subscriber(config.server.log_format)
        .context("Failed to initialize logging subsystem")?;

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        origin = %config.origin.url,
        transform_enabled = config.image_processing.enabled,
        "Configuration loaded successfully"
    );

    if args.test {
        tracing::info!("Configuration test passed");
        return Ok(());
    }

    utsushi::server::run(&config).await?;
    Ok(())
}
