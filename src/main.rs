//! Health-aware reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                    HEALTHGATE                         │
//!                     │                                                       │
//!   Client Request    │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │───▶│ dispatcher │───▶│   selector   │   │
//!                     │  │ server  │    │  + retry   │    │ (snapshot)   │   │
//!                     │  └─────────┘    └─────┬──────┘    └──────┬───────┘   │
//!                     │                       │                  │           │
//!                     │                       ▼                  ▼           │
//!   Client Response   │                ┌────────────┐    ┌──────────────┐   │
//!   ◀─────────────────┼────────────────│  upstream  │    │   registry   │◀──┼── health probe
//!                     │                │   client   │    │ (mutex map)  │   │   (every interval)
//!                     │                └─────┬──────┘    └──────┬───────┘   │
//!                     │                      │                  │           │
//!                     │                      ▼                  ▼           │
//!                     │                  Backends         /admin/* reports  │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use healthgate::config::{load_config, validation::validate_config, ProxyConfig};
use healthgate::lifecycle::signals::forward_signals;
use healthgate::observability::{logging, metrics};
use healthgate::{ConfigError, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "healthgate")]
#[command(about = "Health-aware load-balancing reverse proxy", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long, env = "HEALTHGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("healthgate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = ?config.backends.0,
        max_attempts = config.retries.max_attempts,
        probe_interval_secs = config.health_check.interval_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    forward_signals(shutdown.clone());

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
