//! API aggregator
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /aggregate ──▶ http ──▶ aggregate ──┬──▶ weather  ──▶ cache ──┐
//!                                           ├──▶ news     ───────────┤
//!                                           └──▶ playlist ──▶ cache ──┤
//!                                                                     ▼
//!   GET /statistics ──▶ http ──▶ stats ◀── timing ◀── retry ◀── reqwest ──▶ upstream APIs
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_aggregator::config::load_config;
use api_aggregator::lifecycle::{wait_for_signal, Shutdown};
use api_aggregator::observability::{logging, metrics};
use api_aggregator::HttpServer;

#[derive(Parser)]
#[command(name = "api-aggregator", version, about = "Weather, news and playlist aggregator")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-aggregator starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_ms = config.timeouts.upstream_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await?;
    shutdown.trigger();
    serving.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
