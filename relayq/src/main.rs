//! relayq - minimal keyed FIFO message queue with HTTP long-polling
//!
//! Producers PUT string values under a named key; consumers GET them in FIFO
//! order, optionally blocking up to a caller-specified timeout until a value
//! becomes available.

mod config;
mod router;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relayq_engine::QueueEngine;

#[derive(Parser, Debug)]
#[command(name = "relayq")]
#[command(about = "Minimal keyed FIFO message queue with HTTP long-polling", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "RELAYQ_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "RELAYQ_HOST")]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RELAYQ_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "relayq={0},relayq_engine={0},relayq_core={0},tower_http=debug",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Config file supplies defaults; CLI flags and env vars win
    let config = config::Config::load()?;
    let port = args.port.unwrap_or(config.server.port);
    let host = args.host.unwrap_or(config.server.host);

    info!("Starting relayq...");

    let engine = Arc::new(QueueEngine::new());
    let app = router::create_router(engine);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
