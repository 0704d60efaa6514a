//! Submission server (crowdmsg-sv) - Main entry point
//!
//! Long-running listener for the crowd-message round: window control,
//! webhook ingestion, snapshot reads, and the synthesis proxy.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crowdmsg_common::config;
use crowdmsg_sv::api::{build_router, AppContext};
use crowdmsg_sv::service::CollectionService;
use crowdmsg_sv::synthesis::OpenAiGateway;

/// Command-line arguments for crowdmsg-sv
#[derive(Parser, Debug)]
#[command(name = "crowdmsg-sv")]
#[command(about = "Submission server for crowd-message rounds")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crowdmsg_sv=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();
    let port = config::resolve_listen_port(args.port).context("Failed to resolve listen port")?;

    // The server keeps running without the credential; only /synthesize
    // calls will fail until it is provided.
    let api_key = config::openai_api_key();
    match &api_key {
        Some(_) => info!("Generative service credential loaded"),
        None => warn!(
            "{} is not set; /synthesize will return errors",
            config::ENV_OPENAI_API_KEY
        ),
    }

    let service = Arc::new(CollectionService::new());
    let gateway =
        Arc::new(OpenAiGateway::new(api_key).context("Failed to initialize synthesis gateway")?);

    let app = build_router(AppContext { service, gateway });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM so in-flight webhook deliveries finish
/// before the listener goes away
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, stopping submission server"),
        _ = sigterm => info!("SIGTERM received, stopping submission server"),
    }
}
