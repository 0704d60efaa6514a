//! Round controller (crowdmsg-rc) - Main entry point
//!
//! Terminal driver for crowd-message rounds: opens the collection
//! window on the server, shows submissions and the countdown as they
//! happen, and prints the synthesized scene prompt at the end.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crowdmsg_common::config;
use crowdmsg_common::events::{EventBus, RoundEvent};
use crowdmsg_rc::client::ServerClient;
use crowdmsg_rc::controller::{RoundConfig, RoundController};

/// Command-line arguments for crowdmsg-rc
#[derive(Parser, Debug)]
#[command(name = "crowdmsg-rc")]
#[command(about = "Round controller for crowd-message rounds")]
#[command(version)]
struct Args {
    /// Base URL of the submission server
    #[arg(short, long)]
    server: Option<String>,

    /// Collection window duration in seconds
    #[arg(short, long, default_value = "30")]
    duration: u64,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "1000")]
    poll_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crowdmsg_rc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let server_url = config::resolve_server_url(args.server.as_deref());
    info!("Using submission server at {}", server_url);

    let api = Arc::new(ServerClient::new(&server_url).context("Failed to build server client")?);
    let events = EventBus::new(100);
    let controller = RoundController::new(
        api,
        events.clone(),
        RoundConfig {
            collect_duration: Duration::from_secs(args.duration),
            poll_interval: Duration::from_millis(args.poll_ms),
        },
    );

    // Print round events as presentation would consume them
    let mut rx = events.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                RoundEvent::WindowOpened { .. } => println!("-- window open, text now --"),
                RoundEvent::SubmissionSeen { sender, text } => {
                    println!("{} : {}", sender, text)
                }
                RoundEvent::CountdownTick { seconds_left } => {
                    if seconds_left % 10 == 0 || seconds_left <= 5 {
                        println!("   {}s left", seconds_left);
                    }
                }
                RoundEvent::WindowClosed { collected } => {
                    println!("-- window closed, {} collected --", collected)
                }
                RoundEvent::SynthesisReady {
                    explanation,
                    prompt,
                } => {
                    println!();
                    println!("{}", explanation);
                    println!("{}", prompt);
                }
                RoundEvent::SynthesisFailed { reason } => println!("synthesis failed: {}", reason),
                RoundEvent::RoundCancelled => println!("-- round cancelled --"),
            }
        }
    });

    // Match the original client: clear any leftover server state, then
    // run one complete round
    let outcome = controller.reset_and_run().await;

    // Let the printer drain; it exits once every bus handle is gone
    drop(controller);
    drop(events);
    let _ = printer.await;

    match outcome {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Ok(()),
        Err(e) => Err(e).context("Round failed"),
    }
}
