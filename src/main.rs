//! Route bridge worker.
//!
//! Serves name-routed requests from a parent process over stdin/stdout.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                     WORKER                        │
//!                        │                                                  │
//!     Parent (stdin)     │  ┌─────────┐    ┌─────────┐    ┌────────────┐    │
//!     ───────────────────┼─▶│  codec  │───▶│ service │───▶│ dispatcher │    │
//!                        │  │ decode  │    │ permits │    └─────┬──────┘    │
//!                        │  └─────────┘    └─────────┘          │           │
//!                        │                                      ▼           │
//!                        │                               ┌────────────┐     │
//!                        │                               │  registry  │     │
//!                        │                               │ + handlers │     │
//!                        │                               └─────┬──────┘     │
//!                        │                                     │            │
//!     Parent (stdout)    │  ┌─────────┐                  ┌────────────┐     │
//!     ◀──────────────────┼──│  codec  │◀─────────────────│  sanitize  │     │
//!                        │  │ writer  │                  └────────────┘     │
//!                        │  └─────────┘                                     │
//!                        │                                                  │
//!                        │   config · observability (stderr) · lifecycle    │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;

use route_bridge::config::{load_config, BridgeConfig};
use route_bridge::ipc::{builtin, Dispatcher, HandlerRegistry};
use route_bridge::lifecycle::{signals, Shutdown};
use route_bridge::observability::logging;
use route_bridge::transport::{self, serve_lines};

#[derive(Parser)]
#[command(name = "route-bridge")]
#[command(about = "Worker that answers name-routed requests on stdin/stdout", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(args));

    // A stdin read blocked on its own thread cannot be cancelled, so do not
    // wait for it after a signal-driven shutdown.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };

    logging::init(&config.observability)?;
    tracing::info!("route-bridge v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        max_in_flight = config.worker.max_in_flight,
        queue_capacity = config.worker.queue_capacity,
        drain_timeout_secs = config.worker.drain_timeout_secs,
        "Configuration loaded"
    );

    // Registry is complete before anything is served.
    let mut registry = HandlerRegistry::new();
    builtin::register_builtins(&mut registry);
    let dispatcher =
        Arc::new(Dispatcher::new(registry).with_metrics(config.observability.metrics_enabled));

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let (handle, service_task) = transport::spawn(dispatcher, &config.worker, shutdown.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_lines(stdin, stdout, handle, &config.worker, shutdown.clone()).await?;

    shutdown.trigger();
    service_task.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
