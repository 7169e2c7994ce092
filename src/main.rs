//! httpy host (v0.1)
//!
//! Serves HTTP on behalf of a worker that declares its routes once at
//! startup and then handles requests concurrently.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────────────────┐
//!                  │                          HOST                             │
//!                  │                                                           │
//!   Client Request │  ┌─────────┐    ┌────────────┐    ┌──────────────┐        │
//!   ───────────────┼─▶│  http   │───▶│  dispatch  │───▶│   routing    │        │
//!                  │  │ server  │    │ dispatcher │    │ route table  │        │
//!                  │  └─────────┘    └─────┬──────┘    └──────────────┘        │
//!                  │                       │ marshal                           │
//!                  │                       ▼                                   │
//!   Client Response│  ┌─────────┐    ┌────────────┐    ┌──────────────┐        │
//!   ◀──────────────┼──│response │◀───│ unmarshal  │◀───│    worker    │        │
//!                  │  └─────────┘    └────────────┘    │ (blocking)   │        │
//!                  │                                   └──────────────┘        │
//!                  │   config · observability · lifecycle                      │
//!                  └───────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use httpy::config::{load_config, watcher::ConfigWatcher, HostConfig};
use httpy::lifecycle::{shutdown_signal, start, Shutdown};
use httpy::observability::{logging::init_logging, metrics::init_metrics};
use httpy::worker::{self, WorkerHandle};

#[derive(Parser, Debug)]
#[command(name = "httpy", version, about = "HTTP host for pluggable request workers")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload the dispatch policy when the config file changes
    #[arg(long)]
    watch: bool,

    /// Initialize the worker, print its routes and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!("httpy v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        worker = %config.worker.name,
        timeout_ms = config.dispatch.timeout_ms,
        max_in_flight = config.dispatch.max_in_flight,
        "Configuration loaded"
    );

    let hosted = worker::builtin(&config.worker.name)
        .ok_or_else(|| format!("unknown worker '{}'", config.worker.name))?;
    let handle = WorkerHandle::from_arc(config.worker.name.clone(), hosted);
    let server = start(config.clone(), handle)?;

    if cli.check {
        for pattern in server.dispatcher().routes().iter() {
            println!("{pattern}");
        }
        server.dispatcher().worker().shutdown();
        return Ok(());
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let serve = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();
    serve.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
