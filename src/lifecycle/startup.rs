//! Startup orchestration.
//!
//! # Responsibilities
//! - Run the worker's init hook exactly once
//! - Build the dispatcher from the registered routes
//! - Hand back a server ready to bind
//!
//! # Design Decisions
//! - Fail fast: a failed init is fatal, no traffic is accepted
//! - The listener is bound by the caller, after this succeeds

use std::sync::Arc;

use thiserror::Error;

use crate::config::HostConfig;
use crate::dispatch::Dispatcher;
use crate::http::HttpServer;
use crate::worker::{InitError, WorkerHandle};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("worker '{worker}' failed to initialize: {source}")]
    Init {
        worker: String,
        #[source]
        source: InitError,
    },
}

/// Initialize the worker and assemble the HTTP server around it.
pub fn start(config: HostConfig, worker: WorkerHandle) -> Result<HttpServer, StartupError> {
    let routes = worker.init().map_err(|source| StartupError::Init {
        worker: worker.name().to_string(),
        source,
    })?;

    for pattern in routes.iter() {
        tracing::debug!(route = %pattern, "Route registered");
    }
    tracing::info!(
        worker = %worker.name(),
        routes = routes.len(),
        timeout_ms = config.dispatch.timeout_ms,
        "Worker initialized"
    );

    let dispatcher = Arc::new(Dispatcher::new(worker, routes, &config.dispatch));
    Ok(HttpServer::new(config, dispatcher))
}
