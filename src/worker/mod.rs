//! Worker calling contract.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     WorkerHandle::init (lifecycle.rs)
//!     → Worker::init → RouteDeclarations
//!     → RouteTable::register
//!
//! Per request (from the dispatcher):
//!     InboundRequest → Worker::handle → WorkerReply
//!
//! Shutdown:
//!     WorkerHandle::shutdown → Worker::shutdown
//! ```
//!
//! # Design Decisions
//! - `handle` is synchronous and may block; the dispatcher runs it off the
//!   async executor
//! - `handle` is called concurrently; workers synchronize their own state
//! - Workers are plain trait objects, one shared handle per worker

pub mod demo;
pub mod lifecycle;

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use crate::marshal::{InboundRequest, WorkerReply};
use crate::routing::{DeclarationError, RouteDeclarations};

pub use demo::DemoWorker;
pub use lifecycle::{InitError, WorkerHandle, WorkerState};

/// A failure reported by worker code.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker's route declaration could not be read.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl WorkerError {
    pub fn msg(message: impl Into<String>) -> Self {
        WorkerError::Message(message.into())
    }
}

/// The pluggable unit behind a set of routes.
pub trait Worker: Send + Sync + 'static {
    /// Declare routes. Called exactly once, before any request.
    fn init(&self) -> Result<RouteDeclarations, WorkerError>;

    /// Handle one request. Must be safe to call concurrently.
    fn handle(&self, request: &InboundRequest) -> Result<WorkerReply, WorkerError>;

    /// Release resources. Called once when the host shuts down.
    fn shutdown(&self) {}
}

/// A worker built from a fixed set of routes and a handler closure.
pub struct FnWorker<F> {
    routes: RouteDeclarations,
    handler: F,
}

/// Build a worker from declarations and a request handler.
pub fn from_fn<F>(routes: RouteDeclarations, handler: F) -> FnWorker<F>
where
    F: Fn(&InboundRequest) -> Result<WorkerReply, WorkerError> + Send + Sync + 'static,
{
    FnWorker { routes, handler }
}

impl<F> Worker for FnWorker<F>
where
    F: Fn(&InboundRequest) -> Result<WorkerReply, WorkerError> + Send + Sync + 'static,
{
    fn init(&self) -> Result<RouteDeclarations, WorkerError> {
        Ok(self.routes.clone())
    }

    fn handle(&self, request: &InboundRequest) -> Result<WorkerReply, WorkerError> {
        (self.handler)(request)
    }
}

/// Look up a worker compiled into the host by name.
pub fn builtin(name: &str) -> Option<Arc<dyn Worker>> {
    match name {
        "demo" => Some(Arc::new(DemoWorker::new())),
        _ => None,
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
