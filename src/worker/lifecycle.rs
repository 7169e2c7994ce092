//! Worker lifecycle: one-time registration handshake, readiness, teardown.
//!
//! # State Transitions
//! ```text
//! Uninitialized → Initializing → Ready → ShutDown
//!                             ↘ Failed
//! ```
//!
//! # Design Decisions
//! - `init` runs exactly once; a second call is a registration error
//! - Panics inside worker hooks are caught and reported, never propagated
//! - State is a single atomic, so readiness checks on the hot path are lock-free

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::marshal::{InboundRequest, WorkerReply};
use crate::routing::{DeclarationError, RegistrationError, RouteTable};
use crate::worker::{panic_message, Worker, WorkerError};

/// Lifecycle state of a worker.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
    Failed = 3,
    ShutDown = 4,
}

impl From<u8> for WorkerState {
    fn from(val: u8) -> Self {
        match val {
            1 => WorkerState::Initializing,
            2 => WorkerState::Ready,
            3 => WorkerState::Failed,
            4 => WorkerState::ShutDown,
            _ => WorkerState::Uninitialized,
        }
    }
}

/// Worker initialization failed. Fatal for that worker.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("init hook failed: {0}")]
    Hook(#[source] WorkerError),

    #[error("init hook panicked: {0}")]
    Panicked(String),

    #[error("malformed route declaration: {0}")]
    Malformed(#[source] DeclarationError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

struct HandleInner {
    name: String,
    worker: Arc<dyn Worker>,
    state: AtomicU8,
    routes: OnceLock<Arc<RouteTable>>,
}

/// Shared reference to one worker's entry points and lifecycle state.
#[derive(Clone)]
pub struct WorkerHandle {
    inner: Arc<HandleInner>,
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}

impl WorkerHandle {
    pub fn new<W: Worker>(name: impl Into<String>, worker: W) -> Self {
        Self::from_arc(name, Arc::new(worker))
    }

    pub fn from_arc(name: impl Into<String>, worker: Arc<dyn Worker>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                worker,
                state: AtomicU8::new(WorkerState::Uninitialized as u8),
                routes: OnceLock::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == WorkerState::Ready
    }

    /// The registered route table, once `init` has succeeded.
    pub fn routes(&self) -> Option<Arc<RouteTable>> {
        self.inner.routes.get().cloned()
    }

    /// Run the registration handshake.
    pub fn init(&self) -> Result<Arc<RouteTable>, InitError> {
        if self
            .inner
            .state
            .compare_exchange(
                WorkerState::Uninitialized as u8,
                WorkerState::Initializing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Err(RegistrationError::AlreadyRegistered.into());
        }

        match self.register() {
            Ok(routes) => {
                let routes = self.inner.routes.get_or_init(|| routes).clone();
                self.set_state(WorkerState::Ready);
                if routes.is_empty() {
                    tracing::warn!(worker = %self.name(), "Worker declared no routes");
                }
                tracing::info!(worker = %self.name(), routes = routes.len(), "Worker initialized");
                Ok(routes)
            }
            Err(e) => {
                self.set_state(WorkerState::Failed);
                tracing::error!(worker = %self.name(), error = %e, "Worker initialization failed");
                Err(e)
            }
        }
    }

    fn register(&self) -> Result<Arc<RouteTable>, InitError> {
        let worker = &self.inner.worker;
        let declarations = match catch_unwind(AssertUnwindSafe(|| worker.init())) {
            Ok(Ok(declarations)) => declarations,
            Ok(Err(WorkerError::Declaration(e))) => return Err(InitError::Malformed(e)),
            Ok(Err(e)) => return Err(InitError::Hook(e)),
            Err(payload) => return Err(InitError::Panicked(panic_message(payload.as_ref()))),
        };

        for (template, methods) in declarations.iter() {
            tracing::debug!(
                worker = %self.name(),
                route = %template,
                methods = ?methods,
                "Route declared"
            );
        }

        Ok(Arc::new(RouteTable::register(&declarations)?))
    }

    /// Call the worker's per-request entry point. Blocking.
    pub fn invoke(&self, request: &InboundRequest) -> Result<WorkerReply, WorkerError> {
        self.inner.worker.handle(request)
    }

    /// Tear the worker down. Only the first call after a successful init
    /// reaches the worker's hook.
    pub fn shutdown(&self) {
        let previous = self
            .inner
            .state
            .compare_exchange(
                WorkerState::Ready as u8,
                WorkerState::ShutDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        if previous.is_err() {
            return;
        }

        let worker = &self.inner.worker;
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| worker.shutdown())) {
            tracing::error!(
                worker = %self.name(),
                panic = %panic_message(payload.as_ref()),
                "Worker shutdown hook panicked"
            );
        }
        tracing::info!(worker = %self.name(), "Worker shut down");
    }

    fn set_state(&self, state: WorkerState) {
        self.inner.state.store(state as u8, Ordering::Release);
    }
}
