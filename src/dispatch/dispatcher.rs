//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve the route; answer 404/405 without touching the worker
//! - Enforce the in-flight limit and the per-request deadline
//! - Run the worker on the blocking pool, isolated per request
//! - Turn every failure into a structured response (no retries)

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::DispatchConfig;
use crate::dispatch::policy::{DispatchPolicy, SharedPolicy};
use crate::marshal::{InboundRequest, OutboundResponse, WireRequest};
use crate::observability::metrics::{self, InFlightGuard};
use crate::routing::{RouteMatch, RouteTable};
use crate::worker::{panic_message, WorkerHandle};

/// Route label used in metrics when nothing matched.
const NO_ROUTE: &str = "none";

/// Dispatches requests for one worker.
#[derive(Debug)]
pub struct Dispatcher {
    worker: WorkerHandle,
    routes: Arc<RouteTable>,
    policy: SharedPolicy,
    in_flight: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    /// Build a dispatcher for an initialized worker and its route table.
    pub fn new(worker: WorkerHandle, routes: Arc<RouteTable>, config: &DispatchConfig) -> Self {
        Self {
            worker,
            routes,
            policy: SharedPolicy::new(DispatchPolicy::from(config)),
            in_flight: config
                .in_flight_limit()
                .map(|limit| Arc::new(Semaphore::new(limit))),
        }
    }

    pub fn worker(&self) -> &WorkerHandle {
        &self.worker
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy.load()
    }

    /// Apply a new policy to subsequent requests.
    pub fn update_policy(&self, policy: DispatchPolicy) {
        tracing::info!(timeout = ?policy.timeout, "Dispatch policy updated");
        self.policy.store(policy);
    }

    /// Serve one request. Always produces a response.
    pub async fn serve(&self, wire: WireRequest) -> OutboundResponse {
        let start = Instant::now();
        let method = wire.method.clone();
        let (route, response) = self.dispatch(wire).await;
        metrics::record_request(method.as_str(), response.status.as_u16(), route, start);
        response
    }

    async fn dispatch(&self, wire: WireRequest) -> (&str, OutboundResponse) {
        if !self.worker.is_ready() {
            tracing::warn!(
                worker = %self.worker.name(),
                state = ?self.worker.state(),
                "Worker not ready"
            );
            return (NO_ROUTE, OutboundResponse::unavailable("Worker not ready"));
        }

        let (pattern, bindings) = match self.routes.match_route(&wire.method, &wire.path) {
            RouteMatch::Found { pattern, bindings } => (pattern, bindings),
            RouteMatch::NotFound => {
                tracing::debug!(path = %wire.path, "No route matched");
                return (NO_ROUTE, OutboundResponse::not_found());
            }
            RouteMatch::MethodNotAllowed { allowed } => {
                tracing::debug!(
                    method = %wire.method,
                    path = %wire.path,
                    allowed = ?allowed,
                    "Method not allowed"
                );
                return (NO_ROUTE, OutboundResponse::method_not_allowed(&allowed));
            }
        };
        let route = pattern.template();

        let permit = match self.try_acquire() {
            Ok(permit) => permit,
            Err(()) => {
                tracing::warn!(route, "Worker at capacity");
                metrics::record_worker_failure("overloaded");
                return (route, OutboundResponse::unavailable("Worker at capacity"));
            }
        };

        let request = InboundRequest::build(pattern, bindings, wire);
        let worker = self.worker.clone();
        let task = tokio::task::spawn_blocking(move || {
            // Held until the worker returns, even if the caller stopped waiting.
            let _permit = permit;
            let _in_flight = InFlightGuard::new();
            worker.invoke(&request)
        });

        let joined = match self.policy().timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(route, timeout = ?limit, "Worker timed out; abandoning request");
                    metrics::record_worker_failure("timeout");
                    return (route, OutboundResponse::gateway_timeout());
                }
            },
            None => task.await,
        };

        let response = match joined {
            Ok(Ok(reply)) => match OutboundResponse::unmarshal(reply) {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(route, error = %e, "Worker violated the reply contract");
                    metrics::record_worker_failure("protocol");
                    OutboundResponse::worker_failed()
                }
            },
            Ok(Err(e)) => {
                tracing::error!(route, error = %e, "Worker failed");
                metrics::record_worker_failure("error");
                OutboundResponse::worker_failed()
            }
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic().as_ref());
                tracing::error!(route, panic = %message, "Worker panicked");
                metrics::record_worker_failure("panic");
                OutboundResponse::worker_failed()
            }
            Err(e) => {
                tracing::error!(route, error = %e, "Worker invocation cancelled");
                metrics::record_worker_failure("error");
                OutboundResponse::worker_failed()
            }
        };
        (route, response)
    }

    fn try_acquire(&self) -> Result<Option<OwnedSemaphorePermit>, ()> {
        match &self.in_flight {
            Some(limit) => limit.clone().try_acquire_owned().map(Some).map_err(|_| ()),
            None => Ok(None),
        }
    }
}
