//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! WireRequest
//!     → dispatcher.rs: worker ready? ── no ──▶ 503
//!     → RouteTable::match_route ── NotFound / MethodNotAllowed ──▶ 404 / 405
//!     → in-flight slot ── none free ──▶ 503
//!     → InboundRequest::build
//!     → spawn_blocking(worker.handle) under policy.rs deadline
//!         ├─ reply ok      → OutboundResponse::unmarshal ──▶ status from worker
//!         ├─ contract broken / Err / panic ──▶ 500
//!         └─ deadline passed ──▶ 504 (worker keeps running, result dropped)
//! ```
//!
//! # Design Decisions
//! - One tokio task per request; the route table is shared read-only
//! - Workers run on the blocking pool so slow handlers never stall the executor
//! - Failures are contained per request and never retried
//! - No mutual exclusion around worker calls; workers own their state

pub mod dispatcher;
pub mod policy;

pub use dispatcher::Dispatcher;
pub use policy::DispatchPolicy;
