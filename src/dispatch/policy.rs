//! Dispatch policy.
//!
//! # Responsibilities
//! - Hold the per-request deadline
//! - Allow the deadline to be swapped at runtime (config reload)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeouts abandon the wait, they do not interrupt the worker
//! - Timed-out requests return 504 Gateway Timeout

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::config::DispatchConfig;

/// Settings consulted on every dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchPolicy {
    /// Per-request deadline. `None` waits for the worker indefinitely.
    pub timeout: Option<Duration>,
}

impl From<&DispatchConfig> for DispatchPolicy {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            timeout: config.timeout(),
        }
    }
}

/// Lock-free, swappable policy shared by all in-flight requests.
#[derive(Debug)]
pub struct SharedPolicy {
    current: ArcSwap<DispatchPolicy>,
}

impl SharedPolicy {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            current: ArcSwap::from_pointee(policy),
        }
    }

    pub fn load(&self) -> DispatchPolicy {
        **self.current.load()
    }

    /// Replace the policy. Requests already waiting keep their deadline.
    pub fn store(&self, policy: DispatchPolicy) {
        self.current.store(Arc::new(policy));
    }
}
