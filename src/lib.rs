//! HTTP host for pluggable request workers.

// Request path
pub mod routing;
pub mod marshal;
pub mod dispatch;
pub mod worker;

// Host process
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::HostConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use marshal::{InboundRequest, WorkerReply};
pub use routing::{RouteDeclarations, RouteTable};
pub use worker::{Worker, WorkerError, WorkerHandle};
