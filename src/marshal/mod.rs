//! Marshaling between wire-level HTTP data and the worker calling contract.
//!
//! # Data Flow
//! ```text
//! WireRequest (method, path, raw query, HeaderMap, body)
//!     + matcher Bindings
//!     → request.rs (InboundRequest: typed call arguments)
//!     → worker handle()
//!     → WorkerReply (status, body, headers)
//!     → response.rs (validate → OutboundResponse, or ProtocolError)
//! ```
//!
//! # Design Decisions
//! - Multi-valued maps everywhere (params.rs); order and multiplicity preserved
//! - Header names case-insensitive, values passed through verbatim
//! - Body never interpreted (no content-type parsing)

pub mod params;
pub mod request;
pub mod response;

pub use params::{Headers, Params};
pub use request::{InboundRequest, WireRequest};
pub use response::{OutboundResponse, ProtocolError, WorkerReply};
