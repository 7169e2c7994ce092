//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at worker init):
//!     RouteDeclarations (template -> methods)
//!     → pattern.rs (parse templates, validate methods)
//!     → router.rs (reject conflicts, order by precedence)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path):
//!     → matcher.rs (segment-wise match, bind parameters)
//!     → Return: Found / NotFound / MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - Most literal pattern wins, then registration order

pub mod error;
pub mod matcher;
pub mod pattern;
pub mod router;

pub use error::{DeclarationError, RegistrationError};
pub use matcher::{Bindings, RouteMatch};
pub use pattern::{RoutePattern, Segment};
pub use router::{RouteDeclarations, RouteTable};
