//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, base URL)
//!     → router.rs (live container, loaded lazily through an IO)
//!     → matcher.rs (aliases, candidate ranking, method check)
//!     → Return: RouterResult (route, alias, method not allowed, empty)
//!
//! URL Generation:
//!     route id + arguments
//!     → url.rs (placeholder substitution, dynamic extras, query)
//!     → absolute or root-relative URL
//! ```
//!
//! # Design Decisions
//! - Templates are validated when a route is built, never while matching
//! - Matching is pure and infallible
//! - Deterministic: same container and request always yield the same result

pub mod alias;
pub mod container;
pub mod error;
pub mod matcher;
pub mod path;
pub mod result;
pub mod route;
pub mod router;
pub mod url;

pub use alias::Alias;
pub use container::RouteContainer;
pub use error::RouterError;
pub use path::{PathTemplate, RequestPath, Segment};
pub use result::{RouteMatch, RouterResult};
pub use route::{Callback, DependencyArgument, Route, RouteArgument, RouteBuilder};
pub use router::Router;
