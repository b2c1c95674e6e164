//! Dispatch of matched routes.
//!
//! # Data Flow
//! ```text
//! RouteMatch
//!     → arguments.rs (scalar values as-is, dependency arguments resolved by type)
//!     → handler.rs (callback → action through a CallbackResolver)
//!     → Action::invoke(Invocation) → HTTP response
//! ```
//!
//! # Design Decisions
//! - Callbacks are plain names; the application decides what they resolve to
//! - Argument types are open: resolvers are registered per type name
//! - An unresolved callback can fall back to echoing the invocation as JSON

pub mod arguments;
pub mod dispatcher;
pub mod error;
pub mod handler;

pub use arguments::{ArgumentResolver, ResolveContext, RouteUrlArgumentResolver};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use handler::{Action, CallbackResolver, HandlerRegistry, Invocation};
