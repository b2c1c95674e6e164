//! Dispatch error definitions.

use thiserror::Error;

use crate::routing::RouterError;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No action is registered for the route's callback.
    #[error("no action registered for callback {0}")]
    UnresolvedCallback(String),

    /// A dependency argument names a type without a resolver.
    #[error("no resolver for argument '{name}' of type '{kind}'")]
    UnknownArgumentType { name: String, kind: String },

    /// A dependency argument has missing or malformed properties.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("routing failed while resolving arguments")]
    Router(#[from] RouterError),
}
