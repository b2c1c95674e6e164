//! Routing error definitions.

use thiserror::Error;

use crate::io::IoError;

/// Errors raised by the routing core.
///
/// Matching itself never fails; these cover route construction, URL
/// generation and loading or persisting the container.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route or alias path is not a well-formed template.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// An allowed method is not a valid HTTP method token.
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// A base URL constraint could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// URL generation for an id that is not registered.
    #[error("no route with id '{0}'")]
    RouteNotFound(String),

    /// URL generation without a value for a placeholder.
    #[error("missing argument '{name}' for route '{route}'")]
    MissingArgument { route: String, name: String },

    /// Loading or persisting the route container failed.
    #[error("route container I/O failed")]
    Io(#[from] IoError),
}

impl RouterError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        RouterError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
