//! Route container I/O error definitions.

use std::path::PathBuf;

use thiserror::Error;

use crate::routing::error::RouterError;

/// Errors raised while reading or writing a route container.
#[derive(Debug, Error)]
pub enum IoError {
    /// A route file entry is malformed.
    #[error("invalid route configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// A route file is not valid TOML or JSON.
    #[error("could not parse {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// A route definition could not be rendered for writing.
    #[error("could not render {file}: {message}")]
    Render { file: PathBuf, message: String },

    #[error("could not read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache artifact is unusable.
    #[error("route cache {path} is invalid: {message}")]
    Cache { path: PathBuf, message: String },

    /// The IO does not accept writes.
    #[error("{0} is read-only")]
    ReadOnly(String),

    #[error("route container chain is empty")]
    EmptyChain,

    /// Every member of a chain refused the write.
    #[error("no IO in the chain accepted the route container ({} rejected)", .0.len())]
    ChainRejected(Vec<IoError>),

    /// A route or alias could not be built.
    #[error(transparent)]
    Route(Box<RouterError>),
}

impl From<RouterError> for IoError {
    fn from(error: RouterError) -> Self {
        IoError::Route(Box::new(error))
    }
}
