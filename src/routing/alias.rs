//! Path aliases.

use serde::{Deserialize, Serialize};

use crate::routing::error::RouterError;
use crate::routing::path::normalize_path;

/// Maps a requested path (`alias`) onto a canonical path (`path`).
///
/// A forced alias redirects even when a route matches the alias path itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "AliasRecord", into = "AliasRecord")]
pub struct Alias {
    path: String,
    alias: String,
    forced: bool,
    source: Option<String>,
}

impl Alias {
    pub fn new(path: &str, alias: &str) -> Result<Self, RouterError> {
        Ok(Self {
            path: validate(path)?,
            alias: validate(alias)?,
            forced: false,
            source: None,
        })
    }

    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = forced;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The canonical path requests are sent to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The requested path.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl PartialEq for Alias {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.alias == other.alias && self.forced == other.forced
    }
}

impl Eq for Alias {}

fn validate(path: &str) -> Result<String, RouterError> {
    if !path.starts_with('/') {
        return Err(RouterError::invalid_path(path, "must start with '/'"));
    }
    if path.contains('{') || path.contains('}') {
        return Err(RouterError::invalid_path(path, "aliases cannot contain placeholders"));
    }
    if path.contains('%') {
        return Err(RouterError::invalid_path(path, "aliases must not be percent-encoded"));
    }
    Ok(normalize_path(path))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRecord {
    pub path: String,
    pub alias: String,
    #[serde(default)]
    pub forced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<Alias> for AliasRecord {
    fn from(alias: Alias) -> Self {
        Self {
            path: alias.path,
            alias: alias.alias,
            forced: alias.forced,
            source: alias.source,
        }
    }
}

impl TryFrom<AliasRecord> for Alias {
    type Error = RouterError;

    fn try_from(record: AliasRecord) -> Result<Self, Self::Error> {
        let alias = Alias::new(&record.path, &record.alias)?.with_forced(record.forced);
        Ok(match record.source {
            Some(source) => alias.with_source(source),
            None => alias,
        })
    }
}
