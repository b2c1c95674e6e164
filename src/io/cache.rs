//! Fast-load cache for route containers.
//!
//! # Responsibilities
//! - Persist a JSON snapshot of a container next to the application
//! - Serve reads from the snapshot, skipping route file parsing
//! - Drop the snapshot whenever the container is written
//!
//! # Design Decisions
//! - The snapshot carries a format version; a mismatch counts as corrupt
//! - A corrupt snapshot is discarded and regenerated, never fatal
//! - Failing to store a snapshot only costs speed, so it is logged and ignored
//! - A stale snapshot after an external edit of the route files is not
//!   detected here; see the route file watcher

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::io::error::IoError;
use crate::io::{remove_if_exists, write_atomic, RouteContainerIo};
use crate::observability::metrics;
use crate::routing::{Alias, Route, RouteContainer};

/// Snapshot format version.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(default)]
    source: Option<String>,
    routes: Vec<Route>,
    aliases: Vec<Alias>,
}

/// The cache artifact on disk.
#[derive(Debug, Clone)]
pub struct RouteCache {
    path: PathBuf,
}

impl RouteCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the snapshot; `Ok(None)` when there is none.
    pub fn load(&self) -> Result<Option<RouteContainer>, IoError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(IoError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| self.invalid(e.to_string()))?;
        if snapshot.version != CACHE_VERSION {
            return Err(self.invalid(format!(
                "version {} does not match {}",
                snapshot.version, CACHE_VERSION
            )));
        }

        let mut container = match snapshot.source {
            Some(source) => RouteContainer::with_source(source),
            None => RouteContainer::new(),
        };
        for route in snapshot.routes {
            container.set_route(route);
        }
        for alias in snapshot.aliases {
            container.set_alias(alias);
        }
        Ok(Some(container))
    }

    pub fn store(&self, container: &RouteContainer) -> Result<(), IoError> {
        let snapshot = Snapshot {
            version: CACHE_VERSION,
            source: container.source().map(str::to_string),
            routes: container.routes().iter().map(|r| Route::clone(r)).collect(),
            aliases: container.aliases().map(|a| Alias::clone(a)).collect(),
        };
        let content = serde_json::to_string(&snapshot).map_err(|e| IoError::Render {
            file: self.path.clone(),
            message: e.to_string(),
        })?;
        write_atomic(&self.path, &content)?;
        tracing::debug!(path = %self.path.display(), routes = snapshot.routes.len(), "Stored route cache");
        Ok(())
    }

    /// Delete the snapshot; returns whether one existed.
    pub fn clear(&self) -> Result<bool, IoError> {
        let removed = remove_if_exists(&self.path)?;
        if removed {
            tracing::debug!(path = %self.path.display(), "Cleared route cache");
        }
        Ok(removed)
    }

    fn invalid(&self, message: String) -> IoError {
        IoError::Cache {
            path: self.path.clone(),
            message,
        }
    }
}

/// Serves a wrapped IO through a [`RouteCache`].
#[derive(Debug, Clone)]
pub struct CachedRouteContainerIo {
    io: Arc<dyn RouteContainerIo>,
    cache: Arc<RouteCache>,
}

impl CachedRouteContainerIo {
    pub fn new(io: Arc<dyn RouteContainerIo>, cache: Arc<RouteCache>) -> Self {
        Self { io, cache }
    }

    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    pub fn inner(&self) -> &Arc<dyn RouteContainerIo> {
        &self.io
    }

    /// Regenerate the snapshot from the wrapped IO.
    pub fn warm(&self) -> Result<RouteContainer, IoError> {
        let container = self.io.route_container()?;
        self.cache.store(&container)?;
        tracing::info!(
            path = %self.cache.path().display(),
            routes = container.len(),
            "Route cache warmed"
        );
        Ok(container)
    }

    pub fn clear(&self) -> Result<bool, IoError> {
        self.cache.clear()
    }
}

impl RouteContainerIo for CachedRouteContainerIo {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn route_container(&self) -> Result<RouteContainer, IoError> {
        match self.cache.load() {
            Ok(Some(container)) => {
                metrics::record_cache("hit");
                return Ok(container);
            }
            Ok(None) => metrics::record_cache("miss"),
            Err(e) => {
                metrics::record_cache("invalid");
                tracing::warn!(error = %e, "Discarding unusable route cache");
                if let Err(e) = self.cache.clear() {
                    tracing::warn!(error = %e, "Failed to remove route cache");
                }
            }
        }

        let container = self.io.route_container()?;
        if let Err(e) = self.cache.store(&container) {
            tracing::warn!(error = %e, "Failed to store route cache");
        }
        Ok(container)
    }

    fn set_route_container(&self, container: &RouteContainer) -> Result<(), IoError> {
        self.io.set_route_container(container)?;
        self.cache.clear()?;
        Ok(())
    }

    fn accepts_writes(&self) -> bool {
        self.io.accepts_writes()
    }

    fn invalidate(&self) {
        self.io.invalidate();
    }
}
