//! Router façade.
//!
//! # Responsibilities
//! - Build the route container lazily from an IO on first use
//! - Serve matching and URL generation from the live container
//! - Apply administrative changes and persist them through the IO
//!
//! # Design Decisions
//! - The live container sits behind an `ArcSwapOption`; readers never block
//! - Writers are serialized by a mutex: clone, apply, persist, then swap
//! - A failed persist leaves the live container untouched
//! - `invalidate` drops the container so the next access reloads it

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwapOption;

use crate::io::{MemoryRouteContainerIo, RouteContainerIo};
use crate::observability::metrics;
use crate::routing::alias::Alias;
use crate::routing::container::RouteContainer;
use crate::routing::error::RouterError;
use crate::routing::result::RouterResult;
use crate::routing::route::{Callback, Route, RouteBuilder};

/// Entry point to the routing table.
pub struct Router {
    io: Arc<dyn RouteContainerIo>,
    container: ArcSwapOption<RouteContainer>,
    write_lock: Mutex<()>,
}

impl Router {
    pub fn new(io: Arc<dyn RouteContainerIo>) -> Self {
        Self {
            io,
            container: ArcSwapOption::empty(),
            write_lock: Mutex::new(()),
        }
    }

    /// A router over a fixed container, persisted in memory only.
    pub fn from_container(container: RouteContainer) -> Self {
        Self::new(Arc::new(MemoryRouteContainerIo::new(container)))
    }

    pub fn io(&self) -> &Arc<dyn RouteContainerIo> {
        &self.io
    }

    /// The live container, loading it on first access.
    pub fn container(&self) -> Result<Arc<RouteContainer>, RouterError> {
        if let Some(container) = self.container.load_full() {
            return Ok(container);
        }
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_locked()
    }

    fn load_locked(&self) -> Result<Arc<RouteContainer>, RouterError> {
        if let Some(container) = self.container.load_full() {
            return Ok(container);
        }

        let started = Instant::now();
        let container = Arc::new(self.io.route_container()?);
        metrics::record_container_load(self.io.name(), started);
        tracing::info!(
            io = self.io.name(),
            routes = container.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Route container loaded"
        );

        self.container.store(Some(container.clone()));
        Ok(container)
    }

    /// Drop the live container; the next access reloads it through the IO.
    pub fn invalidate(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.io.invalidate();
        self.container.store(None);
        tracing::debug!(io = self.io.name(), "Route container invalidated");
    }

    pub fn route(&self, method: &str, path: &str, base_url: &str) -> Result<RouterResult, RouterError> {
        let result = self.container()?.route(method, path, base_url);
        metrics::record_match(result.outcome());
        Ok(result)
    }

    pub fn url(
        &self,
        base_url: &str,
        id: &str,
        arguments: &[(&str, &str)],
        query: &[(&str, &str)],
        query_separator: &str,
    ) -> Result<String, RouterError> {
        self.container()?
            .url(base_url, id, arguments, query, query_separator)
    }

    /// Start a route tagged with the live container's source, so a write
    /// persists it.
    pub fn create_route(&self, path: impl Into<String>, callback: Callback) -> Result<RouteBuilder, RouterError> {
        Ok(self.container()?.create_route(path, callback))
    }

    pub fn create_alias(&self, path: &str, alias: &str, forced: bool) -> Result<Alias, RouterError> {
        self.container()?.create_alias(path, alias, forced)
    }

    pub fn routes(&self) -> Result<Vec<Arc<Route>>, RouterError> {
        Ok(self.container()?.routes().to_vec())
    }

    pub fn aliases(&self) -> Result<Vec<Arc<Alias>>, RouterError> {
        Ok(self.container()?.aliases().cloned().collect())
    }

    pub fn route_by_id(&self, id: &str) -> Result<Option<Arc<Route>>, RouterError> {
        Ok(self.container()?.route_by_id(id).cloned())
    }

    pub fn route_by_path(&self, path: &str) -> Result<Option<Arc<Route>>, RouterError> {
        Ok(self.container()?.route_by_path(path).cloned())
    }

    pub fn alias_by_path(&self, path: &str) -> Result<Option<Arc<Alias>>, RouterError> {
        Ok(self.container()?.alias_by_path(path).cloned())
    }

    pub fn alias_by_alias(&self, alias: &str) -> Result<Option<Arc<Alias>>, RouterError> {
        Ok(self.container()?.alias_by_alias(alias).cloned())
    }

    pub fn set_route(&self, route: Route) -> Result<(), RouterError> {
        tracing::info!(route = %route, "Setting route");
        self.update(|container| container.set_route(route))
    }

    pub fn unset_route(&self, route: &Route) -> Result<Option<Arc<Route>>, RouterError> {
        tracing::info!(route = %route, "Removing route");
        self.update(|container| container.unset_route(route))
    }

    /// Returns whether the alias was stored; a forced alias is kept over a
    /// non-forced one.
    pub fn set_alias(&self, alias: Alias) -> Result<bool, RouterError> {
        tracing::info!(alias = %alias.alias(), path = %alias.path(), "Setting alias");
        self.update(|container| container.set_alias(alias))
    }

    pub fn unset_alias(&self, alias: &Alias) -> Result<Option<Arc<Alias>>, RouterError> {
        tracing::info!(alias = %alias.alias(), "Removing alias");
        self.update(|container| container.unset_alias(alias))
    }

    fn update<T>(&self, apply: impl FnOnce(&mut RouteContainer) -> T) -> Result<T, RouterError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.load_locked()?;

        let mut next = RouteContainer::clone(&current);
        let output = apply(&mut next);
        self.io.set_route_container(&next)?;

        self.container.store(Some(Arc::new(next)));
        Ok(output)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("io", &self.io)
            .field("loaded", &self.container.load().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::io::{IoError, StaticRouteContainerIo};

    #[derive(Debug, Default)]
    struct CountingIo {
        reads: AtomicUsize,
        inner: MemoryRouteContainerIo,
    }

    impl RouteContainerIo for CountingIo {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn route_container(&self) -> Result<RouteContainer, IoError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.route_container()
        }

        fn set_route_container(&self, container: &RouteContainer) -> Result<(), IoError> {
            self.inner.set_route_container(container)
        }
    }

    #[test]
    fn test_container_loaded_once() {
        let io = Arc::new(CountingIo::default());
        let router = Router::new(io.clone());
        assert_eq!(io.reads.load(Ordering::SeqCst), 0);

        router.route("GET", "/", "").unwrap();
        router.routes().unwrap();
        assert_eq!(io.reads.load(Ordering::SeqCst), 1);

        router.invalidate();
        router.route("GET", "/", "").unwrap();
        assert_eq!(io.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_route_persists_and_swaps() {
        let io = Arc::new(CountingIo::default());
        let router = Router::new(io.clone());

        let route = router.create_route("/user/{id}", Callback::function("user")).unwrap().id("user").build().unwrap();
        router.set_route(route).unwrap();

        assert_eq!(router.url("", "user", &[("id", "3")], &[], "&").unwrap(), "/user/3");
        assert_eq!(io.inner.route_container().unwrap().len(), 1);

        let removed = router.unset_route(&router.route_by_id("user").unwrap().unwrap()).unwrap();
        assert!(removed.is_some());
        assert!(router.routes().unwrap().is_empty());
    }

    #[test]
    fn test_failed_persist_keeps_live_container() {
        let mut container = RouteContainer::new();
        container.set_route(Route::new("/", Callback::function("home")).unwrap());
        let router = Router::new(Arc::new(StaticRouteContainerIo::new(container)));

        let err = router.set_route(Route::new("/new", Callback::function("new")).unwrap()).unwrap_err();
        assert!(matches!(err, RouterError::Io(IoError::ReadOnly(_))));
        assert_eq!(router.routes().unwrap().len(), 1);
        assert!(router.route("GET", "/new", "").unwrap().is_empty());
    }

    #[test]
    fn test_aliases_through_router() {
        let router = Router::from_container(RouteContainer::new());
        let alias = router.create_alias("/home", "/", true).unwrap();
        assert!(router.set_alias(alias).unwrap());
        assert_eq!(router.alias_by_path("/home").unwrap().unwrap().alias(), "/");

        let weaker = router.create_alias("/elsewhere", "/", false).unwrap();
        assert!(!router.set_alias(weaker).unwrap());

        let stored = router.alias_by_alias("/").unwrap().unwrap();
        assert!(router.unset_alias(&stored).unwrap().is_some());
        assert!(router.aliases().unwrap().is_empty());
    }
}
