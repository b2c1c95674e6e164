//! Startup orchestration.
//!
//! # Responsibilities
//! - Compose the route container IO stack from configuration
//! - Build the router over it and load the container once
//!
//! # Design Decisions
//! - Fail fast: a route file error at startup is fatal
//! - The cache is owned here and shared by `Arc` with the IO, the watcher
//!   and the CLI

use std::sync::Arc;

use crate::config::RoutingConfig;
use crate::io::{CachedRouteContainerIo, ParserRouteContainerIo, RouteCache, RouteContainerIo};
use crate::routing::{Router, RouterError};

/// The composed routing components.
#[derive(Debug, Clone)]
pub struct RoutingStack {
    pub router: Arc<Router>,
    pub parser: Arc<ParserRouteContainerIo>,
    pub cache: Option<CachedRouteContainerIo>,
}

/// Compose parser, optional cache and router; nothing is read yet.
pub fn build_routing(config: &RoutingConfig) -> RoutingStack {
    let parser = Arc::new(ParserRouteContainerIo::new(config.layout()));

    let cache = config.cache_enabled.then(|| {
        CachedRouteContainerIo::new(parser.clone(), Arc::new(RouteCache::new(&config.cache_file)))
    });
    let io: Arc<dyn RouteContainerIo> = match &cache {
        Some(cached) => Arc::new(cached.clone()),
        None => parser.clone(),
    };

    RoutingStack {
        router: Arc::new(Router::new(io)),
        parser,
        cache,
    }
}

impl RoutingStack {
    /// Load the container now instead of on the first request.
    pub fn preload(&self) -> Result<usize, RouterError> {
        let container = self.router.container()?;
        tracing::info!(
            routes = container.len(),
            aliases = container.aliases().count(),
            cached = self.cache.is_some(),
            "Routing ready"
        );
        Ok(container.len())
    }

    pub fn route_cache(&self) -> Option<Arc<RouteCache>> {
        self.cache.as_ref().map(|cached| cached.cache().clone())
    }
}
