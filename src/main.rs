//! web-router
//!
//! Serves a route table over HTTP: requests are matched against routes
//! loaded from route files and dispatched to registered actions, redirected
//! through aliases, or answered with 404/405.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server ──▶ routing::Router ──▶ dispatch::Dispatcher
//!                                          │                     │
//!                                          ▼                     ▼
//!                                 io::CachedRouteContainerIo   Action / echo
//!                                          │
//!                                          ▼
//!                                 io::ParserRouteContainerIo ──▶ route files
//!
//!     Cross-cutting: config (TOML + watcher), observability (tracing, metrics),
//!     lifecycle (startup, signals)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use web_router::config::watcher::{apply_route_changes, RouteWatcher};
use web_router::config::{load_config, AppConfig};
use web_router::dispatch::{Dispatcher, HandlerRegistry};
use web_router::http::{AppState, HttpServer};
use web_router::lifecycle::build_routing;
use web_router::observability::logging::{default_filter, init_logging};
use web_router::observability::metrics;

#[derive(Parser)]
#[command(name = "web-router")]
#[command(about = "HTTP server over a route table", long_about = None)]
struct Args {
    /// Configuration file (TOML); defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    init_logging(&default_filter(&config.observability.log_level));
    tracing::info!("web-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        application_dir = %config.routing.application_dir.display(),
        modules = config.routing.module_dirs.len(),
        cache_enabled = config.routing.cache_enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let stack = build_routing(&config.routing);
    stack.preload()?;

    let _watcher = if config.routing.watch {
        let (watcher, changes) = RouteWatcher::new(
            config.routing.watch_dirs(),
            Some(config.routing.cache_file.clone()),
        );
        let watcher = watcher.run()?;
        tokio::spawn(apply_route_changes(changes, stack.router.clone(), stack.route_cache()));
        Some(watcher)
    } else {
        None
    };

    let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new()))
        .with_echo(config.routing.echo_unresolved);
    let state = AppState {
        router: stack.router.clone(),
        dispatcher: Arc::new(dispatcher),
        scheme: config.routing.scheme.clone(),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(state, Duration::from_secs(config.timeouts.request_secs));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
