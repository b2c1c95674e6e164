//! Route file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::io::RouteCache;
use crate::routing::Router;

/// Reports changed route files under a set of directories.
pub struct RouteWatcher {
    dirs: Vec<PathBuf>,
    ignored: Option<PathBuf>,
    change_tx: mpsc::UnboundedSender<PathBuf>,
}

impl RouteWatcher {
    /// Create a new RouteWatcher; `ignored` is typically the cache file.
    ///
    /// Returns the watcher and a receiver of changed route file paths.
    pub fn new(dirs: Vec<PathBuf>, ignored: Option<PathBuf>) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (
            Self {
                dirs,
                ignored,
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();
        let ignored = self.ignored.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        for path in event.paths {
                            if is_route_file(&path, ignored.as_deref()) {
                                tracing::info!(path = %path.display(), "Route file change detected");
                                let _ = tx.send(path);
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in &self.dirs {
            if dir.is_dir() {
                watcher.watch(dir, RecursiveMode::Recursive)?;
                tracing::info!(path = %dir.display(), "Route watcher started");
            } else {
                tracing::warn!(path = %dir.display(), "Skipping missing route directory");
            }
        }
        Ok(watcher)
    }
}

/// Route files are `.toml` or `.json`; the ignored path (the cache) never is.
pub fn is_route_file(path: &Path, ignored: Option<&Path>) -> bool {
    if ignored.is_some_and(|ignored| path.ends_with(ignored)) {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("toml") | Some("json")
    )
}

/// Drop the cache and the live container for every reported change.
pub async fn apply_route_changes(
    mut changes: mpsc::UnboundedReceiver<PathBuf>,
    router: Arc<Router>,
    cache: Option<Arc<RouteCache>>,
) {
    while let Some(path) = changes.recv().await {
        // editors often emit several events per save
        while changes.try_recv().is_ok() {}

        if let Some(cache) = &cache {
            if let Err(e) = cache.clear() {
                tracing::warn!(error = %e, "Failed to clear route cache");
            }
        }
        router.invalidate();
        tracing::info!(path = %path.display(), "Routes will reload on next request");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteContainer;

    #[test]
    fn test_is_route_file() {
        let cache = Path::new("/srv/app/var/cache/routes.json");
        assert!(is_route_file(Path::new("/srv/app/config/routes.toml"), Some(cache)));
        assert!(is_route_file(Path::new("/srv/app/config/routes.json"), Some(cache)));
        assert!(!is_route_file(cache, Some(cache)));
        assert!(!is_route_file(Path::new("/srv/app/config/routes.toml.tmp"), Some(cache)));
        assert!(!is_route_file(Path::new("/srv/app/README.md"), None));
    }

    #[tokio::test]
    async fn test_changes_clear_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(RouteCache::new(dir.path().join("routes.json")));
        cache.store(&RouteContainer::new()).unwrap();

        let router = Arc::new(Router::from_container(RouteContainer::new()));
        router.routes().unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(dir.path().join("routes.toml")).unwrap();
        drop(tx);

        apply_route_changes(rx, router, Some(cache.clone())).await;
        assert!(!cache.exists());
    }
}
