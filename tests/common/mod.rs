//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use web_router::io::{IoError, MemoryRouteContainerIo, RouteContainerIo, RouteFileLayout};
use web_router::routing::RouteContainer;

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// `routes.toml` under `config/` of the application directory.
pub fn layout(application_dir: &Path) -> RouteFileLayout {
    RouteFileLayout::new(application_dir, "routes.toml").with_path("config")
}

/// A small application: home page, user pages, a POST-only form and an alias.
pub const APPLICATION_ROUTES: &str = r#"
[[routes]]
path = "/"
function = "home"
id = "home"

[[routes]]
path = "/user/{id}"
controller = "UserController"
action = "show"
id = "user"
methods = ["GET"]

[[routes]]
path = "/user/{id}/edit"
controller = "UserController"
action = "edit"
id = "user.edit"
methods = ["GET", "POST"]

[[routes]]
path = "/contact"
function = "contact"
methods = ["POST"]

[[routes]]
path = "/files"
function = "files"
dynamic = true

[[aliases]]
path = "/user/1"
alias = "/me"
force = true
"#;

/// Memory IO counting reads and writes.
#[derive(Debug, Default)]
pub struct CountingIo {
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub inner: MemoryRouteContainerIo,
}

impl CountingIo {
    pub fn with_container(container: RouteContainer) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryRouteContainerIo::new(container),
            ..Self::default()
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
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
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_route_container(container)
    }
}
