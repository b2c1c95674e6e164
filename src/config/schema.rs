//! Configuration schema definitions.
//!
//! This module defines the application configuration of the router service.
//! All types derive Serde traits for deserialization from TOML files, and
//! every field has a default so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::io::RouteFileLayout;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route files, cache and request handling.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where routes come from and how they are served.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Route file name looked up in every directory.
    pub file: String,

    /// Sub directory of each root holding route files; empty for the root itself.
    pub path: String,

    /// Application root; its route file overrides modules and receives writes.
    pub application_dir: PathBuf,

    /// Module roots, lowest precedence first.
    pub module_dirs: Vec<PathBuf>,

    /// Environment name selecting `<path>/<environment>/<file>` overrides.
    pub environment: Option<String>,

    /// Serve the container from a JSON snapshot when present.
    pub cache_enabled: bool,

    /// Snapshot location.
    pub cache_file: PathBuf,

    /// Reload routes when route files change.
    pub watch: bool,

    /// Scheme of request base URLs (`http` or `https`).
    pub scheme: String,

    /// Answer routes without a registered action with a JSON echo.
    pub echo_unresolved: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            file: "routes.toml".to_string(),
            path: "config".to_string(),
            application_dir: PathBuf::from("."),
            module_dirs: Vec::new(),
            environment: None,
            cache_enabled: true,
            cache_file: PathBuf::from("var/cache/routes.json"),
            watch: false,
            scheme: "http".to_string(),
            echo_unresolved: true,
        }
    }
}

impl RoutingConfig {
    pub fn layout(&self) -> RouteFileLayout {
        let mut layout = RouteFileLayout::new(&self.application_dir, &self.file);
        if !self.path.is_empty() {
            layout = layout.with_path(&self.path);
        }
        for dir in &self.module_dirs {
            layout = layout.with_module_dir(dir);
        }
        if let Some(environment) = &self.environment {
            layout = layout.with_environment(environment);
        }
        layout
    }

    /// Directories the route file watcher observes.
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        std::iter::once(&self.application_dir)
            .chain(&self.module_dirs)
            .cloned()
            .collect()
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
