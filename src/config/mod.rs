//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → lifecycle/startup.rs builds the routing stack from it
//!
//! On route file change (routing.watch):
//!     watcher.rs detects change
//!     → route cache cleared
//!     → router invalidated, reloads on next request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; route files reload, config does not
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, ListenerConfig, ObservabilityConfig, RoutingConfig, TimeoutConfig};
pub use validation::ValidationError;
