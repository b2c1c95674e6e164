//! URL routing for server-side web applications.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod io;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use routing::{RouteContainer, Router, RouterResult};
