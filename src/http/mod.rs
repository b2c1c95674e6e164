//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout and trace layers)
//!     → Router::route (method, path, base URL from Host)
//!     → Dispatcher / redirect / 405 / 404
//!     → response.rs (error reports for failures)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{ErrorFrame, ErrorReport};
pub use server::{AppState, HttpServer};
