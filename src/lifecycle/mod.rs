//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build IO stack and router → Preload → Start listener
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → Graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routing, then the listener
//! - Listener starts last (traffic only when routes are loaded)

pub mod signals;
pub mod startup;

pub use startup::{build_routing, RoutingStack};
