//! Route container persistence.
//!
//! # Data Flow
//! ```text
//! Read (first access, or after invalidation):
//!     CachedRouteContainerIo
//!         → RouteCache::load (JSON snapshot)        hit  → RouteContainer
//!         → ParserRouteContainerIo (route files)    miss → RouteContainer
//!         → RouteCache::store
//!
//! Write (administrative set/unset):
//!     RouteContainer
//!         → ParserRouteContainerIo (application route file only)
//!         → RouteCache::clear
//! ```
//!
//! # Design Decisions
//! - Every IO hands out an owned container; the router shares it
//! - Files are replaced atomically (temp file + rename)
//! - Read-only IOs refuse writes with an error, which lets a chain fall
//!   through to the next member

pub mod cache;
pub mod chain;
pub mod definition;
pub mod error;
pub mod format;
pub mod memory;
pub mod parser;

use std::fmt;
use std::fs;
use std::path::Path;

use crate::routing::RouteContainer;

pub use cache::{CachedRouteContainerIo, RouteCache};
pub use chain::ChainedRouteContainerIo;
pub use error::IoError;
pub use format::ConfigFormat;
pub use memory::{MemoryRouteContainerIo, StaticRouteContainerIo};
pub use parser::{ParserRouteContainerIo, RouteFileLayout};

/// Source and sink of a route container.
pub trait RouteContainerIo: Send + Sync + fmt::Debug {
    /// Short name used in logs and metrics labels.
    fn name(&self) -> &'static str;

    /// Read the container.
    fn route_container(&self) -> Result<RouteContainer, IoError>;

    /// Persist the container.
    fn set_route_container(&self, container: &RouteContainer) -> Result<(), IoError>;

    /// Whether `set_route_container` can succeed at all.
    fn accepts_writes(&self) -> bool {
        true
    }

    /// Forget any container held in process memory.
    fn invalidate(&self) {}
}

/// Replace `path` with `content` through a sibling temp file.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<(), IoError> {
    let write_error = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = Path::new(&temp);

    fs::write(temp, content).map_err(write_error)?;
    fs::rename(temp, path).map_err(|source| {
        let _ = fs::remove_file(temp);
        write_error(source)
    })
}

/// Delete `path`; returns whether there was anything to delete.
pub(crate) fn remove_if_exists(path: &Path) -> Result<bool, IoError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(IoError::Write {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/routes.json");

        write_atomic(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(!dir.path().join("nested/dir/routes.json.tmp").exists());

        write_atomic(&path, "[]").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        assert!(!remove_if_exists(&path).unwrap());
        fs::write(&path, "x").unwrap();
        assert!(remove_if_exists(&path).unwrap());
    }
}
