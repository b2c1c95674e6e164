//! In-memory route container IOs.

use std::sync::{Mutex, PoisonError};

use crate::io::error::IoError;
use crate::io::RouteContainerIo;
use crate::routing::RouteContainer;

/// Holds the container in process memory; writes replace it.
#[derive(Debug, Default)]
pub struct MemoryRouteContainerIo {
    container: Mutex<RouteContainer>,
}

impl MemoryRouteContainerIo {
    pub fn new(container: RouteContainer) -> Self {
        Self {
            container: Mutex::new(container),
        }
    }
}

impl RouteContainerIo for MemoryRouteContainerIo {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn route_container(&self) -> Result<RouteContainer, IoError> {
        Ok(self.container.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn set_route_container(&self, container: &RouteContainer) -> Result<(), IoError> {
        *self.container.lock().unwrap_or_else(PoisonError::into_inner) = container.clone();
        Ok(())
    }
}

/// Serves a fixed container and refuses writes.
#[derive(Debug, Clone, Default)]
pub struct StaticRouteContainerIo {
    container: RouteContainer,
}

impl StaticRouteContainerIo {
    pub fn new(container: RouteContainer) -> Self {
        Self { container }
    }
}

impl RouteContainerIo for StaticRouteContainerIo {
    fn name(&self) -> &'static str {
        "static"
    }

    fn route_container(&self) -> Result<RouteContainer, IoError> {
        Ok(self.container.clone())
    }

    fn set_route_container(&self, _container: &RouteContainer) -> Result<(), IoError> {
        Err(IoError::ReadOnly(self.name().to_string()))
    }

    fn accepts_writes(&self) -> bool {
        false
    }
}
