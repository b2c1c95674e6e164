//! Chains of route container IOs.

use std::sync::Arc;

use crate::io::error::IoError;
use crate::io::RouteContainerIo;
use crate::routing::RouteContainer;

/// Merges the containers of several IOs.
///
/// Reads merge every member in order, later members overriding earlier
/// ones. Writes go to the first member that accepts them.
#[derive(Debug, Clone, Default)]
pub struct ChainedRouteContainerIo {
    members: Vec<Arc<dyn RouteContainerIo>>,
}

impl ChainedRouteContainerIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, io: Arc<dyn RouteContainerIo>) -> Self {
        self.push(io);
        self
    }

    pub fn push(&mut self, io: Arc<dyn RouteContainerIo>) {
        self.members.push(io);
    }

    /// Remove a member by identity; returns whether it was present.
    pub fn remove(&mut self, io: &Arc<dyn RouteContainerIo>) -> bool {
        let before = self.members.len();
        self.members.retain(|member| !Arc::ptr_eq(member, io));
        self.members.len() != before
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl RouteContainerIo for ChainedRouteContainerIo {
    fn name(&self) -> &'static str {
        "chain"
    }

    /// The merged container takes the source of the first member accepting
    /// writes, so routes created from it are kept by the member that will
    /// persist them.
    fn route_container(&self) -> Result<RouteContainer, IoError> {
        let mut merged = RouteContainer::new();
        let mut source = None;
        for member in &self.members {
            let container = member.route_container()?;
            if source.is_none() && member.accepts_writes() {
                source = Some(container.source().map(str::to_string));
            }
            merged.add_container(&container);
        }
        merged.set_source(source.flatten());
        Ok(merged)
    }

    fn set_route_container(&self, container: &RouteContainer) -> Result<(), IoError> {
        if self.members.is_empty() {
            return Err(IoError::EmptyChain);
        }

        let mut rejected = Vec::new();
        for member in &self.members {
            match member.set_route_container(container) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(io = member.name(), error = %e, "Chain member rejected write");
                    rejected.push(e);
                }
            }
        }
        Err(IoError::ChainRejected(rejected))
    }

    fn accepts_writes(&self) -> bool {
        self.members.iter().any(|member| member.accepts_writes())
    }

    fn invalidate(&self) {
        for member in &self.members {
            member.invalidate();
        }
    }
}
