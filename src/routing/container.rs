//! The route container: registry of routes and aliases.
//!
//! # Responsibilities
//! - Hold routes in registration order, indexed by id
//! - Hold aliases keyed by their requested path
//! - Apply override semantics when routes or whole containers are merged
//!
//! # Design Decisions
//! - Routes are shared as `Arc<Route>` so match results never copy them
//! - Registration order is the final tie-break when matching, so an
//!   overriding route keeps the position of the route it replaces
//! - Matching lives in `matcher.rs`, URL generation in `url.rs`

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::routing::alias::Alias;
use crate::routing::error::RouterError;
use crate::routing::path::{normalize_path, PathTemplate};
use crate::routing::route::{Callback, Route, RouteBuilder};

/// In-memory registry of routes and aliases.
#[derive(Debug, Clone, Default)]
pub struct RouteContainer {
    source: Option<String>,
    routes: Vec<Arc<Route>>,
    ids: HashMap<String, usize>,
    aliases: BTreeMap<String, Arc<Alias>>,
}

impl RouteContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container whose factory methods stamp routes with `source`.
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub(crate) fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    /// Start a route carrying this container's source tag.
    pub fn create_route(&self, path: impl Into<String>, callback: Callback) -> RouteBuilder {
        let builder = Route::builder(path, callback);
        match &self.source {
            Some(source) => builder.source(source.clone()),
            None => builder,
        }
    }

    /// Create an alias carrying this container's source tag.
    pub fn create_alias(&self, path: &str, alias: &str, forced: bool) -> Result<Alias, RouterError> {
        let alias = Alias::new(path, alias)?.with_forced(forced);
        Ok(match &self.source {
            Some(source) => alias.with_source(source.clone()),
            None => alias,
        })
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.aliases.is_empty()
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Arc<Route>> {
        self.ids.get(id).map(|&index| &self.routes[index])
    }

    /// First route registered for exactly this template path.
    pub fn route_by_path(&self, path: &str) -> Option<&Arc<Route>> {
        let template = PathTemplate::parse(path).ok()?;
        self.routes.iter().find(|route| route.template() == &template)
    }

    /// Add a route, replacing every route it conflicts with.
    ///
    /// The route takes the position of the first conflicting route, or is
    /// appended when nothing conflicts.
    pub fn set_route(&mut self, route: Route) {
        let conflicting: Vec<usize> = self
            .routes
            .iter()
            .enumerate()
            .filter(|(_, existing)| existing.conflicts_with(&route))
            .map(|(index, _)| index)
            .collect();

        let route = Arc::new(route);
        match conflicting.split_first() {
            Some((&first, rest)) => {
                tracing::trace!(route = %route, replaced = conflicting.len(), "Overriding route");
                self.routes[first] = route;
                for &index in rest.iter().rev() {
                    self.routes.remove(index);
                }
            }
            None => self.routes.push(route),
        }
        self.reindex();
    }

    /// Remove the routes conflicting with `route`; returns the first removed.
    pub fn unset_route(&mut self, route: &Route) -> Option<Arc<Route>> {
        let mut removed = None;
        self.routes.retain(|existing| {
            if existing.conflicts_with(route) {
                removed.get_or_insert_with(|| existing.clone());
                false
            } else {
                true
            }
        });
        self.reindex();
        removed
    }

    /// Remove the route registered under `id`.
    pub fn unset_route_by_id(&mut self, id: &str) -> Option<Arc<Route>> {
        let index = *self.ids.get(id)?;
        let removed = self.routes.remove(index);
        self.reindex();
        Some(removed)
    }

    /// Aliases ordered by requested path.
    pub fn aliases(&self) -> impl Iterator<Item = &Arc<Alias>> {
        self.aliases.values()
    }

    /// Register an alias under its requested path.
    ///
    /// A forced alias is only replaced by another forced alias; returns
    /// whether the alias was stored.
    pub fn set_alias(&mut self, alias: Alias) -> bool {
        if let Some(existing) = self.aliases.get(alias.alias()) {
            if existing.is_forced() && !alias.is_forced() {
                tracing::debug!(
                    alias = %alias.alias(),
                    "Keeping forced alias over non-forced replacement"
                );
                return false;
            }
        }
        self.aliases.insert(alias.alias().to_string(), Arc::new(alias));
        true
    }

    pub fn unset_alias(&mut self, alias: &Alias) -> Option<Arc<Alias>> {
        self.aliases.remove(alias.alias())
    }

    /// First alias whose canonical path is `path`.
    pub fn alias_by_path(&self, path: &str) -> Option<&Arc<Alias>> {
        let path = normalize_path(path);
        self.aliases.values().find(|alias| alias.path() == path)
    }

    /// The alias registered for the requested path `alias`.
    pub fn alias_by_alias(&self, alias: &str) -> Option<&Arc<Alias>> {
        self.aliases.get(&normalize_path(alias))
    }

    /// Merge another container into this one; `other` wins on collisions.
    pub fn add_container(&mut self, other: &RouteContainer) {
        for route in &other.routes {
            self.set_route(Route::clone(route));
        }
        for alias in other.aliases.values() {
            self.set_alias(Alias::clone(alias));
        }
    }

    fn reindex(&mut self) {
        self.ids.clear();
        for (index, route) in self.routes.iter().enumerate() {
            if let Some(id) = route.id() {
                self.ids.entry(id.to_string()).or_insert(index);
            }
        }
    }
}

impl PartialEq for RouteContainer {
    fn eq(&self, other: &Self) -> bool {
        self.routes.len() == other.routes.len()
            && self.routes.iter().zip(&other.routes).all(|(a, b)| a == b)
            && self.aliases == other.aliases
    }
}
