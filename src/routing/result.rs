//! Match outcomes.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::routing::alias::Alias;
use crate::routing::route::{Route, RouteArgument};

/// Outcome of routing a request.
#[derive(Debug, Clone)]
pub enum RouterResult {
    /// A route matched path and method.
    Route(RouteMatch),
    /// An alias applies; redirect to its canonical path.
    Alias(Arc<Alias>),
    /// The path matched, but no route allows the method.
    MethodNotAllowed(BTreeSet<String>),
    /// Nothing matched the path.
    Empty,
}

impl RouterResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, RouterResult::Empty)
    }

    pub fn route(&self) -> Option<&RouteMatch> {
        match self {
            RouterResult::Route(matched) => Some(matched),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&Alias> {
        match self {
            RouterResult::Alias(alias) => Some(alias),
            _ => None,
        }
    }

    /// Methods to advertise in an `Allow` header.
    pub fn allowed_methods(&self) -> Option<&BTreeSet<String>> {
        match self {
            RouterResult::MethodNotAllowed(methods) => Some(methods),
            _ => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            RouterResult::Route(_) => "route",
            RouterResult::Alias(_) => "alias",
            RouterResult::MethodNotAllowed(_) => "method_not_allowed",
            RouterResult::Empty => "empty",
        }
    }
}

/// A matched route with its bound arguments.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: Arc<Route>,
    arguments: Vec<(String, RouteArgument)>,
    dynamic_arguments: Vec<String>,
}

impl RouteMatch {
    /// Bind placeholder values (template order) and merge the route's
    /// predefined arguments for names the path did not bind.
    pub(crate) fn new(route: Arc<Route>, values: Vec<&str>, dynamic_arguments: Vec<String>) -> Self {
        let mut arguments: Vec<(String, RouteArgument)> = route
            .template()
            .placeholders()
            .zip(values)
            .map(|(name, value)| (name.to_string(), RouteArgument::scalar(value)))
            .collect();

        for (name, argument) in route.predefined_arguments() {
            if !arguments.iter().any(|(bound, _)| bound == name) {
                arguments.push((name.clone(), argument.clone()));
            }
        }

        Self {
            route,
            arguments,
            dynamic_arguments,
        }
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Path values in template order, then predefined arguments.
    pub fn arguments(&self) -> &[(String, RouteArgument)] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&RouteArgument> {
        self.arguments
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, argument)| argument)
    }

    /// Literal value of an argument; `None` for unknown or deferred arguments.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.argument(name).and_then(RouteArgument::as_scalar)
    }

    /// Surplus segments absorbed by a dynamic route.
    pub fn dynamic_arguments(&self) -> &[String] {
        &self.dynamic_arguments
    }
}
