//! Route matching logic.
//!
//! # Responsibilities
//! - Resolve aliases for the requested path (forced aliases first)
//! - Collect every route whose template and base URL match the path
//! - Rank candidates and pick the first one allowing the method
//! - Report method-not-allowed with the union of allowed methods
//!
//! # Design Decisions
//! - Candidates are ranked by literal segment count (descending), then
//!   non-dynamic before dynamic, then base-URL-constrained before
//!   unconstrained, then registration order
//! - A fully literal route therefore never loses to a placeholder route
//! - The best-ranked candidate allowing the method wins; method-not-allowed
//!   is only the answer when no candidate allows it
//! - Matching is pure: no state is touched and no error is possible

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::routing::container::RouteContainer;
use crate::routing::path::RequestPath;
use crate::routing::result::{RouteMatch, RouterResult};
use crate::routing::route::Route;

/// A route whose template matched the request path.
struct Candidate<'a> {
    route: &'a Arc<Route>,
    values: Vec<&'a str>,
    literals: usize,
    order: usize,
}

impl RouteContainer {
    /// Route a request.
    ///
    /// `base_url` is the base URL the request came in on; it is stripped from
    /// `path` when present there and compared against route base URL
    /// constraints.
    pub fn route(&self, method: &str, path: &str, base_url: &str) -> RouterResult {
        let method = method.trim().to_ascii_uppercase();
        let request = RequestPath::parse(path, base_url);
        let base_url = base_url.trim_end_matches('/');

        let mut fallback_alias = None;
        if let Some(alias) = self.alias_by_alias(request.as_str()) {
            if alias.is_forced() {
                tracing::trace!(path = %request.as_str(), target = %alias.path(), "Forced alias matched");
                return RouterResult::Alias(alias.clone());
            }
            fallback_alias = Some(alias.clone());
        }

        let candidates = self.candidates(&request, base_url);
        if candidates.is_empty() {
            return match fallback_alias {
                Some(alias) => {
                    tracing::trace!(path = %request.as_str(), target = %alias.path(), "Alias matched");
                    RouterResult::Alias(alias)
                }
                None => {
                    tracing::trace!(path = %request.as_str(), "No route matched");
                    RouterResult::Empty
                }
            };
        }

        if let Some(candidate) = candidates.iter().find(|c| c.route.allows_method(&method)) {
            tracing::trace!(
                method = %method,
                path = %request.as_str(),
                route = %candidate.route,
                "Route matched"
            );
            let surplus = request.segments()[candidate.route.template().segments().len()..].to_vec();
            return RouterResult::Route(RouteMatch::new(
                candidate.route.clone(),
                candidate.values.clone(),
                surplus,
            ));
        }

        let allowed: BTreeSet<String> = candidates
            .iter()
            .flat_map(|c| c.route.allowed_methods().iter().cloned())
            .collect();
        tracing::trace!(method = %method, path = %request.as_str(), allowed = ?allowed, "Method not allowed");
        RouterResult::MethodNotAllowed(allowed)
    }

    fn candidates<'a>(&'a self, request: &'a RequestPath, base_url: &str) -> Vec<Candidate<'a>> {
        let mut candidates: Vec<Candidate<'a>> = self
            .routes()
            .iter()
            .enumerate()
            .filter(|(_, route)| route.base_url().map_or(true, |base| base == base_url))
            .filter_map(|(order, route)| {
                route
                    .template()
                    .match_segments(request.segments(), route.is_dynamic())
                    .map(|values| Candidate {
                        route,
                        values,
                        literals: route.template().literal_count(),
                        order,
                    })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.literals
                .cmp(&a.literals)
                .then(a.route.is_dynamic().cmp(&b.route.is_dynamic()))
                .then(b.route.base_url().is_some().cmp(&a.route.base_url().is_some()))
                .then(a.order.cmp(&b.order))
        });
        candidates
    }
}
