//! Route dispatcher.
//!
//! # Responsibilities
//! - Resolve every bound argument of a match into a string value
//! - Look up the action for the route's callback and invoke it
//! - Optionally echo unresolved invocations as JSON
//!
//! # Design Decisions
//! - Argument resolvers are keyed by type name; `route` is always present
//! - Resolution happens before the action is looked up, so argument
//!   errors surface even for echoed invocations

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::dispatch::arguments::{ArgumentResolver, ResolveContext, RouteUrlArgumentResolver};
use crate::dispatch::error::DispatchError;
use crate::dispatch::handler::{CallbackResolver, Invocation};
use crate::routing::{RouteArgument, RouteMatch, Router};

/// Invokes the actions of matched routes.
pub struct Dispatcher {
    callbacks: Arc<dyn CallbackResolver>,
    arguments: HashMap<String, Arc<dyn ArgumentResolver>>,
    echo_unresolved: bool,
}

impl Dispatcher {
    pub fn new(callbacks: Arc<dyn CallbackResolver>) -> Self {
        let mut arguments: HashMap<String, Arc<dyn ArgumentResolver>> = HashMap::new();
        arguments.insert(
            RouteUrlArgumentResolver::TYPE.to_string(),
            Arc::new(RouteUrlArgumentResolver),
        );
        Self {
            callbacks,
            arguments,
            echo_unresolved: false,
        }
    }

    pub fn with_argument_resolver(mut self, kind: impl Into<String>, resolver: Arc<dyn ArgumentResolver>) -> Self {
        self.arguments.insert(kind.into(), resolver);
        self
    }

    /// Answer unresolved callbacks with a JSON description of the invocation.
    pub fn with_echo(mut self, echo_unresolved: bool) -> Self {
        self.echo_unresolved = echo_unresolved;
        self
    }

    /// Build the invocation for a match.
    pub fn invocation(
        &self,
        matched: &RouteMatch,
        method: &str,
        context: &ResolveContext<'_>,
    ) -> Result<Invocation, DispatchError> {
        let mut arguments = Vec::with_capacity(matched.arguments().len());
        for (name, argument) in matched.arguments() {
            let value = match argument {
                RouteArgument::Scalar(value) => value.clone(),
                RouteArgument::Dependency(dependency) => {
                    let resolver = self.arguments.get(&dependency.kind).ok_or_else(|| {
                        DispatchError::UnknownArgumentType {
                            name: name.clone(),
                            kind: dependency.kind.clone(),
                        }
                    })?;
                    resolver.resolve(name, dependency, context)?
                }
            };
            arguments.push((name.clone(), value));
        }

        Ok(Invocation {
            route: matched.route().clone(),
            method: method.to_string(),
            base_url: context.base_url.to_string(),
            arguments,
            dynamic_arguments: matched.dynamic_arguments().to_vec(),
        })
    }

    pub fn dispatch(
        &self,
        matched: &RouteMatch,
        method: &str,
        router: &Router,
        base_url: &str,
    ) -> Result<Response, DispatchError> {
        let context = ResolveContext { router, base_url };
        let invocation = self.invocation(matched, method, &context)?;
        let callback = invocation.route.callback();

        match self.callbacks.resolve(callback) {
            Some(action) => {
                tracing::debug!(callback = %callback, route = %invocation.route, "Dispatching");
                Ok(action.invoke(&invocation))
            }
            None if self.echo_unresolved => {
                tracing::debug!(callback = %callback, "Echoing unresolved callback");
                Ok(echo(&invocation))
            }
            None => Err(DispatchError::UnresolvedCallback(callback.to_string())),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("argument_types", &self.arguments.keys().collect::<Vec<_>>())
            .field("echo_unresolved", &self.echo_unresolved)
            .finish()
    }
}

/// JSON description of an invocation.
pub fn echo(invocation: &Invocation) -> Response {
    let arguments: serde_json::Map<String, serde_json::Value> = invocation
        .arguments
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
        .collect();

    Json(serde_json::json!({
        "route": invocation.route.path(),
        "id": invocation.route.id(),
        "callback": invocation.route.callback(),
        "method": invocation.method,
        "arguments": arguments,
        "dynamic_arguments": invocation.dynamic_arguments,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::handler::HandlerRegistry;
    use crate::routing::{Callback, DependencyArgument, Route, RouteContainer};
    use axum::http::StatusCode;

    fn router() -> Router {
        let mut container = RouteContainer::new();
        container.set_route(Route::builder("/", Callback::function("home")).id("home").build().unwrap());
        container.set_route(
            Route::builder("/user/{id}", Callback::method("UserController", "show"))
                .id("user")
                .argument(
                    "back",
                    RouteArgument::Dependency(
                        DependencyArgument::new("route").with_property("id", serde_json::json!("home")),
                    ),
                )
                .build()
                .unwrap(),
        );
        Router::from_container(container)
    }

    #[test]
    fn test_invocation_resolves_arguments() {
        let router = router();
        let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new()));
        let result = router.route("GET", "/user/5", "http://localhost").unwrap();
        let context = ResolveContext {
            router: &router,
            base_url: "http://localhost",
        };

        let invocation = dispatcher.invocation(result.route().unwrap(), "GET", &context).unwrap();
        assert_eq!(invocation.argument("id"), Some("5"));
        assert_eq!(invocation.argument("back"), Some("http://localhost/"));
    }

    #[test]
    fn test_unknown_argument_type() {
        let mut container = RouteContainer::new();
        container.set_route(
            Route::builder("/", Callback::function("home"))
                .argument("db", RouteArgument::Dependency(DependencyArgument::new("database")))
                .build()
                .unwrap(),
        );
        let router = Router::from_container(container);
        let result = router.route("GET", "/", "").unwrap();

        let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new())).with_echo(true);
        let err = dispatcher.dispatch(result.route().unwrap(), "GET", &router, "").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownArgumentType { kind, .. } if kind == "database"));
    }

    #[test]
    fn test_unresolved_callback() {
        let router = router();
        let result = router.route("GET", "/", "").unwrap();
        let matched = result.route().unwrap();

        let strict = Dispatcher::new(Arc::new(HandlerRegistry::new()));
        assert!(matches!(
            strict.dispatch(matched, "GET", &router, ""),
            Err(DispatchError::UnresolvedCallback(_))
        ));

        let echoing = Dispatcher::new(Arc::new(HandlerRegistry::new())).with_echo(true);
        let response = echoing.dispatch(matched, "GET", &router, "").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_registered_action_invoked() {
        let router = router();
        let registry = HandlerRegistry::new().function("home", |_: &Invocation| {
            (StatusCode::ACCEPTED, "home").into_response()
        });
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let result = router.route("GET", "/", "").unwrap();

        let response = dispatcher.dispatch(result.route().unwrap(), "GET", &router, "").unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
