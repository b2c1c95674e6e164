//! Resolution of dependency arguments.

use crate::dispatch::error::DispatchError;
use crate::routing::{DependencyArgument, Router};

/// What a resolver may consult.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub router: &'a Router,
    pub base_url: &'a str,
}

/// Resolves dependency arguments of one type into values.
pub trait ArgumentResolver: Send + Sync {
    fn resolve(
        &self,
        name: &str,
        argument: &DependencyArgument,
        context: &ResolveContext<'_>,
    ) -> Result<String, DispatchError>;
}

/// Resolves `route` arguments to the URL of another route.
///
/// Properties: `id` (required) and `arguments`, a map of placeholder values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteUrlArgumentResolver;

impl RouteUrlArgumentResolver {
    pub const TYPE: &'static str = "route";
}

impl ArgumentResolver for RouteUrlArgumentResolver {
    fn resolve(
        &self,
        name: &str,
        argument: &DependencyArgument,
        context: &ResolveContext<'_>,
    ) -> Result<String, DispatchError> {
        let invalid = |reason: &str| DispatchError::InvalidArgument {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let id = argument
            .property("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| invalid("property 'id' must be a string"))?;

        let mut values: Vec<(String, String)> = Vec::new();
        match argument.property("arguments") {
            None => {}
            Some(serde_json::Value::Object(map)) => {
                for (key, value) in map {
                    let value = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    values.push((key.clone(), value));
                }
            }
            Some(_) => return Err(invalid("property 'arguments' must be a table")),
        }

        let pairs: Vec<(&str, &str)> = values.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        Ok(context.router.url(context.base_url, id, &pairs, &[], "&")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Callback, Route, RouteContainer};
    use serde_json::json;

    fn router() -> Router {
        let mut container = RouteContainer::new();
        container.set_route(
            Route::builder("/user/{id}", Callback::function("user")).id("user").build().unwrap(),
        );
        Router::from_container(container)
    }

    #[test]
    fn test_route_argument_builds_url() {
        let router = router();
        let context = ResolveContext {
            router: &router,
            base_url: "http://localhost",
        };
        let argument = DependencyArgument::new("route")
            .with_property("id", json!("user"))
            .with_property("arguments", json!({ "id": 9 }));

        let url = RouteUrlArgumentResolver.resolve("profile", &argument, &context).unwrap();
        assert_eq!(url, "http://localhost/user/9");
    }

    #[test]
    fn test_route_argument_errors() {
        let router = router();
        let context = ResolveContext {
            router: &router,
            base_url: "",
        };

        let missing_id = DependencyArgument::new("route");
        assert!(matches!(
            RouteUrlArgumentResolver.resolve("x", &missing_id, &context),
            Err(DispatchError::InvalidArgument { .. })
        ));

        let missing_value = DependencyArgument::new("route").with_property("id", json!("user"));
        assert!(matches!(
            RouteUrlArgumentResolver.resolve("x", &missing_value, &context),
            Err(DispatchError::Router(_))
        ));
    }
}
