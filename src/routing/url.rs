//! Reverse URL generation.

use crate::routing::container::RouteContainer;
use crate::routing::error::RouterError;
use crate::routing::path::{encode_segment, Segment};

impl RouteContainer {
    /// Build the URL of the route registered under `id`.
    ///
    /// Placeholders are filled from `arguments` by name. For a dynamic route
    /// the arguments no placeholder consumed are appended as extra segments,
    /// in the given order. The route's own base URL overrides `base_url`.
    pub fn url(
        &self,
        base_url: &str,
        id: &str,
        arguments: &[(&str, &str)],
        query: &[(&str, &str)],
        query_separator: &str,
    ) -> Result<String, RouterError> {
        let route = self
            .route_by_id(id)
            .ok_or_else(|| RouterError::RouteNotFound(id.to_string()))?;

        let mut consumed = vec![false; arguments.len()];
        let mut path = String::new();
        for segment in route.template().segments() {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(&encode_segment(literal)),
                Segment::Placeholder(name) => {
                    let index = arguments
                        .iter()
                        .position(|(argument, _)| argument == name)
                        .ok_or_else(|| RouterError::MissingArgument {
                            route: id.to_string(),
                            name: name.clone(),
                        })?;
                    consumed[index] = true;
                    path.push_str(&encode_segment(arguments[index].1));
                }
            }
        }

        if route.is_dynamic() {
            for (index, (_, value)) in arguments.iter().enumerate() {
                if !consumed[index] {
                    path.push('/');
                    path.push_str(&encode_segment(value));
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        let base = route.base_url().unwrap_or(base_url).trim_end_matches('/');
        let mut url = format!("{}{}", base, path);

        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|(name, value)| format!("{}={}", encode_segment(name), encode_segment(value)))
                .collect();
            url.push('?');
            url.push_str(&pairs.join(query_separator));
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route::{Callback, Route};

    fn container() -> RouteContainer {
        let mut container = RouteContainer::new();
        container.set_route(Route::builder("/", Callback::function("home")).id("home").build().unwrap());
        container.set_route(
            Route::builder("/user/{id}", Callback::method("UserController", "show"))
                .id("user")
                .build()
                .unwrap(),
        );
        container.set_route(
            Route::builder("/files/{root}", Callback::function("files"))
                .id("files")
                .dynamic(true)
                .build()
                .unwrap(),
        );
        container.set_route(
            Route::builder("/", Callback::function("nl"))
                .id("home.nl")
                .base_url("https://example.nl/")
                .build()
                .unwrap(),
        );
        container
    }

    #[test]
    fn test_url_substitutes_placeholders() {
        let container = container();
        assert_eq!(container.url("", "home", &[], &[], "&").unwrap(), "/");
        assert_eq!(container.url("", "user", &[("id", "7")], &[], "&").unwrap(), "/user/7");
        assert_eq!(
            container.url("http://localhost/", "user", &[("id", "a b")], &[], "&").unwrap(),
            "http://localhost/user/a%20b"
        );
    }

    #[test]
    fn test_url_errors() {
        let container = container();
        assert!(matches!(
            container.url("", "missing", &[], &[], "&"),
            Err(RouterError::RouteNotFound(id)) if id == "missing"
        ));
        assert!(matches!(
            container.url("", "user", &[], &[], "&"),
            Err(RouterError::MissingArgument { name, .. }) if name == "id"
        ));
    }

    #[test]
    fn test_dynamic_extras_appended() {
        let container = container();
        let url = container
            .url("", "files", &[("root", "public"), ("a", "css"), ("b", "site.css")], &[], "&")
            .unwrap();
        assert_eq!(url, "/files/public/css/site.css");

        // extras are dropped for static routes
        let url = container.url("", "user", &[("id", "1"), ("extra", "x")], &[], "&").unwrap();
        assert_eq!(url, "/user/1");
    }

    #[test]
    fn test_query_string() {
        let container = container();
        let url = container
            .url("", "user", &[("id", "7")], &[("tab", "posts"), ("q", "a&b")], "&amp;")
            .unwrap();
        assert_eq!(url, "/user/7?tab=posts&amp;q=a%26b");
    }

    #[test]
    fn test_route_base_url_overrides() {
        let container = container();
        assert_eq!(
            container.url("http://localhost", "home.nl", &[], &[], "&").unwrap(),
            "https://example.nl/"
        );
    }
}
