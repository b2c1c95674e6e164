//! Property tests for matching and URL generation.

use proptest::prelude::*;

use web_router::routing::{Callback, Route, RouteContainer};

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,7}"
}

proptest! {
    #[test]
    fn generated_url_routes_back_to_its_route(
        literals in prop::collection::vec(segment(), 0..4),
        value in "[a-zA-Z0-9 %&?#+.-]{1,12}",
    ) {
        let mut path = String::new();
        for literal in &literals {
            path.push('/');
            path.push_str(literal);
        }
        path.push_str("/{value}");

        let mut container = RouteContainer::new();
        container.set_route(Route::builder(&path, Callback::function("target")).id("target").build().unwrap());

        let url = container.url("", "target", &[("value", value.as_str())], &[], "&").unwrap();
        let result = container.route("GET", &url, "");
        let matched = result.route().expect("generated URL should match");
        prop_assert_eq!(matched.route().id(), Some("target"));
        prop_assert_eq!(matched.value("value"), Some(value.as_str()));
    }

    #[test]
    fn literal_route_wins_regardless_of_order(
        prefix in segment(),
        name in segment(),
        literal_first in any::<bool>(),
    ) {
        let literal = Route::new(&format!("/{}/{}", prefix, name), Callback::function("literal")).unwrap();
        let wildcard = Route::new(&format!("/{}/{{name}}", prefix), Callback::function("wildcard")).unwrap();

        let mut container = RouteContainer::new();
        if literal_first {
            container.set_route(literal);
            container.set_route(wildcard);
        } else {
            container.set_route(wildcard);
            container.set_route(literal);
        }

        let result = container.route("GET", &format!("/{}/{}", prefix, name), "");
        let matched = result.route().expect("a route should match");
        prop_assert_eq!(matched.route().callback(), &Callback::function("literal"));
    }

    #[test]
    fn matching_ignores_slash_noise(
        segments in prop::collection::vec(segment(), 1..5),
    ) {
        let path = format!("/{}", segments.join("/"));
        let mut container = RouteContainer::new();
        container.set_route(Route::new(&path, Callback::function("page")).unwrap());

        let noisy = format!("//{}/", segments.join("//"));
        prop_assert!(container.route("GET", &noisy, "").route().is_some());
    }
}
