//! Routing outcomes mapped onto HTTP responses.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;

use web_router::dispatch::{Dispatcher, HandlerRegistry, Invocation};
use web_router::http::{AppState, HttpServer};
use web_router::routing::{Callback, Route, RouteContainer, Router};

fn server(echo_unresolved: bool) -> HttpServer {
    let mut container = RouteContainer::new();
    container.set_route(Route::builder("/", Callback::function("home")).id("home").build().unwrap());
    container.set_route(
        Route::builder("/user/{id}", Callback::method("UserController", "show"))
            .id("user")
            .method("GET")
            .build()
            .unwrap(),
    );
    container.set_route(Route::new("/orphan", Callback::function("orphan")).unwrap());
    let alias = container.create_alias("/user/1", "/me", true).unwrap();
    container.set_alias(alias);
    let alias = container.create_alias("/café", "/cafe", true).unwrap();
    container.set_alias(alias);

    let handlers = HandlerRegistry::new()
        .function("home", |_: &Invocation| -> Response { "welcome".into_response() })
        .method("UserController", "show", |invocation: &Invocation| -> Response {
            format!("user {}", invocation.argument("id").unwrap_or("?")).into_response()
        });

    let state = AppState {
        router: Arc::new(Router::from_container(container)),
        dispatcher: Arc::new(Dispatcher::new(Arc::new(handlers)).with_echo(echo_unresolved)),
        scheme: "http".to_string(),
    };
    HttpServer::new(state, Duration::from_secs(5))
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "example.com")
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_matched_route_is_dispatched() {
    let app = server(false).app();

    let response = app.clone().oneshot(request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "welcome");

    let response = app.oneshot(request("GET", "/user/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "user 42");
}

#[tokio::test]
async fn test_alias_redirects_permanently() {
    let response = server(false).app().oneshot(request("GET", "/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.com/user/1"
    );

    let response = server(false).app().oneshot(request("GET", "/cafe")).await.unwrap();
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.com/caf%C3%A9"
    );
}

#[tokio::test]
async fn test_method_not_allowed_sets_allow_header() {
    let response = server(false)
        .app()
        .oneshot(request("DELETE", "/user/42"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = server(false).app().oneshot(request("GET", "/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unresolved_callback() {
    let response = server(false).app().oneshot(request("GET", "/orphan")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let report: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(report["frames"][0]["message"]
        .as_str()
        .unwrap()
        .contains("orphan"));

    let response = server(true).app().oneshot(request("GET", "/orphan")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let echo: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(echo["route"], "/orphan");
    assert_eq!(echo["method"], "GET");
}
