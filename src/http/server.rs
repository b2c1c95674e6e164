//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the routing handler
//! - Wire up middleware (request timeout, tracing)
//! - Map routing outcomes onto HTTP responses
//! - Serve until a shutdown signal arrives
//!
//! # Outcome Mapping
//! - matched route → dispatched action
//! - alias → `301 Moved Permanently` to the canonical path
//! - method not allowed → `405` with an `Allow` header
//! - no match → `404`
//! - load or dispatch failure → `500` with an error report

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::dispatch::Dispatcher;
use crate::http::response::ErrorReport;
use crate::lifecycle::signals::shutdown_signal;
use crate::routing::path::encode_segment;
use crate::routing::{Router as RouteRouter, RouterResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RouteRouter>,
    pub dispatcher: Arc<Dispatcher>,
    /// Scheme used to build the request base URL from the `Host` header.
    pub scheme: String,
}

/// HTTP front end of the routing table.
pub struct HttpServer {
    app: Router,
}

impl HttpServer {
    pub fn new(state: AppState, request_timeout: Duration) -> Self {
        Self {
            app: Self::build_router(state, request_timeout),
        }
    }

    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/{*path}", any(route_handler))
            .route("/", any(route_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
    }

    /// The service, for embedding or `oneshot` tests.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Serve until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `<scheme>://<host>` of the request, empty without a `Host` header.
pub fn request_base_url(scheme: &str, headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("{}://{}", scheme, host))
        .unwrap_or_default()
}

async fn route_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let start_time = Instant::now();
    let base_url = request_base_url(&state.scheme, &headers);
    let path = uri.path();

    let result = match state.router.route(method.as_str(), path, &base_url) {
        Ok(result) => result,
        Err(e) => {
            let report = ErrorReport::capture(&e);
            tracing::error!(method = %method, path = %path, error = %report.summary(), "Routing failed");
            return report.into_response();
        }
    };

    let outcome = result.outcome();
    let response = match result {
        RouterResult::Route(matched) => {
            match state
                .dispatcher
                .dispatch(&matched, method.as_str(), &state.router, &base_url)
            {
                Ok(response) => response,
                Err(e) => {
                    let report = ErrorReport::capture(&e);
                    tracing::error!(
                        method = %method,
                        path = %path,
                        route = %matched.route(),
                        error = %report.summary(),
                        "Dispatch failed"
                    );
                    report.into_response()
                }
            }
        }
        RouterResult::Alias(alias) => {
            let path: Vec<String> = alias.path().split('/').map(encode_segment).collect();
            let location = format!("{}{}", base_url, path.join("/"));
            match HeaderValue::from_str(&location) {
                Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
                Err(e) => ErrorReport::capture(&e).into_response(),
            }
        }
        RouterResult::MethodNotAllowed(methods) => {
            let allow = methods.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
            match HeaderValue::from_str(&allow) {
                Ok(value) => (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, value)]).into_response(),
                Err(e) => ErrorReport::capture(&e).into_response(),
            }
        }
        RouterResult::Empty => (StatusCode::NOT_FOUND, "No matching route found").into_response(),
    };

    tracing::debug!(
        method = %method,
        path = %path,
        outcome = outcome,
        status = response.status().as_u16(),
        elapsed_us = start_time.elapsed().as_micros() as u64,
        "Request routed"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_base_url() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_base_url("http", &headers), "");

        headers.insert(header::HOST, HeaderValue::from_static("example.com:8080"));
        assert_eq!(request_base_url("https", &headers), "https://example.com:8080");
    }
}
