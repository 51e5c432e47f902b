//! Seeklit web frontend library.
//!
//! A server-rendered "backend for frontend" for Seeklit. It owns the browser
//! session cookie, resolves the current user against the Seeklit API server
//! or the Audiobookshelf media server, completes OIDC sign-in, coordinates
//! logout, and proxies the JSON calls the UI makes.
//!
//! The binary in `main.rs` only wires configuration, tracing and Sentry
//! around [`app`]; tests build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;

use axum::{Router, body::Body, http::Request, middleware as axum_middleware};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router with all middleware.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .with_state(state)
        .layer(axum_middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
