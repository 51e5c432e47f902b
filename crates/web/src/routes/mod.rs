//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (requires auth)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Seeklit server reachability
//!
//! # Auth
//! GET  /auth                   - Login page
//! POST /auth                   - Direct (Audiobookshelf) sign-in
//! GET  /auth/oidc/login        - Redirect to the Seeklit server's OIDC login
//! GET  /auth/callback          - OIDC callback
//! POST /auth/session           - Store a browser-obtained token as the session
//! GET  /logout                 - Logout
//! POST /logout                 - Logout
//!
//! # API (JSON, requires auth unless noted)
//! POST   /api/search/{provider}          - Provider search (409 when superseded)
//! GET    /api/search/personalized        - Recently added books
//! GET    /api/requests                   - List book requests
//! POST   /api/requests                   - Create book request
//! PATCH  /api/requests/{id}              - Update book request
//! DELETE /api/requests/{id}              - Delete book request
//! GET    /api/issues                     - List issues
//! POST   /api/issues                     - Report issue
//! PATCH  /api/issues/{id}                - Update issue
//! DELETE /api/issues/{id}                - Delete issue
//! GET    /api/settings                   - Public server settings (no auth)
//! GET    /api/settings/config            - Server configuration (admin)
//! PATCH  /api/settings/config            - Update server configuration (admin)
//! GET    /api/preferences                - Notification preferences
//! PUT    /api/preferences                - Update notification preferences
//! POST   /api/preferences/verify-email   - Send verification email
//! GET    /api/preferences/verify-email   - Confirm verification code
//! GET    /api/me                         - Current user profile
//! GET    /api/users                      - Audiobookshelf users (admin)
//! ```

pub mod api;
pub mod auth;
pub mod health;
pub mod home;
pub mod logout;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::login_page).post(auth::login))
        .route("/oidc/login", get(auth::oidc_login))
        .route("/callback", get(auth::oidc_callback))
        .route("/session", post(auth::create_session))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/search/personalized", get(api::search::personalized))
        .route("/search/{provider}", post(api::search::search))
        .route(
            "/requests",
            get(api::requests::list).post(api::requests::create),
        )
        .route(
            "/requests/{id}",
            patch(api::requests::update).delete(api::requests::delete),
        )
        .route("/issues", get(api::issues::list).post(api::issues::create))
        .route(
            "/issues/{id}",
            patch(api::issues::update).delete(api::issues::delete),
        )
        .route("/settings", get(api::settings::public))
        .route(
            "/settings/config",
            get(api::settings::config).patch(api::settings::update_config),
        )
        .route(
            "/preferences",
            get(api::preferences::get).put(api::preferences::update),
        )
        .route(
            "/preferences/verify-email",
            get(api::preferences::verify).post(api::preferences::send_verification),
        )
        .route("/me", get(api::me::me))
        .route("/users", get(api::users::list))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/logout", get(logout::logout).post(logout::logout))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
