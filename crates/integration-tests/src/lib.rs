//! End-to-end tests for the Seeklit web frontend.
//!
//! Each test spawns the real router on an ephemeral port with the Seeklit
//! API server and Audiobookshelf replaced by `wiremock` servers, then drives
//! it with a cookie-keeping `reqwest` client that does not follow redirects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p seeklit-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};

use reqwest::{Client, Response, redirect};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seeklit_core::AuthSource;
use seeklit_web::config::{UpstreamConfig, WebConfig};
use seeklit_web::session::SessionConfig;
use seeklit_web::state::AppState;

/// Signing secret used by every spawned app.
pub const TEST_SESSION_SECRET: &str = "k8Jq2vN5xR7tY1pL4mZ9wB3cF6hD0sGa";

/// A running frontend with mocked upstreams.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub seeklit: MockServer,
    pub media_server: MockServer,
}

impl TestApp {
    /// Spawn the app with both upstreams mocked.
    pub async fn spawn() -> Self {
        let seeklit = MockServer::start().await;
        let media_server = MockServer::start().await;
        let address = serve(UpstreamConfig {
            server_url: Some(seeklit.uri()),
            public_server_url: Some(seeklit.uri()),
            media_server_url: Some(media_server.uri()),
        })
        .await;

        Self {
            address,
            client: client(),
            seeklit,
            media_server,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request failed")
    }

    /// Store `token` as the browser session through `POST /auth/session`.
    pub async fn sign_in_with_token(&self, token: &str) {
        let response = self.post_json("/auth/session", &json!({ "token": token })).await;
        assert_eq!(response.status(), 200, "session was not created");
    }

    /// Make the Seeklit server recognise `token` as `username`'s session.
    pub async fn mock_session(&self, token: &str, username: &str, user_type: &str, source: AuthSource) {
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/tokens"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {
                    "id": format!("id-{username}"),
                    "username": username,
                    "type": user_type,
                    "token": token,
                    "auth_source": source.as_str(),
                },
                "auth_source": source.as_str(),
            })))
            .mount(&self.seeklit)
            .await;
    }

    /// Sign in as a regular OIDC user named `alice`.
    pub async fn sign_in_as_alice(&self) {
        self.mock_session("alice-token", "alice", "user", AuthSource::Oidc)
            .await;
        self.sign_in_with_token("alice-token").await;
    }
}

/// Start the app with the given upstreams and return its base URL.
pub async fn serve(upstream: UpstreamConfig) -> String {
    let state = AppState::new(test_config(upstream)).expect("failed to build app state");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local address");

    tokio::spawn(async move {
        axum::serve(listener, seeklit_web::app(state))
            .await
            .expect("server error");
    });

    format!("http://{addr}")
}

#[must_use]
pub fn test_config(upstream: UpstreamConfig) -> WebConfig {
    WebConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        upstream,
        session: SessionConfig {
            secret: SecretString::from(TEST_SESSION_SECRET),
            ..SessionConfig::default()
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Client that keeps cookies and reports redirects instead of following them.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("failed to create HTTP client")
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}
