//! Sign-in, session resolution and OIDC callback flows.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use seeklit_core::AuthSource;
use seeklit_integration_tests::{TestApp, client, location, serve};
use seeklit_web::config::UpstreamConfig;

#[tokio::test]
async fn test_anonymous_page_redirects_without_upstream_calls() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.seeklit)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.media_server)
        .await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response).as_deref(), Some("/auth"));
}

#[tokio::test]
async fn test_session_token_resolves_user() {
    let app = TestApp::spawn().await;
    app.sign_in_as_alice().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("alice"));
    assert!(!body.contains("alice-token"), "session token leaked into page");

    let me: Value = app.get("/api/me").await.json().await.unwrap();
    assert_eq!(me["username"], "alice");
    assert_eq!(me["auth_source"], "oidc");
}

#[tokio::test]
async fn test_signed_in_user_skips_login_page() {
    let app = TestApp::spawn().await;
    app.sign_in_as_alice().await;

    let response = app.get("/auth").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response).as_deref(), Some("/"));
}

#[tokio::test]
async fn test_unreachable_server_shows_configuration_error() {
    let address = serve(UpstreamConfig {
        server_url: Some("http://127.0.0.1:1".to_string()),
        public_server_url: None,
        media_server_url: Some("http://127.0.0.1:1".to_string()),
    })
    .await;
    let client = client();

    let created = client
        .post(format!("{address}/auth/session"))
        .json(&json!({ "token": "tok" }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 200);

    let page = client.get(format!("{address}/auth")).send().await.unwrap();
    assert_eq!(page.status(), 503);
    let body = page.text().await.unwrap();
    assert!(body.contains("Server configuration error"));
    assert!(body.contains("http://127.0.0.1:1"));
    assert!(body.contains("SEEKLIT_SERVER_URL"));
    assert!(!body.contains("name=\"password\""));

    let api = client.get(format!("{address}/api/me")).send().await.unwrap();
    assert_eq!(api.status(), 503);
}

#[tokio::test]
async fn test_api_without_session_is_json_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/me").await;
    assert_eq!(response.status(), 401);
    assert!(location(&response).is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_callback_token_with_unreachable_server_fails() {
    let address = serve(UpstreamConfig {
        server_url: Some("http://127.0.0.1:1".to_string()),
        public_server_url: None,
        media_server_url: None,
    })
    .await;

    let response = client()
        .get(format!("{address}/auth/callback?success=true&token=tok"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    let target = location(&response).unwrap();
    assert!(target.starts_with("/auth?error=Unable%20to%20connect"));
    assert!(target.contains("SEEKLIT_SERVER_URL"));
}

#[tokio::test]
async fn test_login_page_lists_enabled_methods() {
    let app = TestApp::spawn().await;
    Mock::given(path("/api/v1/auth/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "method": "both",
            "available_methods": {"audiobookshelf": true, "oidc": true},
            "oidc": {"provider_name": "Authentik"}
        })))
        .mount(&app.seeklit)
        .await;

    let response = app.get("/auth?error=access_denied").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Sign in with Authentik"));
    assert!(body.contains("name=\"password\""));
    assert!(body.contains("role=\"alert\""));
}

#[tokio::test]
async fn test_create_session_requires_token() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/auth/session", &json!({})).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Token is required");

    let blank = app.post_json("/auth/session", &json!({ "token": "  " })).await;
    assert_eq!(blank.status(), 400);
}

#[tokio::test]
async fn test_direct_sign_in_then_resolve() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("\"username\":\"root\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "root", "username": "root", "type": "root", "token": "abs-token"}
        })))
        .expect(1)
        .mount(&app.media_server)
        .await;
    Mock::given(path("/api/v1/auth/tokens"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid or expired session"})),
        )
        .mount(&app.seeklit)
        .await;
    Mock::given(path("/api/v1/auth/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "method": "both",
            "available_methods": {"audiobookshelf": true, "oidc": true}
        })))
        .mount(&app.seeklit)
        .await;
    Mock::given(path("/api/me"))
        .and(header("authorization", "Bearer abs-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "root", "username": "root", "type": "root", "token": "abs-token"
        })))
        .mount(&app.media_server)
        .await;

    let response = app
        .client
        .post(app.url("/auth"))
        .form(&[("username", "root"), ("password", "hunter2")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response).as_deref(), Some("/"));

    let me: Value = app.get("/api/me").await.json().await.unwrap();
    assert_eq!(me["username"], "root");
    assert_eq!(me["auth_source"], "direct");
}

#[tokio::test]
async fn test_failed_direct_sign_in() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&app.media_server)
        .await;

    let response = app
        .client
        .post(app.url("/auth"))
        .form(&[("username", "root"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert!(response.headers().get("set-cookie").is_none());
    let body = response.text().await.unwrap();
    assert!(body.contains("Login failed. Please check your credentials."));
}

#[tokio::test]
async fn test_blank_direct_sign_in_makes_no_login_call() {
    let app = TestApp::spawn().await;
    Mock::given(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.media_server)
        .await;

    let response = app
        .client
        .post(app.url("/auth"))
        .form(&[("username", ""), ("password", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_oidc_login_redirects_to_server() {
    let app = TestApp::spawn().await;

    let response = app.get("/auth/oidc/login").await;
    assert_eq!(response.status(), 303);
    assert_eq!(
        location(&response),
        Some(format!("{}/api/v1/auth/login", app.seeklit.uri()))
    );
}

#[tokio::test]
async fn test_callback_error_redirects_without_upstream_calls() {
    let app = TestApp::spawn().await;
    Mock::given(path("/api/v1/auth/tokens"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.seeklit)
        .await;

    let response = app.get("/auth/callback?error=access_denied").await;
    assert_eq!(response.status(), 303);
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth?error=access_denied")
    );
}

#[tokio::test]
async fn test_callback_without_success_fails() {
    let app = TestApp::spawn().await;

    let response = app.get("/auth/callback").await;
    assert_eq!(response.status(), 303);
    let target = location(&response).unwrap();
    assert!(target.starts_with("/auth?error=Invalid%20callback"));
}

#[tokio::test]
async fn test_callback_uses_server_session() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/tokens"))
        .and(header("cookie", "seeklit_oidc=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 7, "username": "alice", "token": "user-token", "auth_source": "oidc"},
            "cookie": "server-session"
        })))
        .expect(1)
        .mount(&app.seeklit)
        .await;

    let response = app
        .client
        .get(app.url("/auth/callback?success=true"))
        .header("cookie", "seeklit_oidc=abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response).as_deref(), Some("/"));
    assert!(response.headers().get("set-cookie").is_some());
}

#[tokio::test]
async fn test_callback_with_token_validates_it() {
    let app = TestApp::spawn().await;
    app.mock_session("url-token", "alice", "user", AuthSource::Oidc)
        .await;

    let response = app.get("/auth/callback?success=true&token=url-token").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response).as_deref(), Some("/"));

    let me: Value = app.get("/api/me").await.json().await.unwrap();
    assert_eq!(me["username"], "alice");
}

#[tokio::test]
async fn test_callback_falls_back_to_browser() {
    let app = TestApp::spawn().await;
    Mock::given(path("/api/v1/auth/tokens"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.seeklit)
        .await;

    let response = app.get("/auth/callback?success=true").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    let tokens_url = format!("{}/api/v1/auth/tokens", app.seeklit.uri());
    assert!(body.contains(&format!("data-tokens-url=\"{tokens_url}\"")));
    assert_eq!(body.matches("fetch(root.dataset.tokensUrl").count(), 1);
    assert!(body.contains("credentials: \"include\""));
}
