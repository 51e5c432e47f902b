//! Logout: upstream revocation and local session teardown.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use seeklit_core::AuthSource;
use seeklit_integration_tests::{TestApp, location};

#[tokio::test]
async fn test_oidc_session_is_revoked_once() {
    let app = TestApp::spawn().await;
    app.sign_in_as_alice().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .and(header("authorization", "Bearer alice-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.seeklit)
        .await;
    Mock::given(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.media_server)
        .await;

    let response = app
        .client
        .post(app.url("/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response).as_deref(), Some("/auth"));
}

#[tokio::test]
async fn test_direct_session_is_revoked_on_media_server() {
    let app = TestApp::spawn().await;
    app.mock_session("abs-token", "root", "root", AuthSource::Direct)
        .await;
    app.sign_in_with_token("abs-token").await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(header("authorization", "Bearer abs-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.media_server)
        .await;
    Mock::given(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.seeklit)
        .await;

    let response = app.get("/logout").await;
    assert_eq!(response.status(), 303);
}

#[tokio::test]
async fn test_cookie_cleared_even_when_revocation_fails() {
    let app = TestApp::spawn().await;
    app.sign_in_as_alice().await;
    assert_eq!(app.get("/api/me").await.status(), 200);

    Mock::given(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&app.seeklit)
        .await;

    let response = app.get("/logout").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response).as_deref(), Some("/auth"));
    let cleared = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with("seeklit_session=") && value.contains("Max-Age=0"));
    assert!(cleared, "session cookie was not cleared");

    assert_eq!(app.get("/api/me").await.status(), 401);
}

#[tokio::test]
async fn test_unknown_source_falls_back_to_media_server() {
    let app = TestApp::spawn().await;
    app.sign_in_with_token("mystery").await;
    Mock::given(path("/api/v1/auth/tokens"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.seeklit)
        .await;
    Mock::given(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.seeklit)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(header("authorization", "Bearer mystery"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.media_server)
        .await;

    let response = app.get("/logout").await;
    assert_eq!(response.status(), 303);
}
