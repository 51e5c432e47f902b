//! Logout coordination.
//!
//! Revokes the upstream session for whichever mechanism created it. Remote
//! failures are logged and swallowed: the caller always clears the local
//! session cookie afterwards.

use seeklit_core::{AuthSource, WireUser};

use crate::api::{MediaServerClient, SeeklitClient};
use crate::middleware::RequestContext;

/// One upstream revocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revocation {
    pub target: AuthSource,
    pub succeeded: bool,
}

/// Ends upstream sessions on logout.
#[derive(Debug, Clone)]
pub struct LogoutCoordinator {
    seeklit: SeeklitClient,
    media_server: MediaServerClient,
}

impl LogoutCoordinator {
    #[must_use]
    pub const fn new(seeklit: SeeklitClient, media_server: MediaServerClient) -> Self {
        Self {
            seeklit,
            media_server,
        }
    }

    /// Revoke the upstream session. Never fails.
    ///
    /// With an unknown auth source the OIDC session is revoked first and the
    /// media server is only tried if that fails.
    pub async fn logout(&self, ctx: &RequestContext) -> Vec<Revocation> {
        let (auth_source, user_token) = self.lookup(ctx).await;
        let token = user_token.or_else(|| ctx.session_token().map(String::from));
        tracing::info!(
            auth_source = auth_source.map_or("unknown", AuthSource::as_str),
            "Logging out"
        );

        let mut attempts = Vec::with_capacity(2);
        match auth_source {
            Some(AuthSource::Oidc) => attempts.push(self.revoke_oidc(ctx, token.as_deref()).await),
            Some(AuthSource::Direct) => {
                attempts.push(self.revoke_direct(ctx, token.as_deref()).await);
            }
            None => {
                let oidc = self.revoke_oidc(ctx, token.as_deref()).await;
                attempts.push(oidc);
                if !oidc.succeeded {
                    attempts.push(self.revoke_direct(ctx, token.as_deref()).await);
                }
            }
        }
        attempts
    }

    /// Auth source and bearer token of the current server session, if any.
    async fn lookup(&self, ctx: &RequestContext) -> (Option<AuthSource>, Option<String>) {
        match self
            .seeklit
            .tokens(ctx.origin(), ctx.cookie_header(), ctx.session_token())
            .await
        {
            Ok(response) => {
                let token = response
                    .user
                    .as_ref()
                    .and_then(WireUser::normalized_token)
                    .map(String::from);
                (response.auth_source(), token)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Could not determine auth source for logout");
                (None, None)
            }
        }
    }

    async fn revoke_oidc(&self, ctx: &RequestContext, token: Option<&str>) -> Revocation {
        let result = self
            .seeklit
            .logout(ctx.origin(), ctx.cookie_header(), token)
            .await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Seeklit server logout failed");
        }
        Revocation {
            target: AuthSource::Oidc,
            succeeded: result.is_ok(),
        }
    }

    async fn revoke_direct(&self, ctx: &RequestContext, token: Option<&str>) -> Revocation {
        let succeeded = match token {
            Some(token) => match self.media_server.logout(ctx.origin(), token).await {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = %err, "Audiobookshelf logout failed");
                    false
                }
            },
            None => {
                tracing::warn!("No token available for Audiobookshelf logout");
                false
            }
        };
        Revocation {
            target: AuthSource::Direct,
            succeeded,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::UpstreamConfig;

    fn coordinator(server: &str, media: &str) -> LogoutCoordinator {
        let seeklit = SeeklitClient::new(&UpstreamConfig {
            server_url: Some(server.to_string()),
            ..UpstreamConfig::default()
        })
        .unwrap();
        LogoutCoordinator::new(seeklit, MediaServerClient::new(Some(media.to_string())).unwrap())
    }

    fn ctx() -> RequestContext {
        RequestContext::new("http://localhost:3000", None, Some("sess".to_string()))
    }

    #[tokio::test]
    async fn test_direct_session_revokes_media_server_only() {
        let server = MockServer::start().await;
        let media = MockServer::start().await;
        Mock::given(path("/api/v1/auth/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": {"username": "bob", "accessToken": "abs-tok", "auth_source": "audiobookshelf"}
            })))
            .mount(&server)
            .await;
        Mock::given(path("/api/v1/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/logout"))
            .and(header("authorization", "Bearer abs-tok"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&media)
            .await;

        let attempts = coordinator(&server.uri(), &media.uri()).logout(&ctx()).await;
        assert_eq!(
            attempts,
            vec![Revocation {
                target: AuthSource::Direct,
                succeeded: true
            }]
        );
    }

    #[tokio::test]
    async fn test_unknown_source_tries_oidc_then_direct() {
        let server = MockServer::start().await;
        let media = MockServer::start().await;
        Mock::given(path("/api/v1/auth/tokens"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/api/v1/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&media)
            .await;

        let attempts = coordinator(&server.uri(), &media.uri()).logout(&ctx()).await;
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].target, AuthSource::Oidc);
        assert!(!attempts[0].succeeded);
        assert_eq!(attempts[1].target, AuthSource::Direct);
        assert!(attempts[1].succeeded);
    }

    #[tokio::test]
    async fn test_unknown_source_stops_after_oidc_success() {
        let server = MockServer::start().await;
        let media = MockServer::start().await;
        Mock::given(path("/api/v1/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(path("/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&media)
            .await;

        let attempts = coordinator(&server.uri(), &media.uri()).logout(&ctx()).await;
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].succeeded);
    }

    #[tokio::test]
    async fn test_unreachable_upstreams_are_swallowed() {
        let attempts = coordinator("http://127.0.0.1:1", "http://127.0.0.1:1")
            .logout(&ctx())
            .await;
        assert!(attempts.iter().all(|a| !a.succeeded));
    }
}
