//! Delegated-login request steps
//!
//! The orchestrator assembles these into the login leg (one step) and the
//! callback leg (one step in session mode, an ordered pair in stateless
//! mode: handshake verification first, token minting second).

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde_json::json;

use tollgate_http::{Middleware, Next, NextFuture, Request, Response};

use crate::claims::TokenClaims;
use crate::config::{ProviderConfig, SignOptions};
use crate::error::AuthError;
use crate::oauth::exchange::IdentityExchange;
use crate::oauth::profile::ProviderProfile;
use crate::oauth::session::{SessionStore, SESSION_COOKIE};
use crate::token::TokenService;

/// Fallback secret for stateless providers registered without one
pub(crate) const DEFAULT_TOKEN_SECRET: &str = "secret";
/// Fallback lifetime for minted tokens
pub(crate) const DEFAULT_TOKEN_EXPIRY_SECONDS: u64 = 3600;

const STATE_NONCE_LEN: usize = 24;

fn state_nonce() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Login leg: redirect the client to the provider's authorization page
pub struct LoginRedirect {
    exchange: Arc<dyn IdentityExchange>,
}

impl LoginRedirect {
    pub fn new(exchange: Arc<dyn IdentityExchange>) -> Self {
        Self { exchange }
    }
}

impl Middleware for LoginRedirect {
    fn handle(&self, _request: Request, _next: Next) -> NextFuture<'static> {
        let location = self.exchange.authorization_url(&state_nonce());
        Box::pin(async move { Response::redirect(location) })
    }

    fn name(&self) -> &'static str {
        "LoginRedirect"
    }
}

/// Stateless callback, first step: exchange the code and attach the
/// verified profile. Failures answer 401 locally; the chain continues only
/// with a profile in place.
pub struct HandshakeCallback {
    config: ProviderConfig,
    exchange: Arc<dyn IdentityExchange>,
}

impl HandshakeCallback {
    pub fn new(config: ProviderConfig, exchange: Arc<dyn IdentityExchange>) -> Self {
        Self { config, exchange }
    }
}

impl Middleware for HandshakeCallback {
    fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
        let config = self.config.clone();
        let exchange = self.exchange.clone();
        Box::pin(async move {
            if let Some(error) = request.query_param("error") {
                tracing::warn!(provider = %config.provider, error = %error, "provider denied the login");
                return AuthError::handshake(format!("provider returned {}", error)).to_response();
            }
            let code = match request.query_param("code") {
                Some(code) => code.to_string(),
                None => {
                    return AuthError::handshake("missing authorization code").to_response();
                }
            };

            match exchange.exchange_code(&code).await {
                Ok(profile) => {
                    let profile = profile.normalized_for(&config);
                    request.insert_extension(profile.to_principal());
                    request.insert_extension(profile);
                    next.run(request).await
                }
                Err(err) => err.to_response(),
            }
        })
    }

    fn name(&self) -> &'static str {
        "HandshakeCallback"
    }
}

/// Stateless callback, second step: mint a bearer token over the verified
/// profile and return it in the response body. Must run after
/// [`HandshakeCallback`]; it never calls the continuation.
pub struct TokenMint {
    config: ProviderConfig,
    tokens: TokenService,
}

impl TokenMint {
    pub fn new(config: ProviderConfig, tokens: TokenService) -> Self {
        Self { config, tokens }
    }
}

impl Middleware for TokenMint {
    fn handle(&self, request: Request, _next: Next) -> NextFuture<'static> {
        let config = self.config.clone();
        let tokens = self.tokens.clone();
        Box::pin(async move {
            let profile = match request.extension::<ProviderProfile>() {
                Some(profile) => profile.clone(),
                None => {
                    tracing::warn!(
                        provider = %config.provider,
                        "token mint reached without a verified profile"
                    );
                    return AuthError::handshake("no verified profile on request").to_response();
                }
            };

            let secret = config
                .token_secret
                .clone()
                .unwrap_or_else(|| DEFAULT_TOKEN_SECRET.to_string());
            let expiry = config
                .token_expiry_seconds
                .unwrap_or(DEFAULT_TOKEN_EXPIRY_SECONDS);

            let claims = TokenClaims::new()
                .with("sub", profile.id.clone())
                .with("name", profile.display_name.clone().unwrap_or_default());

            match tokens.sign(&claims, &secret, &SignOptions::expires_in(expiry)) {
                Ok(token) => Response::ok().json_value(json!({
                    "message": "Login successful",
                    "token": token,
                    "expiresIn": expiry,
                })),
                Err(err) => err.to_response(),
            }
        })
    }

    fn name(&self) -> &'static str {
        "TokenMint"
    }
}

/// Session callback: exchange the code, establish a server session, and
/// redirect. Success goes to the configured success location with the
/// session cookie set; every failure path redirects to the failure
/// location instead of surfacing an error body.
pub struct SessionCallback {
    config: ProviderConfig,
    exchange: Arc<dyn IdentityExchange>,
    sessions: Arc<dyn SessionStore>,
}

impl SessionCallback {
    pub fn new(
        config: ProviderConfig,
        exchange: Arc<dyn IdentityExchange>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            exchange,
            sessions,
        }
    }
}

impl Middleware for SessionCallback {
    fn handle(&self, request: Request, _next: Next) -> NextFuture<'static> {
        let config = self.config.clone();
        let exchange = self.exchange.clone();
        let sessions = self.sessions.clone();
        Box::pin(async move {
            let failure = Response::redirect(&config.failure_redirect);

            if let Some(error) = request.query_param("error") {
                tracing::warn!(provider = %config.provider, error = %error, "provider denied the login");
                return failure;
            }
            let code = match request.query_param("code") {
                Some(code) => code.to_string(),
                None => return failure,
            };

            let profile = match exchange.exchange_code(&code).await {
                Ok(profile) => profile.normalized_for(&config),
                Err(err) => {
                    tracing::warn!(provider = %config.provider, error = %err, "handshake failed");
                    return failure;
                }
            };

            match sessions.create(profile.to_principal()).await {
                Ok(session_id) => Response::redirect(&config.success_redirect).with_header(
                    "set-cookie",
                    format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, session_id),
                ),
                Err(err) => {
                    tracing::warn!(provider = %config.provider, error = %err, "session creation failed");
                    failure
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "SessionCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderMode;
    use crate::oauth::exchange::GoogleExchange;
    use axum::http::StatusCode;
    use tollgate_http::HttpMethod;

    fn stateless_config() -> ProviderConfig {
        ProviderConfig::new(
            "google",
            "client-id",
            "client-secret",
            "https://app.example.com/auth/google/callback",
            ProviderMode::Stateless,
        )
        .with_token_secret("mint-secret")
        .with_token_expiry(1800)
    }

    fn noop_next() -> Next {
        Next::new(|_| Box::pin(async { Response::ok().text("next ran") }))
    }

    #[tokio::test]
    async fn test_login_redirects_to_provider_with_state() {
        let config = stateless_config();
        let exchange = Arc::new(GoogleExchange::new(&config, reqwest::Client::new()));
        let login = LoginRedirect::new(exchange);

        let response = login
            .handle(Request::new(HttpMethod::Get, "/auth/google"), noop_next())
            .await;

        assert_eq!(response.status_code(), StatusCode::FOUND);
        let location = response.header_str("location").unwrap();
        assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
        assert!(location.contains("state="));
    }

    #[tokio::test]
    async fn test_mint_responds_with_token_body() {
        let config = stateless_config();
        let mint = TokenMint::new(config.clone(), TokenService::new());

        let mut request = Request::new(HttpMethod::Get, "/auth/google/callback");
        request.insert_extension(
            ProviderProfile::new("prov-1").with_display_name("Alice Example"),
        );

        let response = mint.handle(request, noop_next()).await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.body_json().unwrap();
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["expiresIn"], 1800);

        // The minted token verifies under the provider secret and carries
        // the minimal claim set
        let token = body["token"].as_str().unwrap();
        let principal = TokenService::new().verify(token, "mint-secret").unwrap();
        assert_eq!(principal.id, "prov-1");
        assert_eq!(
            principal.claim("name").and_then(|v| v.as_str()),
            Some("Alice Example")
        );
    }

    #[tokio::test]
    async fn test_mint_without_profile_is_unauthorized() {
        let mint = TokenMint::new(stateless_config(), TokenService::new());
        let response = mint
            .handle(
                Request::new(HttpMethod::Get, "/auth/google/callback"),
                noop_next(),
            )
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_handshake_rejects_provider_error_param() {
        let config = stateless_config();
        let exchange = Arc::new(GoogleExchange::new(&config, reqwest::Client::new()));
        let handshake = HandshakeCallback::new(config, exchange);

        let request = Request::new(HttpMethod::Get, "/auth/google/callback")
            .with_query_param("error", "access_denied");
        let response = handshake.handle(request, noop_next()).await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_handshake_requires_code() {
        let config = stateless_config();
        let exchange = Arc::new(GoogleExchange::new(&config, reqwest::Client::new()));
        let handshake = HandshakeCallback::new(config, exchange);

        let response = handshake
            .handle(
                Request::new(HttpMethod::Get, "/auth/google/callback"),
                noop_next(),
            )
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_callback_redirects_to_failure_without_code() {
        let config = ProviderConfig::new(
            "github",
            "client-id",
            "client-secret",
            "https://app.example.com/auth/github/callback",
            ProviderMode::Session,
        )
        .with_failure_redirect("/login-failed");
        let exchange = Arc::new(GoogleExchange::new(&config, reqwest::Client::new()));
        let sessions = Arc::new(crate::oauth::session::MemorySessionStore::new());
        let callback = SessionCallback::new(config, exchange, sessions);

        let response = callback
            .handle(
                Request::new(HttpMethod::Get, "/auth/github/callback"),
                noop_next(),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::FOUND);
        assert_eq!(response.header_str("location"), Some("/login-failed"));
    }
}
