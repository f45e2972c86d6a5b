//! Basic-credential authentication middleware

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use tollgate_http::{Middleware, Next, NextFuture, Request, Response};

use crate::config::BasicConfig;
use crate::credentials::CredentialStore;
use crate::error::AuthError;
use crate::principal::AuthenticatedPrincipal;

const CREDENTIALS_PREFIX: &str = "Basic ";

/// Checks the Basic Authorization header against a static credential map
/// and attaches a username-only principal on success. Both failure kinds
/// re-issue the WWW-Authenticate challenge.
pub struct BasicAuth {
    store: CredentialStore,
    realm: String,
}

impl BasicAuth {
    pub fn new(config: BasicConfig) -> Self {
        Self {
            store: CredentialStore::from_users(config.users),
            realm: config.realm,
        }
    }

    fn challenge(&self, err: AuthError) -> Response {
        err.to_response()
            .with_header("www-authenticate", format!("Basic realm=\"{}\"", self.realm))
    }

    /// Decode `Basic <base64(user:pass)>`; anything unparseable counts as
    /// no credentials presented
    fn parse_credentials(request: &Request) -> Option<(String, String)> {
        let header = request.header_str("authorization")?;
        let encoded = header.strip_prefix(CREDENTIALS_PREFIX)?;
        let decoded = BASE64.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some((username.to_string(), password.to_string()))
    }
}

impl Middleware for BasicAuth {
    fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
        let (username, password) = match Self::parse_credentials(&request) {
            Some(credentials) => credentials,
            None => {
                let response = self.challenge(AuthError::MissingCredentials);
                return Box::pin(async move { response });
            }
        };

        if !self.store.check(&username, &password) {
            tracing::debug!(path = %request.path(), username = %username, "basic credentials rejected");
            let response = self.challenge(AuthError::InvalidCredentials);
            return Box::pin(async move { response });
        }

        request.insert_extension(AuthenticatedPrincipal::from_username(username));
        Box::pin(async move { next.run(request).await })
    }

    fn name(&self) -> &'static str {
        "BasicAuth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use tollgate_http::HttpMethod;

    fn middleware() -> BasicAuth {
        BasicAuth::new(BasicConfig::with_users([("alice", "pw1")]))
    }

    fn echo_next() -> Next {
        Next::new(|request| {
            Box::pin(async move {
                match request.extension::<AuthenticatedPrincipal>() {
                    Some(principal) => Response::ok().json_value(json!({
                        "username": principal.username,
                    })),
                    None => Response::ok().text("no principal"),
                }
            })
        })
    }

    fn basic_header(username: &str, password: &str) -> String {
        format!(
            "Basic {}",
            BASE64.encode(format!("{}:{}", username, password))
        )
    }

    #[tokio::test]
    async fn test_missing_header_challenges() {
        let response = middleware()
            .handle(Request::new(HttpMethod::Get, "/private"), echo_next())
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.body_json(),
            Some(&json!({"error": "Missing Basic Authorization header"}))
        );
        assert_eq!(
            response.header_str("www-authenticate"),
            Some("Basic realm=\"Tollgate Protected\"")
        );
    }

    #[tokio::test]
    async fn test_wrong_password_challenges() {
        let request = Request::new(HttpMethod::Get, "/private")
            .with_header("authorization", basic_header("alice", "wrong"));
        let response = middleware().handle(request, echo_next()).await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.body_json(),
            Some(&json!({"error": "Invalid username or password"}))
        );
        assert!(response.header_str("www-authenticate").is_some());
    }

    #[tokio::test]
    async fn test_unknown_user_challenges() {
        let request = Request::new(HttpMethod::Get, "/private")
            .with_header("authorization", basic_header("mallory", "pw1"));
        let response = middleware().handle(request, echo_next()).await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbled_header_counts_as_missing() {
        let request = Request::new(HttpMethod::Get, "/private")
            .with_header("authorization", "Basic not!base64!!");
        let response = middleware().handle(request, echo_next()).await;

        assert_eq!(
            response.body_json(),
            Some(&json!({"error": "Missing Basic Authorization header"}))
        );
    }

    #[tokio::test]
    async fn test_valid_credentials_attach_username_principal() {
        let request = Request::new(HttpMethod::Get, "/private")
            .with_header("authorization", basic_header("alice", "pw1"));
        let response = middleware().handle(request, echo_next()).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.body_json(), Some(&json!({"username": "alice"})));
    }

    #[tokio::test]
    async fn test_custom_realm_in_challenge() {
        let config = BasicConfig::with_users([("alice", "pw1")]).realm("Internal API");
        let response = BasicAuth::new(config)
            .handle(Request::new(HttpMethod::Get, "/private"), echo_next())
            .await;

        assert_eq!(
            response.header_str("www-authenticate"),
            Some("Basic realm=\"Internal API\"")
        );
    }
}
