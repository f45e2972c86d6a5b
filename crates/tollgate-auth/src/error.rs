//! Authentication and authorization error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tollgate_http::Response;

/// Authentication and authorization errors
///
/// Per-request failures (401/403) are always recovered locally into a
/// structured response via [`AuthError::to_response`]. Setup-time failures
/// (`ProviderNotConfigured`, `UnsupportedProvider`, `Configuration`) are
/// returned as `Err` from registration and binding calls so startup aborts.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    /// No bearer token was presented
    #[error("No token provided")]
    MissingToken,

    /// Token signature or expiry check failed
    #[error("Invalid token")]
    InvalidToken,

    /// Authenticated principal lacks a required role
    #[error("Access denied")]
    Forbidden,

    /// No basic-auth credentials were presented
    #[error("Missing Basic Authorization header")]
    MissingCredentials,

    /// Presented credentials did not match
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// API key missing or rejected
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Route or handler references a provider that was never registered
    #[error("Provider '{provider}' not configured")]
    ProviderNotConfigured { provider: String },

    /// Registration named a provider this library has no backend for
    #[error("Provider '{provider}' not supported")]
    UnsupportedProvider { provider: String },

    /// Setup-time misconfiguration (bad secret, missing handler, ...)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Provider handshake failed during the callback leg
    #[error("Login failed: {message}")]
    Handshake { message: String },
}

impl AuthError {
    /// Error code for API responses and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::MissingCredentials => "MISSING_CREDENTIALS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidApiKey => "INVALID_API_KEY",
            AuthError::ProviderNotConfigured { .. } => "PROVIDER_NOT_CONFIGURED",
            AuthError::UnsupportedProvider { .. } => "UNSUPPORTED_PROVIDER",
            AuthError::Configuration { .. } => "CONFIGURATION_ERROR",
            AuthError::Handshake { .. } => "HANDSHAKE_FAILED",
        }
    }

    /// HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingToken => 401,
            AuthError::InvalidToken => 401,
            AuthError::Forbidden => 403,
            AuthError::MissingCredentials => 401,
            AuthError::InvalidCredentials => 401,
            AuthError::InvalidApiKey => 401,
            AuthError::Handshake { .. } => 401,
            AuthError::ProviderNotConfigured { .. } => 500,
            AuthError::UnsupportedProvider { .. } => 500,
            AuthError::Configuration { .. } => 500,
        }
    }

    /// Whether this error indicates a setup-phase misconfiguration that
    /// must abort startup rather than be answered per-request
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            AuthError::ProviderNotConfigured { .. }
                | AuthError::UnsupportedProvider { .. }
                | AuthError::Configuration { .. }
        )
    }

    /// Build the structured rejection response: `{"error": <message>}`
    /// with the status matching the failure kind
    pub fn to_response(&self) -> Response {
        let status = axum::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        Response::with_status(status)
            .json_value(serde_json::json!({ "error": self.to_string() }))
    }

    /// Create a provider-not-configured error
    pub fn provider_not_configured(provider: impl Into<String>) -> Self {
        Self::ProviderNotConfigured {
            provider: provider.into(),
        }
    }

    /// Create an unsupported-provider error
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a handshake error
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::MissingToken.error_code(), "MISSING_TOKEN");
        assert_eq!(AuthError::Forbidden.error_code(), "FORBIDDEN");
        assert_eq!(
            AuthError::provider_not_configured("google").error_code(),
            "PROVIDER_NOT_CONFIGURED"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MissingToken.status_code(), 401);
        assert_eq!(AuthError::InvalidToken.status_code(), 401);
        assert_eq!(AuthError::Forbidden.status_code(), 403);
        assert_eq!(AuthError::InvalidApiKey.status_code(), 401);
        assert_eq!(AuthError::configuration("bad").status_code(), 500);
    }

    #[test]
    fn test_setup_errors_are_flagged() {
        assert!(AuthError::unsupported_provider("myspace").is_setup_error());
        assert!(AuthError::provider_not_configured("google").is_setup_error());
        assert!(AuthError::configuration("missing handler").is_setup_error());
        assert!(!AuthError::InvalidToken.is_setup_error());
        assert!(!AuthError::handshake("exchange failed").is_setup_error());
    }

    #[test]
    fn test_response_body_shape() {
        let response = AuthError::InvalidToken.to_response();
        assert_eq!(response.status_code().as_u16(), 401);
        assert_eq!(response.body_json(), Some(&json!({"error": "Invalid token"})));

        let response = AuthError::Forbidden.to_response();
        assert_eq!(response.status_code().as_u16(), 403);
        assert_eq!(response.body_json(), Some(&json!({"error": "Access denied"})));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(AuthError::MissingToken.to_string(), "No token provided");
        assert_eq!(
            AuthError::MissingCredentials.to_string(),
            "Missing Basic Authorization header"
        );
        assert_eq!(
            AuthError::unsupported_provider("myspace").to_string(),
            "Provider 'myspace' not supported"
        );
    }
}
