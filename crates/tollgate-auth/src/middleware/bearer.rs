//! Bearer-token authentication middleware

use tollgate_http::{Middleware, Next, NextFuture, Request};

use crate::config::BearerConfig;
use crate::error::AuthError;
use crate::token::TokenService;
use crate::AuthResult;

const TOKEN_PREFIX: &str = "Bearer ";

/// Verifies the bearer token from the Authorization header, optionally
/// gates on roles, and attaches the principal on success
pub struct BearerAuth {
    service: TokenService,
    config: BearerConfig,
}

impl BearerAuth {
    /// Build the middleware; fails at setup time when the configured
    /// algorithm name is unknown
    pub fn new(config: BearerConfig) -> AuthResult<Self> {
        let service = TokenService::from_algorithm(&config.algorithm)?;
        Ok(Self { service, config })
    }

    fn extract_token<'a>(request: &'a Request) -> Option<&'a str> {
        let header = request.header_str("authorization")?;
        let token = header.strip_prefix(TOKEN_PREFIX)?.trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

impl Middleware for BearerAuth {
    fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
        let outcome = Self::extract_token(&request)
            .ok_or(AuthError::MissingToken)
            .and_then(|token| self.service.verify(token, &self.config.secret));

        let principal = match outcome {
            Ok(principal) => principal,
            Err(err) => {
                tracing::debug!(path = %request.path(), error = %err, "bearer authentication failed");
                return Box::pin(async move { err.to_response() });
            }
        };

        if !self.service.authorize(&principal, &self.config.roles) {
            tracing::debug!(
                path = %request.path(),
                role = ?principal.role,
                "principal lacks a required role"
            );
            return Box::pin(async move { AuthError::Forbidden.to_response() });
        }

        request.insert_extension(principal);
        Box::pin(async move { next.run(request).await })
    }

    fn name(&self) -> &'static str {
        "BearerAuth"
    }
}
