//! Bearer-token signing, verification and refresh

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use crate::claims::{TokenClaims, CLAIM_AUDIENCE, CLAIM_EXPIRY, CLAIM_ISSUED_AT, CLAIM_ISSUER, CLAIM_SUBJECT};
use crate::config::SignOptions;
use crate::error::AuthError;
use crate::principal::AuthenticatedPrincipal;
use crate::AuthResult;

/// Signs, verifies and refreshes bearer tokens
///
/// Secrets are passed per call; the service itself only fixes the signing
/// algorithm, so one instance can serve every route and provider.
#[derive(Debug, Clone)]
pub struct TokenService {
    algorithm: Algorithm,
}

impl Default for TokenService {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenService {
    /// Create a service using HS256
    pub fn new() -> Self {
        Self {
            algorithm: Algorithm::HS256,
        }
    }

    /// Create a service for a named HMAC algorithm (HS256, HS384, HS512)
    pub fn from_algorithm(name: &str) -> AuthResult<Self> {
        let algorithm = match name {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(AuthError::configuration(format!(
                    "unsupported token algorithm: {}",
                    other
                )))
            }
        };
        Ok(Self { algorithm })
    }

    /// Sign a claim set, stamping issued-at and expiry
    ///
    /// Deterministic for identical inputs modulo the timestamps.
    pub fn sign(
        &self,
        claims: &TokenClaims,
        secret: &str,
        options: &SignOptions,
    ) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let mut payload = claims.as_map().clone();
        payload.insert(CLAIM_ISSUED_AT.to_string(), Value::from(now));
        payload.insert(
            CLAIM_EXPIRY.to_string(),
            Value::from(now + options.expiry_seconds as i64),
        );
        if let Some(issuer) = &options.issuer {
            payload.insert(CLAIM_ISSUER.to_string(), Value::from(issuer.clone()));
        }
        if let Some(audience) = &options.audience {
            payload.insert(CLAIM_AUDIENCE.to_string(), Value::from(audience.clone()));
        }
        if let Some(subject) = &options.subject {
            payload.insert(CLAIM_SUBJECT.to_string(), Value::from(subject.clone()));
        }

        let header = Header::new(self.algorithm);
        encode(&header, &payload, &EncodingKey::from_secret(secret.as_bytes())).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            AuthError::configuration(format!("failed to sign token: {}", e))
        })
    }

    /// Verify a token and return its claim set
    pub fn verify_claims(&self, token: &str, secret: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;

        let data = decode::<Map<String, Value>>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "token verification failed");
            AuthError::InvalidToken
        })?;

        Ok(TokenClaims::from(data.claims))
    }

    /// Verify a token and build the authenticated principal from exactly
    /// the decoded claim set
    pub fn verify(&self, token: &str, secret: &str) -> AuthResult<AuthenticatedPrincipal> {
        let claims = self.verify_claims(token, secret)?;
        Ok(AuthenticatedPrincipal::from_claims(claims))
    }

    /// Verify an existing token, strip its temporal claims, and re-sign the
    /// remainder with fresh timing
    ///
    /// Rolls a token forward without re-authenticating. This does NOT
    /// re-validate that the underlying principal is still authorized:
    /// callers needing revocation must layer their own check.
    pub fn refresh(
        &self,
        existing_token: &str,
        secret: &str,
        options: &SignOptions,
    ) -> AuthResult<String> {
        let mut claims = self.verify_claims(existing_token, secret)?;
        claims.strip_temporal();
        self.sign(&claims, secret, options)
    }

    /// Role check: open access when `allowed_roles` is empty, otherwise the
    /// principal's role must be a member
    pub fn authorize(&self, principal: &AuthenticatedPrincipal, allowed_roles: &[String]) -> bool {
        allowed_roles.is_empty()
            || allowed_roles
                .iter()
                .any(|role| principal.role.as_deref() == Some(role.as_str()))
    }
}
