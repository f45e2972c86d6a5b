//! The identity attached to a request after successful authentication

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::claims::{TokenClaims, CLAIM_SUBJECT};

/// An authenticated identity, created per-request by whichever strategy
/// succeeds and carried in the request extensions until the request ends
///
/// Carries whatever the verified token payload, credential lookup, or
/// provider profile yielded: the well-known fields are lifted out, the
/// full claim set stays available through [`AuthenticatedPrincipal::claim`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    /// Opaque identifier (token subject, provider user id, ...)
    pub id: String,

    /// Username, when the strategy knows one
    pub username: Option<String>,

    /// Role, when the strategy knows one
    pub role: Option<String>,

    /// The full claim set this principal was built from
    pub claims: Map<String, Value>,
}

impl AuthenticatedPrincipal {
    /// Create a principal with just an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            role: None,
            claims: Map::new(),
        }
    }

    /// Create a principal carrying only a username, as the basic-credential
    /// strategy does
    pub fn from_username(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: username.clone(),
            username: Some(username),
            role: None,
            claims: Map::new(),
        }
    }

    /// Build a principal from a verified claim set. The principal is exactly
    /// the decoded claims: `sub` (or `id`) becomes the identifier, `username`
    /// and `role` are lifted when present, and every claim stays accessible.
    pub fn from_claims(claims: TokenClaims) -> Self {
        let id = claims
            .get_str(CLAIM_SUBJECT)
            .map(|s| s.to_string())
            .or_else(|| claims.get(CLAIM_SUBJECT).map(|v| v.to_string()))
            .or_else(|| claims.get_str("id").map(|s| s.to_string()))
            .unwrap_or_default();
        let username = claims.get_str("username").map(|s| s.to_string());
        let role = claims.get_str("role").map(|s| s.to_string());

        Self {
            id,
            username,
            role,
            claims: claims.into_map(),
        }
    }

    /// Set the username (builder style)
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the role (builder style)
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Get a claim by name
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Whether the principal carries exactly this role
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}
