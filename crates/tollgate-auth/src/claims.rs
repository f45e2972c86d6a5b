//! Token claim sets
//!
//! Claims are an open-ended name-to-JSON mapping. [`crate::TokenService::sign`]
//! stamps the temporal claims; [`TokenClaims::strip_temporal`] removes them
//! again so a refreshed token never carries stale timing forward.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Issued-at timestamp claim
pub const CLAIM_ISSUED_AT: &str = "iat";
/// Expiry timestamp claim
pub const CLAIM_EXPIRY: &str = "exp";
/// Subject claim
pub const CLAIM_SUBJECT: &str = "sub";
/// Issuer claim
pub const CLAIM_ISSUER: &str = "iss";
/// Audience claim
pub const CLAIM_AUDIENCE: &str = "aud";

/// An open-ended claim set carried inside a bearer token
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenClaims(Map<String, Value>);

impl TokenClaims {
    /// Create an empty claim set
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a claim (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set a claim
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Get a claim by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Get a claim as a string slice, if it is one
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_str())
    }

    /// Get a claim as an integer, if it is one
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(|v| v.as_i64())
    }

    /// Remove a claim, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Remove the issued-at and expiry claims.
    /// Refresh must call this before re-signing.
    pub fn strip_temporal(&mut self) {
        self.0.remove(CLAIM_ISSUED_AT);
        self.0.remove(CLAIM_EXPIRY);
    }

    /// Whether a claim is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of claims
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the claim set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over claims
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying map
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for TokenClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for TokenClaims {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_lookup() {
        let claims = TokenClaims::new()
            .with(CLAIM_SUBJECT, "user-1")
            .with("role", "admin")
            .with("level", 5);

        assert_eq!(claims.get_str(CLAIM_SUBJECT), Some("user-1"));
        assert_eq!(claims.get_str("role"), Some("admin"));
        assert_eq!(claims.get_i64("level"), Some(5));
        assert_eq!(claims.get("missing"), None);
    }

    #[test]
    fn test_strip_temporal_removes_only_timing() {
        let mut claims = TokenClaims::new()
            .with(CLAIM_SUBJECT, "user-1")
            .with(CLAIM_ISSUED_AT, 1_700_000_000)
            .with(CLAIM_EXPIRY, 1_700_003_600);

        claims.strip_temporal();

        assert!(!claims.contains(CLAIM_ISSUED_AT));
        assert!(!claims.contains(CLAIM_EXPIRY));
        assert_eq!(claims.get_str(CLAIM_SUBJECT), Some("user-1"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let claims = TokenClaims::new().with("sub", "u1").with("role", "editor");
        let serialized = serde_json::to_value(&claims).unwrap();
        assert_eq!(serialized, json!({"sub": "u1", "role": "editor"}));

        let parsed: TokenClaims = serde_json::from_value(serialized).unwrap();
        assert_eq!(parsed, claims);
    }
}
