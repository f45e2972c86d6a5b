//! Provider profiles returned by a successful identity exchange

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ProviderConfig, ProviderMode};
use crate::principal::AuthenticatedPrincipal;

/// The identity a delegated-login provider vouched for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Provider-side user id
    pub id: String,

    /// Human-readable display name
    pub display_name: Option<String>,

    /// Provider-side login/handle, when the provider has one
    pub username: Option<String>,

    /// Email address, when the provider shares one
    pub email: Option<String>,

    /// Originating provider name; set by session-mode normalization
    pub provider: Option<String>,

    /// The raw profile document as returned by the provider
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl ProviderProfile {
    /// Create a profile with just the provider-side id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            username: None,
            email: None,
            provider: None,
            raw: Map::new(),
        }
    }

    /// Set the display name (builder style)
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the login/handle (builder style)
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the email (builder style)
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach the raw provider document (builder style)
    pub fn with_raw(mut self, raw: Map<String, Value>) -> Self {
        self.raw = raw;
        self
    }

    /// The shared normalization step applied after every successful
    /// handshake: stateless mode passes the profile through unmodified,
    /// session mode tags it with the originating provider name.
    pub fn normalized_for(mut self, config: &ProviderConfig) -> Self {
        if config.mode == ProviderMode::Session {
            self.provider = Some(config.provider.clone());
        }
        self
    }

    /// Build the request principal for this profile
    pub fn to_principal(&self) -> AuthenticatedPrincipal {
        let mut claims = self.raw.clone();
        claims.insert("sub".to_string(), Value::from(self.id.clone()));
        if let Some(name) = &self.display_name {
            claims.insert("name".to_string(), Value::from(name.clone()));
        }
        if let Some(email) = &self.email {
            claims.insert("email".to_string(), Value::from(email.clone()));
        }
        if let Some(provider) = &self.provider {
            claims.insert("provider".to_string(), Value::from(provider.clone()));
        }

        AuthenticatedPrincipal {
            id: self.id.clone(),
            username: self.username.clone(),
            role: None,
            claims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: ProviderMode) -> ProviderConfig {
        ProviderConfig::new(
            "github",
            "client-id",
            "client-secret",
            "https://app.example.com/auth/github/callback",
            mode,
        )
    }

    #[test]
    fn test_stateless_normalization_is_identity() {
        let profile = ProviderProfile::new("42").with_display_name("Alice");
        let normalized = profile.clone().normalized_for(&config(ProviderMode::Stateless));
        assert_eq!(normalized, profile);
    }

    #[test]
    fn test_session_normalization_tags_provider() {
        let profile = ProviderProfile::new("42").normalized_for(&config(ProviderMode::Session));
        assert_eq!(profile.provider.as_deref(), Some("github"));
    }

    #[test]
    fn test_to_principal_carries_profile() {
        let principal = ProviderProfile::new("42")
            .with_display_name("Alice")
            .with_username("alice")
            .with_email("alice@example.com")
            .normalized_for(&config(ProviderMode::Session))
            .to_principal();

        assert_eq!(principal.id, "42");
        assert_eq!(principal.username.as_deref(), Some("alice"));
        assert_eq!(
            principal.claim("provider").and_then(|v| v.as_str()),
            Some("github")
        );
        assert_eq!(
            principal.claim("name").and_then(|v| v.as_str()),
            Some("Alice")
        );
    }
}
