//! Registry of configured delegated-login providers
//!
//! Mutated once at setup, read-only during request handling. Registration
//! during live traffic is unsupported: the intended usage pattern is
//! setup-then-serve, which is why lookups need no locking.

use std::sync::Arc;

use crate::config::{ProviderConfig, ProviderMode};
use crate::error::AuthError;
use crate::oauth::exchange::{
    DiscordExchange, FacebookExchange, GitHubExchange, GoogleExchange, IdentityExchange,
};
use crate::AuthResult;

/// A provider config paired with its identity-exchange backend
#[derive(Clone)]
pub struct RegisteredProvider {
    pub config: ProviderConfig,
    pub exchange: Arc<dyn IdentityExchange>,
}

impl std::fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("provider", &self.config.provider)
            .field("mode", &self.config.mode)
            .finish()
    }
}

/// Holds every registered provider; name lookups are case-insensitive and
/// return the first registration, so re-registering a name never removes
/// the original
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<RegisteredProvider>,
    http: Option<reqwest::Client>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Fails with `UnsupportedProvider` when the name
    /// matches no backend - a fatal setup-time error, not a per-request one.
    pub fn register(&mut self, config: ProviderConfig) -> AuthResult<()> {
        let http = self.http_client()?;
        let exchange: Arc<dyn IdentityExchange> = match config.provider.to_lowercase().as_str() {
            "google" => Arc::new(GoogleExchange::new(&config, http)),
            "github" => Arc::new(GitHubExchange::new(&config, http)),
            "facebook" => Arc::new(FacebookExchange::new(&config, http)),
            "discord" => Arc::new(DiscordExchange::new(&config, http)),
            _ => return Err(AuthError::unsupported_provider(&config.provider)),
        };

        if config.mode == ProviderMode::Stateless && config.token_secret.is_none() {
            tracing::warn!(
                provider = %config.provider,
                "stateless provider registered without a token secret; minted tokens will use the built-in default"
            );
        }

        tracing::debug!(
            provider = %config.provider,
            mode = ?config.mode,
            "registered delegated-login provider"
        );
        self.providers.push(RegisteredProvider { config, exchange });
        Ok(())
    }

    /// Register several providers; stops at the first failure
    pub fn register_all<I>(&mut self, configs: I) -> AuthResult<()>
    where
        I: IntoIterator<Item = ProviderConfig>,
    {
        for config in configs {
            self.register(config)?;
        }
        Ok(())
    }

    /// Look up a provider by name, case-insensitively. Returns the first
    /// matching registration.
    pub fn get(&self, name: &str) -> Option<&RegisteredProvider> {
        self.providers
            .iter()
            .find(|p| p.config.provider.eq_ignore_ascii_case(name))
    }

    /// Number of registrations (duplicates included)
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered provider names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.providers
            .iter()
            .map(|p| p.config.provider.as_str())
            .collect()
    }

    fn http_client(&mut self) -> AuthResult<reqwest::Client> {
        match &self.http {
            Some(client) => Ok(client.clone()),
            None => {
                let client = reqwest::Client::builder().build().map_err(|e| {
                    AuthError::configuration(format!(
                        "failed to build handshake HTTP client: {}",
                        e
                    ))
                })?;
                self.http = Some(client.clone());
                Ok(client)
            }
        }
    }
}
