//! Two-phase delegated-login flow assembly
//!
//! Turns a registered provider into its request-handling steps: one login
//! step (redirect to the provider) and the callback steps. Callback
//! resolution always yields an ordered sequence - a single step in session
//! mode, a pair in stateless mode where handshake verification must run
//! before token minting.

use std::sync::Arc;

use tollgate_http::Middleware;

use crate::config::ProviderMode;
use crate::error::AuthError;
use crate::middleware::delegated::{HandshakeCallback, LoginRedirect, SessionCallback, TokenMint};
use crate::oauth::registry::{ProviderRegistry, RegisteredProvider};
use crate::oauth::session::{MemorySessionStore, SessionStore};
use crate::token::TokenService;
use crate::AuthResult;

/// Resolves login/callback steps for registered providers
pub struct DelegatedLoginOrchestrator {
    registry: ProviderRegistry,
    tokens: TokenService,
    sessions: Arc<dyn SessionStore>,
}

impl DelegatedLoginOrchestrator {
    /// Create an orchestrator over the given registry, with an in-memory
    /// session store
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            tokens: TokenService::new(),
            sessions: Arc::new(MemorySessionStore::new()),
        }
    }

    /// Replace the session store (builder style)
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// The provider registry
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// The session store session-mode callbacks write into
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        self.sessions.clone()
    }

    fn resolve(&self, provider_name: &str) -> AuthResult<&RegisteredProvider> {
        self.registry
            .get(provider_name)
            .ok_or_else(|| AuthError::provider_not_configured(provider_name))
    }

    /// The login-initiation step for a provider
    ///
    /// Fails with `ProviderNotConfigured` when the name was never
    /// registered - a setup-time error that must abort binding.
    pub fn login(&self, provider_name: &str) -> AuthResult<Arc<dyn Middleware>> {
        let registered = self.resolve(provider_name)?;
        Ok(Arc::new(LoginRedirect::new(registered.exchange.clone())))
    }

    /// The callback steps for a provider, in execution order
    ///
    /// Stateless mode returns the handshake-verification and token-minting
    /// pair; the ordering is a sequencing contract, not two independent
    /// routes. Session mode returns a single step.
    pub fn callback(&self, provider_name: &str) -> AuthResult<Vec<Arc<dyn Middleware>>> {
        let registered = self.resolve(provider_name)?;
        let config = registered.config.clone();
        let exchange = registered.exchange.clone();

        match config.mode {
            ProviderMode::Session => Ok(vec![Arc::new(SessionCallback::new(
                config,
                exchange,
                self.sessions.clone(),
            ))]),
            ProviderMode::Stateless => Ok(vec![
                Arc::new(HandshakeCallback::new(config.clone(), exchange)),
                Arc::new(TokenMint::new(config, self.tokens.clone())),
            ]),
        }
    }
}

impl std::fmt::Debug for DelegatedLoginOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatedLoginOrchestrator")
            .field("registry", &self.registry)
            .finish()
    }
}
