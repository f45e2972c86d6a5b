//! # tollgate-auth: pluggable authentication for HTTP pipelines
//!
//! Four interchangeable authentication strategies - bearer tokens, basic
//! credentials, API keys, and delegated third-party login - unified behind
//! one declarative route-binding engine. Strategies are ordinary
//! `tollgate_http::Middleware` implementations; [`RouteBinder`] resolves a
//! route table into the right handler chain per route, including the
//! two-phase delegated-login flow and role-based gating.

pub mod apikey;
pub mod binder;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod oauth;
pub mod principal;
pub mod token;

// Error handling
pub use error::AuthError;

// Data model
pub use claims::TokenClaims;
pub use principal::AuthenticatedPrincipal;

// Configuration
pub use config::{
    ApiKeyConfig, BasicConfig, BearerConfig, ProviderConfig, ProviderMode, SignOptions,
};

// Strategy services
pub use apikey::{ApiKeyLookup, KeyRegistry};
pub use credentials::CredentialStore;
pub use token::TokenService;

// Delegated login
pub use oauth::{DelegatedLoginOrchestrator, ProviderRegistry, SessionStore};

// Route binding
pub use binder::{DelegatedLeg, RouteBinder, RouteDescriptor, RouteStrategy};

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
