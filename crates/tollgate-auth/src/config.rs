//! Strategy configuration types

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::apikey::ApiKeyLookup;

// Default values for strategy configuration
const DEFAULT_ALGORITHM: &str = "HS256";
const DEFAULT_EXPIRY_SECONDS: u64 = 3600;
const DEFAULT_KEY_HEADER: &str = "x-api-key";
const DEFAULT_REALM: &str = "Tollgate Protected";
const DEFAULT_REDIRECT: &str = "/";

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}
fn default_expiry_seconds() -> u64 {
    DEFAULT_EXPIRY_SECONDS
}
fn default_key_header() -> String {
    DEFAULT_KEY_HEADER.to_string()
}
fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}
fn default_redirect() -> String {
    DEFAULT_REDIRECT.to_string()
}

/// Bearer-token strategy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerConfig {
    /// Token signing/verification secret
    pub secret: String,

    /// Signing algorithm name (HS256, HS384, HS512)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Roles allowed through the gate; empty means open access for any
    /// authenticated principal
    #[serde(default)]
    pub roles: Vec<String>,
}

impl BearerConfig {
    /// Create a config for the given secret with default algorithm and
    /// no role restriction
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: default_algorithm(),
            roles: Vec::new(),
        }
    }

    /// Restrict the route to the given roles
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(|r| r.into()).collect();
        self
    }
}

/// Options applied when signing or refreshing a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignOptions {
    /// Token lifetime in seconds
    #[serde(default = "default_expiry_seconds")]
    pub expiry_seconds: u64,

    /// Issuer registered claim
    pub issuer: Option<String>,

    /// Audience registered claim
    pub audience: Option<String>,

    /// Subject registered claim
    pub subject: Option<String>,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            expiry_seconds: default_expiry_seconds(),
            issuer: None,
            audience: None,
            subject: None,
        }
    }
}

impl SignOptions {
    /// Options with the given lifetime and no registered claims
    pub fn expires_in(expiry_seconds: u64) -> Self {
        Self {
            expiry_seconds,
            ..Default::default()
        }
    }
}

/// Basic-credential strategy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicConfig {
    /// Username to password mapping. Comparison is plaintext equality;
    /// hashing is a caller-side concern.
    #[serde(default)]
    pub users: HashMap<String, String>,

    /// Realm announced in the WWW-Authenticate challenge
    #[serde(default = "default_realm")]
    pub realm: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            realm: default_realm(),
        }
    }
}

impl BasicConfig {
    /// Create a config from username/password pairs
    pub fn with_users<I, K, V>(users: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Default::default()
        }
    }

    /// Set the challenge realm
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }
}

/// API-key strategy configuration
#[derive(Clone, Default)]
pub struct ApiKeyConfig {
    /// Header the key is read from (lookup is case-insensitive)
    pub header: Option<String>,

    /// Static key set
    pub keys: Vec<String>,

    /// Optional asynchronous external lookup, consulted only when the
    /// static check fails
    pub lookup: Option<Arc<dyn ApiKeyLookup>>,
}

impl ApiKeyConfig {
    /// Create a config with the given static keys and the default header
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(|k| k.into()).collect(),
            ..Default::default()
        }
    }

    /// Set the header name the key is read from
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the asynchronous lookup
    pub fn lookup(mut self, lookup: Arc<dyn ApiKeyLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Header name in effect
    pub fn header_name(&self) -> &str {
        self.header.as_deref().unwrap_or(DEFAULT_KEY_HEADER)
    }
}

impl std::fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("header", &self.header_name())
            .field("keys", &self.keys.len())
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}

/// Delegated-login provider mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Callback establishes a server session and redirects
    Session,
    /// Callback mints a bearer token and returns it in the body
    Stateless,
}

/// One delegated-login provider's registration record
///
/// Created once during setup via [`crate::oauth::ProviderRegistry::register`]
/// and immutable thereafter. Provider names are unique within a registry,
/// compared case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (google, github, facebook, discord)
    pub provider: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Callback URL registered with the provider
    pub callback_url: String,

    /// Session or stateless mode
    pub mode: ProviderMode,

    /// Secret used to mint bearer tokens in stateless mode
    pub token_secret: Option<String>,

    /// Lifetime of minted tokens in seconds (stateless mode)
    pub token_expiry_seconds: Option<u64>,

    /// Where the session-mode callback redirects on success
    #[serde(default = "default_redirect")]
    pub success_redirect: String,

    /// Where the session-mode callback redirects on failure
    #[serde(default = "default_redirect")]
    pub failure_redirect: String,

    /// Scope override; each provider has a sensible default
    pub scopes: Option<Vec<String>>,
}

impl ProviderConfig {
    /// Create a provider record with default redirects and scopes
    pub fn new(
        provider: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
        mode: ProviderMode,
    ) -> Self {
        Self {
            provider: provider.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
            mode,
            token_secret: None,
            token_expiry_seconds: None,
            success_redirect: default_redirect(),
            failure_redirect: default_redirect(),
            scopes: None,
        }
    }

    /// Set the token-minting secret (stateless mode)
    pub fn with_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token_secret = Some(secret.into());
        self
    }

    /// Set the minted-token lifetime (stateless mode)
    pub fn with_token_expiry(mut self, seconds: u64) -> Self {
        self.token_expiry_seconds = Some(seconds);
        self
    }

    /// Set the session-mode success redirect
    pub fn with_success_redirect(mut self, location: impl Into<String>) -> Self {
        self.success_redirect = location.into();
        self
    }

    /// Set the session-mode failure redirect
    pub fn with_failure_redirect(mut self, location: impl Into<String>) -> Self {
        self.failure_redirect = location.into();
        self
    }

    /// Override the provider's default scopes
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(|s| s.into()).collect());
        self
    }
}
