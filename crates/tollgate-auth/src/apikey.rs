//! API-key validation against a static set and an optional external lookup

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::AuthResult;

/// Asynchronous external key lookup (database, remote service, ...)
#[async_trait]
pub trait ApiKeyLookup: Send + Sync {
    /// Whether the key is known to the external source
    async fn check(&self, key: &str) -> AuthResult<bool>;
}

/// Validates API keys: a key is valid when it is a member of the static
/// set, OR when the configured lookup resolves it as valid
#[derive(Clone, Default)]
pub struct KeyRegistry {
    keys: HashSet<String>,
    lookup: Option<Arc<dyn ApiKeyLookup>>,
}

impl KeyRegistry {
    /// Create a registry with only a static key set
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(|k| k.into()).collect(),
            lookup: None,
        }
    }

    /// Set the asynchronous lookup
    pub fn with_lookup(mut self, lookup: Arc<dyn ApiKeyLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Check a key. The static set is consulted first and short-circuits
    /// only on success; on a static miss the lookup - when configured - is
    /// awaited and its result is final. This ordering is load-bearing for
    /// lookups with side effects and must not be swapped.
    pub async fn is_valid(&self, key: &str) -> bool {
        if self.keys.contains(key) {
            return true;
        }

        match &self.lookup {
            Some(lookup) => match lookup.check(key).await {
                Ok(valid) => valid,
                Err(err) => {
                    tracing::warn!(error = %err, "API key lookup failed; treating key as invalid");
                    false
                }
            },
            None => false,
        }
    }
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("keys", &self.keys.len())
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}
