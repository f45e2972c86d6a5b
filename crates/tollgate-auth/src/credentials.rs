//! Static credential validation for the basic-credential strategy

use std::collections::HashMap;

/// Validates username/password pairs against a caller-supplied static map
///
/// Comparison is plaintext equality. No hashing is performed here; callers
/// that store hashed passwords must verify on their side before handing
/// the map over.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Create a store from username/password pairs
    pub fn from_users<I, K, V>(users: I) -> Self
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
        }
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store has no users
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Check a username/password pair
    pub fn check(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|stored| stored == password)
            .unwrap_or(false)
    }
}
