//! Server-session seam for session-mode delegated login
//!
//! Persistent session storage is the embedder's responsibility; this module
//! defines the hook surface the callback leg writes through, plus an
//! in-memory store for tests and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use tokio::sync::RwLock;

use crate::principal::AuthenticatedPrincipal;
use crate::AuthResult;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "tollgate_session";

const SESSION_ID_LEN: usize = 32;

/// Session persistence hooks (the serialize/deserialize seam)
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist the principal, returning the new session id
    async fn create(&self, principal: AuthenticatedPrincipal) -> AuthResult<String>;

    /// Load the principal for a session id, if the session exists
    async fn load(&self, session_id: &str) -> AuthResult<Option<AuthenticatedPrincipal>>;

    /// Drop a session
    async fn destroy(&self, session_id: &str) -> AuthResult<()>;
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, AuthenticatedPrincipal>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_id() -> String {
        thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, principal: AuthenticatedPrincipal) -> AuthResult<String> {
        let session_id = Self::generate_id();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), principal);
        Ok(session_id)
    }

    async fn load(&self, session_id: &str) -> AuthResult<Option<AuthenticatedPrincipal>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn destroy(&self, session_id: &str) -> AuthResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
