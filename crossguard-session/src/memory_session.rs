//! In-memory session storage implementation.

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::traits::{Session, SessionStore, generate_session_id};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-memory session store.
///
/// Suitable for development and tests. Sessions do not survive a restart and
/// are not shared across instances; multi-instance deployments should plug an
/// externally persisted backend into [`SessionStore`] instead.
///
/// # Examples
///
/// ```
/// use crossguard_session::{MemorySessionStore, SessionConfig, SessionStore};
/// use std::time::Duration;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let config = SessionConfig::default().with_default_ttl(Duration::from_secs(3600));
/// let store = MemorySessionStore::new(config);
///
/// let mut session = store.create(None).await.unwrap();
/// session.set("user_id", 123).unwrap();
/// store.save(&session).await.unwrap();
/// # });
/// ```
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    config: SessionConfig,
}

impl MemorySessionStore {
    /// Create a new in-memory session store.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, ttl: Option<Duration>) -> SessionResult<Session> {
        let session_id = generate_session_id();
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        // Enforce max TTL
        let ttl = if ttl > self.config.max_ttl {
            self.config.max_ttl
        } else {
            ttl
        };

        let session = Session::new(&session_id, ttl);
        self.save(&session).await?;

        debug!(session_id = %session.id, "created session");
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> SessionResult<Option<Session>> {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(session) if session.is_expired() => true,
                Some(session) => return Ok(Some(session.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            self.delete(session_id).await?;
        }
        Ok(None)
    }

    async fn save(&self, session: &Session) -> SessionResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> SessionResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn exists(&self, session_id: &str) -> SessionResult<bool> {
        Ok(self.get(session_id).await?.is_some())
    }

    async fn cleanup_expired(&self) -> SessionResult<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        let removed = before - sessions.len();

        if removed > 0 {
            debug!(removed, "dropped expired sessions");
        }
        Ok(removed)
    }
}
