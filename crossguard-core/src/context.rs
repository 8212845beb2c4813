//! Per-request processing context.

use crate::http::HttpRequest;
use crossguard_session::{Session, SessionResult, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;

/// The unit of work flowing through the middleware chain: the incoming
/// request plus the client's session, already resolved by the surrounding
/// server. How the session identity travels (cookies, TLS) is not this
/// crate's concern.
///
/// `locals` are request-scoped values; they exist for the lifetime of one
/// request's processing and are dropped with the context.
pub struct RequestContext {
    pub request: HttpRequest,
    pub session: Session,
    store: Arc<dyn SessionStore>,
    locals: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(request: HttpRequest, session: Session, store: Arc<dyn SessionStore>) -> Self {
        Self {
            request,
            session,
            store,
            locals: HashMap::new(),
        }
    }

    /// Persist the context's session through its store.
    pub async fn save_session(&self) -> SessionResult<()> {
        self.store.save(&self.session).await
    }

    /// Get a request-scoped value.
    pub fn local(&self, key: &str) -> Option<&str> {
        self.locals.get(key).map(String::as_str)
    }

    /// Set a request-scoped value.
    pub fn set_local(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.locals.insert(key.into(), value.into());
    }
}
