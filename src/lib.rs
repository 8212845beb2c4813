//! Crossguard - session-bound CSRF protection for Rust HTTP services.
//!
//! A per-session secret salt lives in the session store; a presentable token
//! is derived from it and a server-wide secret, and every state-changing
//! request must echo that token back or it is rejected. Sessions that never
//! had a token issued fail closed.
//!
//! # Examples
//!
//! ```
//! use crossguard::prelude::*;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(MemorySessionStore::default());
//! let session = store.create(None).await.unwrap();
//!
//! let csrf = CsrfMiddleware::new(CsrfConfig::new("a-long-random-shared-secret").unwrap());
//! let mut chain = MiddlewareChain::new();
//! chain.use_middleware(csrf.clone());
//!
//! // While rendering a form: issue the token to embed in the page. The
//! // session salt is created and persisted on first use.
//! let mut ctx = RequestContext::new(HttpRequest::new("GET", "/form"), session, store.clone());
//! let token = csrf.issue_token(&mut ctx).await.unwrap();
//! assert!(!token.is_empty());
//! # });
//! ```

// Re-export core functionality
pub use crossguard_core::*;

// Re-export member crates
pub use crossguard_csrf;
pub use crossguard_session;

// Prelude for common imports
pub mod prelude {
    pub use crossguard_core::{
        Error, HandlerFn, HttpRequest, HttpResponse, Middleware, MiddlewareChain, Next,
        RequestContext,
    };
    pub use crossguard_csrf::{
        CsrfConfig, CsrfError, CsrfMiddleware, DefaultTokenGenerator, HmacTokenGenerator,
        TokenGenerator,
    };
    pub use crossguard_session::{
        MemorySessionStore, Session, SessionConfig, SessionError, SessionStore,
    };
}
