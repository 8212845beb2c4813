//! Session storage for Crossguard.
//!
//! Provides the session model and the [`SessionStore`] abstraction the
//! framework's request pipeline is built on, together with an in-memory
//! reference backend. A session is an externally persisted bag of key-value
//! data scoped to one client; the CSRF layer only ever reads and writes a
//! single reserved key in it.
//!
//! # Examples
//!
//! ```
//! use crossguard_session::{MemorySessionStore, SessionStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = MemorySessionStore::default();
//!
//! // Create a new session
//! let mut session = store.create(None).await.unwrap();
//!
//! // Store data in it and persist
//! session.set("username", "alice").unwrap();
//! store.save(&session).await.unwrap();
//!
//! // Retrieve it later
//! let session = store.get(&session.id).await.unwrap().unwrap();
//! assert_eq!(session.get::<String>("username"), Some("alice".to_string()));
//! # });
//! ```

pub mod config;
pub mod error;
pub mod memory_session;
pub mod traits;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use memory_session::MemorySessionStore;
pub use traits::{Session, SessionStore, generate_session_id};
