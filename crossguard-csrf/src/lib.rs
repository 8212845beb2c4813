//! # Crossguard CSRF Protection
//!
//! Cross-Site Request Forgery protection for Crossguard applications,
//! binding a per-session secret salt to a token the client must echo back
//! on every state-changing request.
//!
//! ## Features
//!
//! - **Session-bound tokens** - synchronizer token pattern: a random salt
//!   lives in the session, the presentable token is derived from it and a
//!   server-wide secret
//! - **Fail closed** - a session without a salt rejects every unsafe request
//! - **Constant-time comparison** - token matching does not leak timing
//! - **Four-source extraction** - form field, query parameter, and two
//!   headers, first non-empty value wins
//! - **Configurable** - safe methods, excluded paths, field/header names,
//!   rejection handling
//! - **Pluggable generation** - swap in an HMAC-based or custom scheme
//!   without touching the interception logic
//!
//! ## Quick Start
//!
//! ```
//! use crossguard_csrf::{CsrfConfig, CsrfMiddleware};
//!
//! // Shared, operator-supplied secret
//! let config = CsrfConfig::new("a-long-random-shared-secret").unwrap();
//! let csrf = CsrfMiddleware::new(config);
//! ```
//!
//! ## Token Derivation
//!
//! ```
//! use crossguard_csrf::token::{DefaultTokenGenerator, TokenGenerator};
//!
//! let generator = DefaultTokenGenerator::new("s3cr3t");
//!
//! let salt = generator.new_salt();
//! let token = generator.derive(&salt);
//!
//! // Derivation is deterministic, comparison is exact
//! assert_eq!(token, generator.derive(&salt));
//! assert!(generator.validate(&token, &token));
//! assert!(!generator.validate(&token, ""));
//! ```
//!
//! ## Usage in a Pipeline
//!
//! ```ignore
//! use crossguard_core::{MiddlewareChain, RequestContext};
//! use crossguard_csrf::{CsrfConfig, CsrfMiddleware};
//!
//! let csrf = CsrfMiddleware::new(CsrfConfig::new(secret)?);
//!
//! let mut chain = MiddlewareChain::new();
//! chain.use_middleware(csrf.clone());
//!
//! // In a form-rendering handler: expose the token to the template
//! let token = csrf.issue_token(&mut ctx).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod token;

pub use config::{CsrfConfig, RejectionHandler};
pub use error::{CsrfError, Result};
pub use extract::TokenExtractor;
pub use middleware::CsrfMiddleware;
pub use token::{DefaultTokenGenerator, HmacTokenGenerator, TokenGenerator};
