//! Core request-processing primitives for Crossguard.
//!
//! Provides the plain HTTP request/response types, the per-request
//! [`RequestContext`] (request + client session + request-scoped values),
//! and the [`Middleware`] chain that interception stages such as the CSRF
//! guard plug into.
//!
//! # Examples
//!
//! ```
//! use crossguard_core::{Error, HandlerFn, HttpRequest, HttpResponse, MiddlewareChain, RequestContext};
//! use crossguard_session::{MemorySessionStore, SessionStore};
//! use std::future::Future;
//! use std::pin::Pin;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(MemorySessionStore::default());
//! let session = store.create(None).await.unwrap();
//! let ctx = RequestContext::new(HttpRequest::new("GET", "/"), session, store);
//!
//! let handler: HandlerFn = Arc::new(|_ctx: RequestContext| {
//!     Box::pin(async { Ok(HttpResponse::ok()) })
//!         as Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>
//! });
//!
//! let chain = MiddlewareChain::new();
//! let response = chain.apply(ctx, handler).await.unwrap();
//! assert_eq!(response.status, 200);
//! # });
//! ```

pub mod context;
pub mod error;
pub mod http;
pub mod middleware;

pub use context::RequestContext;
pub use error::Error;
pub use http::{HttpRequest, HttpResponse};
pub use middleware::{HandlerFn, Middleware, MiddlewareChain, Next};
