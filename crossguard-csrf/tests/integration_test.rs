//! Integration tests for crossguard-csrf

use async_trait::async_trait;
use crossguard_core::{
    Error, HandlerFn, HttpRequest, HttpResponse, MiddlewareChain, RequestContext,
};
use crossguard_csrf::{
    CsrfConfig, CsrfMiddleware, DefaultTokenGenerator, HmacTokenGenerator, TokenGenerator,
};
use crossguard_session::{MemorySessionStore, Session, SessionResult, SessionStore};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn ok_handler() -> HandlerFn {
    Arc::new(|_ctx: RequestContext| {
        Box::pin(async { Ok(HttpResponse::ok()) })
            as Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>
    })
}

fn chain_with(csrf: CsrfMiddleware) -> MiddlewareChain {
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(csrf);
    chain
}

async fn session_with_salt(store: &Arc<MemorySessionStore>, salt: &str) -> Session {
    let mut session = store.create(None).await.unwrap();
    session.set("csrf_salt", salt).unwrap();
    store.save(&session).await.unwrap();
    session
}

fn token_for(secret: &str, salt: &str) -> String {
    DefaultTokenGenerator::new(secret).derive(salt)
}

#[tokio::test]
async fn test_post_with_valid_header_token_is_allowed() {
    let store = Arc::new(MemorySessionStore::default());
    let session = session_with_salt(&store, "abc123").await;

    let request = HttpRequest::new("POST", "/submit")
        .with_header("X-CSRF-TOKEN", token_for("s3cr3t", "abc123"));
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    let response = chain.apply(ctx, ok_handler()).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_post_without_salt_is_rejected() {
    let store = Arc::new(MemorySessionStore::default());
    let session = store.create(None).await.unwrap();

    // Even a well-formed token valid for some other session must fail:
    // this session never had anything issued.
    let request = HttpRequest::new("POST", "/submit")
        .with_header("X-CSRF-TOKEN", token_for("s3cr3t", "abc123"));
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    let result = chain.apply(ctx, ok_handler()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_stale_token_from_old_salt_is_rejected() {
    let store = Arc::new(MemorySessionStore::default());
    let session = session_with_salt(&store, "abc123").await;

    let request = HttpRequest::new("POST", "/submit")
        .with_header("X-CSRF-TOKEN", token_for("s3cr3t", "xyz999"));
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    assert!(matches!(
        chain.apply(ctx, ok_handler()).await,
        Err(Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_get_without_token_is_allowed() {
    let store = Arc::new(MemorySessionStore::default());
    let session = store.create(None).await.unwrap();
    let ctx = RequestContext::new(HttpRequest::new("GET", "/page"), session, store);

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    let response = chain.apply(ctx, ok_handler()).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_safe_method_ignores_garbage_token() {
    let store = Arc::new(MemorySessionStore::default());
    let session = store.create(None).await.unwrap();
    let request = HttpRequest::new("GET", "/page").with_header("X-CSRF-TOKEN", "garbage");
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    assert_eq!(chain.apply(ctx, ok_handler()).await.unwrap().status, 200);
}

#[tokio::test]
async fn test_form_token_wins_over_header() {
    let store = Arc::new(MemorySessionStore::default());
    let valid = token_for("s3cr3t", "abc123");

    // Valid token in the form, junk in the header: the form source wins.
    let session = session_with_salt(&store, "abc123").await;
    let request = HttpRequest::new("POST", "/submit")
        .with_form_body(&[("_csrf", valid.as_str())])
        .with_header("X-CSRF-TOKEN", "junk");
    let ctx = RequestContext::new(request, session, store.clone());

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    assert_eq!(chain.apply(ctx, ok_handler()).await.unwrap().status, 200);

    // Junk in the form, valid token in the header: the form still wins.
    let session = session_with_salt(&store, "abc123").await;
    let request = HttpRequest::new("POST", "/submit")
        .with_form_body(&[("_csrf", "junk")])
        .with_header("X-CSRF-TOKEN", valid.as_str());
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    assert!(matches!(
        chain.apply(ctx, ok_handler()).await,
        Err(Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_query_token_is_accepted_when_form_is_absent() {
    let store = Arc::new(MemorySessionStore::default());
    let session = session_with_salt(&store, "abc123").await;

    let request = HttpRequest::new("POST", "/submit")
        .with_query_param("_csrf", token_for("s3cr3t", "abc123"))
        .with_header("X-CSRF-TOKEN", "junk");
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap()));
    assert_eq!(chain.apply(ctx, ok_handler()).await.unwrap().status, 200);
}

#[tokio::test]
async fn test_issued_token_round_trips() {
    let store = Arc::new(MemorySessionStore::default());
    let csrf = CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap());

    // Request 1: render a form, issuing a token (and lazily creating the salt).
    let session = store.create(None).await.unwrap();
    let session_id = session.id.clone();
    let mut ctx = RequestContext::new(HttpRequest::new("GET", "/form"), session, store.clone());
    let token = csrf.issue_token(&mut ctx).await.unwrap();

    // Request 2: the client echoes the token back on a mutating request.
    let session = store.get(&session_id).await.unwrap().unwrap();
    let request =
        HttpRequest::new("POST", "/submit").with_form_body(&[("_csrf", token.as_str())]);
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(csrf);
    assert_eq!(chain.apply(ctx, ok_handler()).await.unwrap().status, 200);
}

#[tokio::test]
async fn test_token_issued_on_one_instance_validates_on_another() {
    let store = Arc::new(MemorySessionStore::default());

    // Two middleware instances sharing a secret, as in a multi-server deployment.
    let issuer = CsrfMiddleware::new(CsrfConfig::new("shared-secret").unwrap());
    let validator = CsrfMiddleware::new(CsrfConfig::new("shared-secret").unwrap());

    let session = store.create(None).await.unwrap();
    let session_id = session.id.clone();
    let mut ctx = RequestContext::new(HttpRequest::new("GET", "/form"), session, store.clone());
    let token = issuer.issue_token(&mut ctx).await.unwrap();

    let session = store.get(&session_id).await.unwrap().unwrap();
    let request = HttpRequest::new("POST", "/submit").with_header("X-XSRF-TOKEN", token);
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(validator);
    assert_eq!(chain.apply(ctx, ok_handler()).await.unwrap().status, 200);
}

/// Store wrapper counting `save` calls that reach it from the outside.
struct CountingStore {
    inner: MemorySessionStore,
    saves: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemorySessionStore::default(),
            saves: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn create(&self, ttl: Option<Duration>) -> SessionResult<Session> {
        self.inner.create(ttl).await
    }

    async fn get(&self, session_id: &str) -> SessionResult<Option<Session>> {
        self.inner.get(session_id).await
    }

    async fn save(&self, session: &Session) -> SessionResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(session).await
    }

    async fn delete(&self, session_id: &str) -> SessionResult<()> {
        self.inner.delete(session_id).await
    }

    async fn exists(&self, session_id: &str) -> SessionResult<bool> {
        self.inner.exists(session_id).await
    }

    async fn cleanup_expired(&self) -> SessionResult<usize> {
        self.inner.cleanup_expired().await
    }
}

#[tokio::test]
async fn test_issuance_writes_the_store_at_most_once() {
    let store = Arc::new(CountingStore::new());
    let csrf = CsrfMiddleware::new(CsrfConfig::new("s3cr3t").unwrap());

    let session = store.create(None).await.unwrap();
    let session_id = session.id.clone();
    let mut ctx = RequestContext::new(HttpRequest::new("GET", "/form"), session, store.clone());

    let first = csrf.issue_token(&mut ctx).await.unwrap();
    let second = csrf.issue_token(&mut ctx).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);

    // A later request for the same session finds the salt and writes nothing.
    let session = store.get(&session_id).await.unwrap().unwrap();
    let mut ctx = RequestContext::new(HttpRequest::new("GET", "/form"), session, store.clone());
    let third = csrf.issue_token(&mut ctx).await.unwrap();
    assert_eq!(first, third);
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_custom_rejection_handler_renders_a_response() {
    let store = Arc::new(MemorySessionStore::default());
    let session = store.create(None).await.unwrap();
    let ctx = RequestContext::new(HttpRequest::new("POST", "/submit"), session, store);

    let config = CsrfConfig::new("s3cr3t").unwrap().with_rejection_handler(|_ctx| {
        Ok(HttpResponse::forbidden().with_body(b"please retry with a fresh form".to_vec()))
    });
    let chain = chain_with(CsrfMiddleware::new(config));

    let response = chain.apply(ctx, ok_handler()).await.unwrap();
    assert_eq!(response.status, 403);
    assert_eq!(response.body, b"please retry with a fresh form");
}

#[tokio::test]
async fn test_custom_safe_method_set() {
    let store = Arc::new(MemorySessionStore::default());
    let session = store.create(None).await.unwrap();

    // HEAD removed from the safe set: with no salt established it fails closed.
    let config = CsrfConfig::new("s3cr3t")
        .unwrap()
        .with_safe_methods(vec!["GET".to_string()]);
    let chain = chain_with(CsrfMiddleware::new(config));

    let ctx = RequestContext::new(HttpRequest::new("HEAD", "/page"), session, store);
    assert!(matches!(
        chain.apply(ctx, ok_handler()).await,
        Err(Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_hmac_generator_end_to_end() {
    let store = Arc::new(MemorySessionStore::default());
    let generator: Arc<dyn TokenGenerator> = Arc::new(HmacTokenGenerator::new("s3cr3t"));

    let config = CsrfConfig::new("s3cr3t")
        .unwrap()
        .with_generator(generator.clone());
    let csrf = CsrfMiddleware::new(config);

    let session = session_with_salt(&store, "abc123").await;
    let request =
        HttpRequest::new("POST", "/submit").with_header("X-CSRF-TOKEN", generator.derive("abc123"));
    let ctx = RequestContext::new(request, session, store.clone());

    let chain = chain_with(csrf);
    assert_eq!(chain.apply(ctx, ok_handler()).await.unwrap().status, 200);

    // The plain-digest token must not pass the HMAC scheme.
    let config = CsrfConfig::new("s3cr3t")
        .unwrap()
        .with_generator(Arc::new(HmacTokenGenerator::new("s3cr3t")));
    let session = session_with_salt(&store, "abc123").await;
    let request = HttpRequest::new("POST", "/submit")
        .with_header("X-CSRF-TOKEN", token_for("s3cr3t", "abc123"));
    let ctx = RequestContext::new(request, session, store);

    let chain = chain_with(CsrfMiddleware::new(config));
    assert!(matches!(
        chain.apply(ctx, ok_handler()).await,
        Err(Error::Forbidden(_))
    ));
}
