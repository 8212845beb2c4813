//! CSRF interception middleware.

use crate::config::CsrfConfig;
use crate::error::CsrfError;
use crate::extract;
use crate::token::{DefaultTokenGenerator, TokenGenerator};
use async_trait::async_trait;
use crossguard_core::{Error, HttpRequest, HttpResponse, Middleware, Next, RequestContext};
use std::sync::Arc;
use tracing::{debug, warn};

/// Request-scoped key caching the token issued during this request.
const TOKEN_LOCAL: &str = "csrf_token";

/// CSRF protection middleware.
///
/// Gates every request whose method is outside the configured safe set: the
/// per-session salt is read from the session, the expected token is derived
/// from it, and the client-supplied token must match or the request is
/// rejected. A session without a salt fails closed: nothing was ever issued
/// for it, so there is nothing a client could legitimately echo back.
///
/// Response-rendering code obtains the value to embed in forms or headers
/// via [`issue_token`](CsrfMiddleware::issue_token).
#[derive(Clone)]
pub struct CsrfMiddleware {
    config: Arc<CsrfConfig>,
    generator: Arc<dyn TokenGenerator>,
}

impl CsrfMiddleware {
    /// Create new CSRF middleware.
    pub fn new(config: CsrfConfig) -> Self {
        let generator = config
            .generator
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultTokenGenerator::new(config.secret.clone())));

        Self {
            config: Arc::new(config),
            generator,
        }
    }

    /// Whether this request is subject to CSRF checking.
    pub fn needs_check(&self, request: &HttpRequest) -> bool {
        if self
            .config
            .safe_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&request.method))
        {
            return false;
        }

        if self
            .config
            .exclude_paths
            .iter()
            .any(|prefix| request.path.starts_with(prefix))
        {
            return false;
        }

        true
    }

    /// Current token for the session, for embedding into responses.
    ///
    /// Idempotent within a request: the first call computes and caches the
    /// token, later calls return the cached value. When the session has no
    /// salt yet, one is generated and persisted to the session store before
    /// this returns; that is the only store write this middleware performs.
    pub async fn issue_token(&self, ctx: &mut RequestContext) -> Result<String, CsrfError> {
        if let Some(token) = ctx.local(TOKEN_LOCAL) {
            return Ok(token.to_string());
        }

        let salt = match self.session_salt(ctx) {
            Some(salt) => salt,
            None => {
                let salt = self.generator.new_salt();
                ctx.session.set(&self.config.session_key, &salt)?;
                ctx.save_session().await?;
                debug!(session_id = %ctx.session.id, "established new CSRF salt");
                salt
            }
        };

        let token = self.generator.derive(&salt);
        ctx.set_local(TOKEN_LOCAL, token.clone());
        Ok(token)
    }

    fn session_salt(&self, ctx: &RequestContext) -> Option<String> {
        ctx.session
            .get::<String>(&self.config.session_key)
            .filter(|salt| !salt.is_empty())
    }

    fn supplied_token(&self, request: &HttpRequest) -> Option<String> {
        match &self.config.extractor {
            Some(custom) => custom(request).filter(|t| !t.is_empty()),
            None => extract::default_lookup(request, &self.config),
        }
    }

    fn reject(&self, ctx: &RequestContext, err: CsrfError) -> Result<HttpResponse, Error> {
        warn!(
            method = %ctx.request.method,
            path = %ctx.request.path,
            error = %err,
            "request failed CSRF validation"
        );

        match &self.config.rejection {
            Some(handler) => handler(ctx),
            None => Err(err.into()),
        }
    }
}

#[async_trait]
impl Middleware for CsrfMiddleware {
    async fn handle(&self, ctx: RequestContext, next: Next) -> Result<HttpResponse, Error> {
        if !self.needs_check(&ctx.request) {
            debug!(
                method = %ctx.request.method,
                path = %ctx.request.path,
                "request exempt from CSRF check"
            );
            return next(ctx).await;
        }

        // No salt means no token was ever issued for this session: fail closed.
        let Some(salt) = self.session_salt(&ctx) else {
            return self.reject(&ctx, CsrfError::MissingSalt);
        };

        let expected = self.generator.derive(&salt);
        let supplied = self.supplied_token(&ctx.request).unwrap_or_default();

        if self.generator.validate(&expected, &supplied) {
            next(ctx).await
        } else {
            self.reject(&ctx, CsrfError::TokenMismatch)
        }
    }
}
