//! CSRF protection configuration.

use crate::error::CsrfError;
use crate::extract::TokenExtractor;
use crate::token::TokenGenerator;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use crossguard_core::{Error, HttpRequest, HttpResponse, RequestContext};
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// Handler invoked with the request context when a request fails the CSRF
/// check. It may produce a response of its own (custom error page, redirect)
/// or propagate an error to abort processing.
pub type RejectionHandler =
    Arc<dyn Fn(&RequestContext) -> Result<HttpResponse, Error> + Send + Sync>;

/// CSRF protection configuration.
///
/// The secret is process-wide and immutable for the process lifetime; every
/// server instance that should accept each other's tokens must share it.
#[derive(Clone)]
pub struct CsrfConfig {
    /// Server-wide secret mixed into every token derivation
    pub secret: String,

    /// HTTP methods exempt from CSRF checking
    pub safe_methods: Vec<String>,

    /// Path prefixes exempt from CSRF checking
    pub exclude_paths: Vec<String>,

    /// Reserved session key holding the per-session salt
    pub session_key: String,

    /// Form field checked for the supplied token
    pub form_field: String,

    /// Query parameter checked for the supplied token
    pub query_param: String,

    /// Primary header checked for the supplied token
    pub header_name: String,

    /// Alternate header checked for the supplied token
    pub alt_header_name: String,

    pub(crate) extractor: Option<TokenExtractor>,
    pub(crate) rejection: Option<RejectionHandler>,
    pub(crate) generator: Option<Arc<dyn TokenGenerator>>,
}

impl CsrfConfig {
    /// Create a new CSRF configuration.
    ///
    /// Fails on an empty secret: without one, tokens would be forgeable by
    /// anyone who learns a session salt.
    pub fn new(secret: impl Into<String>) -> Result<Self, CsrfError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(CsrfError::MissingSecret);
        }

        Ok(Self {
            secret,
            safe_methods: vec![
                "GET".to_string(),
                "HEAD".to_string(),
                "OPTIONS".to_string(),
            ],
            exclude_paths: Vec::new(),
            session_key: "csrf_salt".to_string(),
            form_field: "_csrf".to_string(),
            query_param: "_csrf".to_string(),
            header_name: "X-CSRF-TOKEN".to_string(),
            alt_header_name: "X-XSRF-TOKEN".to_string(),
            extractor: None,
            rejection: None,
            generator: None,
        })
    }

    /// Generate a random secret.
    ///
    /// Convenient for development; multi-instance deployments must configure
    /// a shared secret instead, or tokens issued by one instance will not
    /// validate on another.
    pub fn generate_secret() -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 32] = rng.r#gen();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Set the safe-method set.
    pub fn with_safe_methods(mut self, methods: Vec<String>) -> Self {
        self.safe_methods = methods;
        self
    }

    /// Set excluded path prefixes.
    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }

    /// Set the reserved session key for the salt.
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// Set the form field name.
    pub fn with_form_field(mut self, name: impl Into<String>) -> Self {
        self.form_field = name.into();
        self
    }

    /// Set the query parameter name.
    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }

    /// Set the primary header name.
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set the alternate header name.
    pub fn with_alt_header_name(mut self, name: impl Into<String>) -> Self {
        self.alt_header_name = name.into();
        self
    }

    /// Replace the four-source token lookup with a custom one.
    pub fn with_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&HttpRequest) -> Option<String> + Send + Sync + 'static,
    {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Replace the default rejection (a `Forbidden` error) with a custom
    /// handler.
    pub fn with_rejection_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<HttpResponse, Error> + Send + Sync + 'static,
    {
        self.rejection = Some(Arc::new(handler));
        self
    }

    /// Replace the built-in token generator.
    pub fn with_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self::new(Self::generate_secret()).unwrap()
    }
}

impl fmt::Debug for CsrfConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfConfig")
            .field("secret", &"<redacted>")
            .field("safe_methods", &self.safe_methods)
            .field("exclude_paths", &self.exclude_paths)
            .field("session_key", &self.session_key)
            .field("form_field", &self.form_field)
            .field("query_param", &self.query_param)
            .field("header_name", &self.header_name)
            .field("alt_header_name", &self.alt_header_name)
            .field("custom_extractor", &self.extractor.is_some())
            .field("custom_rejection", &self.rejection.is_some())
            .field("custom_generator", &self.generator.is_some())
            .finish()
    }
}
