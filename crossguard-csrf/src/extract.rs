//! Token extraction from incoming requests.

use crate::config::CsrfConfig;
use crossguard_core::HttpRequest;
use std::sync::Arc;

/// Pluggable lookup for the client-supplied token.
pub type TokenExtractor = Arc<dyn Fn(&HttpRequest) -> Option<String> + Send + Sync>;

/// Default lookup: form field, then query parameter, then primary header,
/// then alternate header. The first non-empty value wins.
pub(crate) fn default_lookup(request: &HttpRequest, config: &CsrfConfig) -> Option<String> {
    request
        .form_value(&config.form_field)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            request
                .query(&config.query_param)
                .map(str::to_string)
                .filter(|t| !t.is_empty())
        })
        .or_else(|| {
            request
                .header(&config.header_name)
                .map(str::to_string)
                .filter(|t| !t.is_empty())
        })
        .or_else(|| {
            request
                .header(&config.alt_header_name)
                .map(str::to_string)
                .filter(|t| !t.is_empty())
        })
}
