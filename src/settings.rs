//! Runtime settings shared by the remote cache and the render pipeline.

use std::time::Duration;

use crate::form::Framework;
use crate::remote::{DEFAULT_HTML_TTL, DEFAULT_TIMEOUT};

/// Base URL of the hosted Formshive API.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.formshive.com/v1";

/// Immutable settings, built once and passed to constructors.
///
/// Changing settings means building new components from a new value; see
/// `AppState::reload_settings` in the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the remote API, without a trailing slash.
    pub api_endpoint: String,
    /// Framework used when a form does not name one.
    pub default_framework: Framework,
    /// Bound on each outbound request.
    pub request_timeout: Duration,
    /// Lifetime of cached remote HTML.
    pub html_cache_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            default_framework: Framework::default(),
            request_timeout: DEFAULT_TIMEOUT,
            html_cache_ttl: DEFAULT_HTML_TTL,
        }
    }
}

impl Settings {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_framework(mut self, framework: Framework) -> Self {
        self.default_framework = framework;
        self
    }
}
