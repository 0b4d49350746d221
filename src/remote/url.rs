//! Form URL parsing and remote form validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::logging::{debug, warn};

use super::fetch::{FormFetcher, html_url};

#[allow(clippy::expect_used)]
static DIGEST_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://[^/]+/v1/digest/([a-f0-9-]{36})$").expect("digest URL pattern is a valid regex")
});

#[allow(clippy::expect_used)]
static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("title pattern is a valid regex")
});

/// Title the API serves for forms that still need fields configured.
const SPECS_REQUIRED_TITLE: &str = "form check specs required";

/// What a direct fetch revealed about a remote form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoteFormStatus {
    /// The API answered with HTTP 200.
    pub exists: bool,
    /// The form exists and is not waiting for field configuration.
    pub has_valid_html: bool,
}

/// Extract the form ID from a full digest URL such as
/// `https://api.formshive.com/v1/digest/{uuid}`. Anything else yields `None`.
pub fn extract_external_id(url: &str) -> Option<String> {
    DIGEST_URL
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check a form against the API without touching any cache.
pub async fn validate_remote_form(
    fetcher: &dyn FormFetcher,
    endpoint: &str,
    external_form_id: &str,
) -> RemoteFormStatus {
    let url = format!("{}?iframe=false", html_url(endpoint, external_form_id));

    let response = match fetcher.get(&url).await {
        Ok(response) if response.is_ok() => response,
        Ok(response) => {
            debug!(url = %url, status = response.status, "remote form not found");
            return RemoteFormStatus {
                exists: false,
                has_valid_html: false,
            };
        }
        Err(e) => {
            warn!(url = %url, error = %e, "remote form validation failed");
            return RemoteFormStatus {
                exists: false,
                has_valid_html: false,
            };
        }
    };

    RemoteFormStatus {
        exists: true,
        has_valid_html: !requires_field_specs(&response.body),
    }
}

/// Whether the page title says the form still needs its fields set up.
fn requires_field_specs(html: &str) -> bool {
    TITLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .is_some_and(|title| {
            title
                .as_str()
                .trim()
                .to_lowercase()
                .contains(SPECS_REQUIRED_TITLE)
        })
}
