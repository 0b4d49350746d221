//! Outbound HTTP fetches against the Formshive API.

use std::time::Duration;

use async_trait::async_trait;

use crate::logging::{debug, warn};

use super::error::RemoteError;

/// Default bound on a single outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Performs a single GET.
///
/// Implementations report transport failures and timeouts as errors and any
/// answered request, whatever its status, as a [`FetchResponse`]. They never
/// retry.
#[async_trait]
pub trait FormFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, RemoteError>;
}

/// [`FormFetcher`] backed by a `reqwest` client with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("formshive/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FormFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, RemoteError> {
        debug!(url = url, "fetching remote form");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = url, error = %e, "remote request failed");
            transport_error(url, e)
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(url, e))?;

        debug!(url = url, status = status, size = body.len(), "remote form fetched");
        Ok(FetchResponse { status, body })
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout {
            url: url.to_string(),
        }
    } else {
        RemoteError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// `{endpoint}/forms/{id}/html`, the base of every HTML fetch.
pub(crate) fn html_url(endpoint: &str, external_form_id: &str) -> String {
    format!(
        "{}/forms/{}/html",
        endpoint.trim_end_matches('/'),
        external_form_id
    )
}

/// `{endpoint}/forms/{id}/submit`, the target of locally built forms.
pub fn submit_url(endpoint: &str, external_form_id: &str) -> String {
    format!(
        "{}/forms/{}/submit",
        endpoint.trim_end_matches('/'),
        external_form_id
    )
}
