//! TTL cache in front of the Formshive HTML endpoint.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use sha2::{Digest, Sha256};

use crate::cache::CacheBackend;
use crate::form::Framework;
use crate::logging::{debug, info, warn};

use super::error::RemoteError;
use super::fetch::{FormFetcher, html_url};

/// Namespace of every key this cache writes.
const NAMESPACE: &str = "formshive_html";

/// Default lifetime of a cached document.
pub const DEFAULT_HTML_TTL: Duration = Duration::from_secs(60 * 60);

/// Caches remote form HTML per `(external form ID, framework)`.
///
/// Only successful fetches are cached; a failed fetch leaves the cache
/// untouched so the next call tries again. Every key written is recorded in
/// an index so invalidating the whole namespace touches only those keys.
pub struct RemoteHtmlCache {
    fetcher: Arc<dyn FormFetcher>,
    cache: Arc<dyn CacheBackend>,
    endpoint: String,
    ttl: Duration,
    keys: DashSet<String>,
}

impl RemoteHtmlCache {
    pub fn new(
        fetcher: Arc<dyn FormFetcher>,
        cache: Arc<dyn CacheBackend>,
        endpoint: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache,
            endpoint: endpoint.into(),
            ttl,
            keys: DashSet::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Return cached HTML or fetch it once.
    pub async fn get_or_fetch(
        &self,
        external_form_id: &str,
        framework: Framework,
    ) -> Result<String, RemoteError> {
        let key = cache_key(external_form_id, framework);

        if let Some(bytes) = self.cache.get(&key) {
            match String::from_utf8(bytes) {
                Ok(html) => {
                    debug!(external_form_id = external_form_id, framework = %framework, "remote HTML cache hit");
                    return Ok(html);
                }
                Err(_) => {
                    warn!(key = %key, "discarding non UTF-8 cache entry");
                    self.cache.delete(&key);
                }
            }
        }

        let url = format!(
            "{}?iframe=false&css_framework={}",
            html_url(&self.endpoint, external_form_id),
            framework
        );
        let response = self.fetcher.get(&url).await?;
        if !response.is_ok() {
            warn!(url = %url, status = response.status, "remote form returned an error status");
            return Err(RemoteError::Status {
                url,
                status: response.status,
            });
        }

        self.cache
            .set(&key, response.body.clone().into_bytes(), Some(self.ttl));
        self.keys.insert(key);
        Ok(response.body)
    }

    /// Drop cached HTML for one form across every framework, or for all
    /// forms when `external_form_id` is `None`. Returns how many entries
    /// were removed.
    pub fn invalidate(&self, external_form_id: Option<&str>) -> usize {
        let removed = match external_form_id {
            Some(id) => Framework::ALL
                .iter()
                .map(|framework| cache_key(id, *framework))
                .filter(|key| {
                    self.keys.remove(key);
                    self.cache.delete(key)
                })
                .count(),
            None => {
                let keys: Vec<String> = self.keys.iter().map(|k| k.key().clone()).collect();
                self.keys.clear();
                keys.iter().filter(|key| self.cache.delete(key)).count()
            }
        };

        info!(
            external_form_id = external_form_id.unwrap_or("*"),
            removed = removed,
            "remote HTML cache invalidated"
        );
        removed
    }

    /// Number of keys currently tracked in the index.
    pub fn tracked_keys(&self) -> usize {
        self.keys.len()
    }
}

/// External IDs compare case-insensitively, so the key hashes the lowercase form.
fn cache_key(external_form_id: &str, framework: Framework) -> String {
    let external_form_id = external_form_id.trim().to_ascii_lowercase();
    let digest = Sha256::digest(format!("{}_{}", external_form_id, framework).as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}:{}", NAMESPACE, hex)
}
