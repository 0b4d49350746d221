//! Read-through cache over the record store, invalidated on every write.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::CacheBackend;
use crate::form::{FormCandidate, FormRecord, FormStats, FormStatus};
use crate::logging::{debug, trace, warn};

use super::error::StoreError;
use super::store::FormStore;

/// Namespace of every key this cache writes.
const NAMESPACE: &str = "formshive";

/// [`FormStore`] with cached reads.
///
/// Reads are cached in the shared [`CacheBackend`] without expiry under
/// `(operation, argument hash)` keys. Each successful write removes the
/// affected entries right after it commits, so a reader racing the write may
/// still see the previous value until invalidation completes. Lookups that
/// find nothing are never cached.
pub struct CachedFormStore {
    store: FormStore,
    cache: Arc<dyn CacheBackend>,
}

impl CachedFormStore {
    pub fn new(store: FormStore, cache: Arc<dyn CacheBackend>) -> Self {
        Self { store, cache }
    }

    /// The underlying store. Writes made through it bypass invalidation.
    pub fn store(&self) -> &FormStore {
        &self.store
    }

    pub fn insert(&self, candidate: &FormCandidate) -> Result<u64, StoreError> {
        let id = self.store.insert(candidate)?;
        self.invalidate_collections();
        self.cache
            .delete(&external_key(candidate.external_form_id.trim()));
        Ok(id)
    }

    pub fn update(&self, id: u64, candidate: &FormCandidate) -> Result<bool, StoreError> {
        let previous = self.store.get(id)?;
        let updated = self.store.update(id, candidate)?;
        if updated {
            self.invalidate_record(id, previous.as_ref());
            self.cache
                .delete(&external_key(candidate.external_form_id.trim()));
        }
        Ok(updated)
    }

    pub fn set_status(&self, id: u64, status: FormStatus) -> Result<bool, StoreError> {
        let previous = self.store.get(id)?;
        let changed = self.store.set_status(id, status)?;
        if changed {
            self.invalidate_record(id, previous.as_ref());
        }
        Ok(changed)
    }

    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let previous = self.store.get(id)?;
        let deleted = self.store.delete(id)?;
        if deleted {
            self.invalidate_record(id, previous.as_ref());
        }
        Ok(deleted)
    }

    /// Remove every record and drop every cached read.
    pub fn purge(&self) -> Result<usize, StoreError> {
        let removed = self.store.purge()?;
        self.cache.flush();
        Ok(removed)
    }

    pub fn get(&self, id: u64) -> Result<Option<FormRecord>, StoreError> {
        self.read_through(&record_key(id), || self.store.get(id))
    }

    pub fn get_by_external_id(
        &self,
        external_form_id: &str,
    ) -> Result<Option<FormRecord>, StoreError> {
        let external_form_id = external_form_id.trim();
        let key = external_key(external_form_id);

        let cached: Option<FormRecord> = self.read_through(&key, || {
            self.store.get_by_external_id(external_form_id)
        })?;

        match cached {
            Some(record) if !record.external_form_id.eq_ignore_ascii_case(external_form_id) => {
                // Hash collision with another external ID.
                debug!(key = %key, "cache key collision, reading through");
                self.store.get_by_external_id(external_form_id)
            }
            other => Ok(other),
        }
    }

    pub fn list(&self, status: Option<FormStatus>) -> Result<Vec<FormRecord>, StoreError> {
        let records = self.read_through(&list_key(status), || self.store.list(status).map(Some))?;
        Ok(records.unwrap_or_default())
    }

    pub fn stats(&self) -> Result<FormStats, StoreError> {
        let stats = self.read_through(&stats_key(), || self.store.stats().map(Some))?;
        Ok(stats.unwrap_or_default())
    }

    fn read_through<T, F>(&self, key: &str, load: F) -> Result<Option<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<Option<T>, StoreError>,
    {
        if let Some(bytes) = self.cache.get(key) {
            match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    trace!(key = key, "cache hit");
                    return Ok(Some(value));
                }
                Err(e) => {
                    warn!(key = key, error = %e, "discarding undecodable cache entry");
                    self.cache.delete(key);
                }
            }
        }

        trace!(key = key, "cache miss");
        let value = load()?;
        if let Some(value) = &value {
            self.cache.set(key, serde_json::to_vec(value)?, None);
        }
        Ok(value)
    }

    fn invalidate_collections(&self) {
        self.cache.delete(&stats_key());
        for status in [None, Some(FormStatus::Active), Some(FormStatus::Inactive)] {
            self.cache.delete(&list_key(status));
        }
    }

    fn invalidate_record(&self, id: u64, previous: Option<&FormRecord>) {
        self.invalidate_collections();
        self.cache.delete(&record_key(id));
        if let Some(previous) = previous {
            self.cache.delete(&external_key(&previous.external_form_id));
        }
        debug!(id = id, "invalidated cached form");
    }
}

fn record_key(id: u64) -> String {
    format!("{}:form:{}", NAMESPACE, id)
}

fn external_key(external_form_id: &str) -> String {
    let hash = crc32fast::hash(external_form_id.to_ascii_lowercase().as_bytes());
    format!("{}:form_by_id:{:08x}", NAMESPACE, hash)
}

fn list_key(status: Option<FormStatus>) -> String {
    let filter = status.map(|s| s.as_str()).unwrap_or("");
    format!("{}:all_forms:{:08x}", NAMESPACE, crc32fast::hash(filter.as_bytes()))
}

fn stats_key() -> String {
    format!("{}:form_stats", NAMESPACE)
}
