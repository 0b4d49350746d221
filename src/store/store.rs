//! Record store implementation using fjall.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::form::{FormCandidate, FormKind, FormRecord, FormStats, FormStatus, validate};
use crate::logging::{debug, error, info, trace, warn};

use super::error::StoreError;

/// Keys in the metadata keyspace.
const META_CONFIG_KEY: &str = "config";
const META_NEXT_ID_KEY: &str = "next_id";

/// Prefix of record keys in the forms keyspace.
const FORM_PREFIX: &str = "forms/";

/// Current store version (1).
/// Increment this when changing the on-disk layout or record encoding.
/// The store will reject opening databases with a different version.
const STORE_VERSION: u32 = 1;

/// Persistent store of form records backed by fjall.
///
/// Records live in the `forms` keyspace as JSON, keyed by their zero-padded
/// id. The `forms_by_external` keyspace indexes them by lowercased external
/// form ID so that duplicates sharing one external form resolve to the
/// lowest id.
///
/// Every write validates first and is durably persisted before returning.
///
/// # Example
///
/// ```ignore
/// use formshive::{FormCandidate, FormStore};
///
/// let store = FormStore::init(".formshive")?;
/// let id = store.insert(
///     &FormCandidate::new("Contact", "2ce22659-397b-412c-abe8-a64ce53dc4a0", "embed"),
/// )?;
/// let record = store.get(id)?;
/// ```
pub struct FormStore {
    db: fjall::Database,
    meta: Keyspace,
    forms: Keyspace,
    by_external: Keyspace,
    next_id: AtomicU64,
}

impl FormStore {
    /// Open an existing store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening form store");

        if !path.exists() {
            error!(path = %path.display(), "store path does not exist");
            return Err(StoreError::NotInitialized(path.display().to_string()));
        }

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;

        // Verify store version
        let Some(config) = meta.get(META_CONFIG_KEY)? else {
            error!(path = %path.display(), "store config missing");
            return Err(StoreError::NotInitialized(path.display().to_string()));
        };
        let version = u32::from_le_bytes(
            config
                .as_ref()
                .try_into()
                .map_err(|_| StoreError::InvalidFormat("Invalid config format".to_string()))?,
        );
        if version != STORE_VERSION {
            error!(
                stored_version = version,
                expected_version = STORE_VERSION,
                "store version mismatch"
            );
            return Err(StoreError::InvalidFormat(format!(
                "Store version mismatch: expected {}, got {}",
                STORE_VERSION, version
            )));
        }

        let store = Self::with_keyspaces(db, meta)?;
        info!(
            path = %path.display(),
            next_id = store.next_id.load(Ordering::SeqCst),
            "form store opened"
        );
        Ok(store)
    }

    /// Initialize a new store at the given path.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "initializing form store");

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;

        // Write store version
        meta.insert(META_CONFIG_KEY, STORE_VERSION.to_le_bytes())?;
        db.persist(PersistMode::SyncAll)?;

        let store = Self::with_keyspaces(db, meta)?;
        info!(path = %path.display(), version = STORE_VERSION, "form store initialized");
        Ok(store)
    }

    /// Open the store if it exists, otherwise initialize it.
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::init(path)
        }
    }

    fn with_keyspaces(db: fjall::Database, meta: Keyspace) -> Result<Self, StoreError> {
        let forms = db.keyspace("forms", KeyspaceCreateOptions::default)?;
        let by_external = db.keyspace("forms_by_external", KeyspaceCreateOptions::default)?;

        let store = Self {
            db,
            meta,
            forms,
            by_external,
            next_id: AtomicU64::new(1),
        };
        store.next_id.store(store.recover_next_id()?, Ordering::SeqCst);
        Ok(store)
    }

    /// Insert a new record with `status = active`, returning its id.
    pub fn insert(&self, candidate: &FormCandidate) -> Result<u64, StoreError> {
        let form = validate(candidate).inspect_err(|e| {
            warn!(errors = %e, "rejecting invalid form on insert");
        })?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let record = FormRecord {
            id,
            name: form.name,
            external_form_id: form.external_form_id,
            kind: form.kind,
            framework: form.framework,
            fields: form.form_data.fields,
            submit_text: form.form_data.submit_text,
            status: FormStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.meta.insert(
            META_NEXT_ID_KEY,
            self.next_id.load(Ordering::SeqCst).to_le_bytes(),
        )?;
        self.write_record(&record)?;
        self.by_external
            .insert(external_index_key(&record.external_form_id, id), b"".as_slice())?;
        self.db.persist(PersistMode::SyncAll)?;

        info!(
            id = id,
            external_form_id = %record.external_form_id,
            kind = %record.kind,
            "form inserted"
        );
        Ok(id)
    }

    /// Replace a record's content. Returns `false` if `id` does not exist.
    ///
    /// Status and `created_at` are kept; `updated_at` is bumped.
    pub fn update(&self, id: u64, candidate: &FormCandidate) -> Result<bool, StoreError> {
        let form = validate(candidate).inspect_err(|e| {
            warn!(id = id, errors = %e, "rejecting invalid form on update");
        })?;

        let Some(existing) = self.get(id)? else {
            debug!(id = id, "update of missing form");
            return Ok(false);
        };

        let record = FormRecord {
            id,
            name: form.name,
            external_form_id: form.external_form_id,
            kind: form.kind,
            framework: form.framework,
            fields: form.form_data.fields,
            submit_text: form.form_data.submit_text,
            status: existing.status,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        self.write_record(&record)?;
        if !existing
            .external_form_id
            .eq_ignore_ascii_case(&record.external_form_id)
        {
            self.by_external
                .remove(external_index_key(&existing.external_form_id, id))?;
        }
        self.by_external
            .insert(external_index_key(&record.external_form_id, id), b"".as_slice())?;
        self.db.persist(PersistMode::SyncAll)?;

        info!(id = id, external_form_id = %record.external_form_id, "form updated");
        Ok(true)
    }

    /// Activate or deactivate a record. Returns `false` if `id` does not exist.
    pub fn set_status(&self, id: u64, status: FormStatus) -> Result<bool, StoreError> {
        let Some(mut record) = self.get(id)? else {
            return Ok(false);
        };

        record.status = status;
        record.updated_at = Utc::now();
        self.write_record(&record)?;
        self.db.persist(PersistMode::SyncAll)?;

        info!(id = id, status = %status, "form status changed");
        Ok(true)
    }

    /// Get a record by id.
    pub fn get(&self, id: u64) -> Result<Option<FormRecord>, StoreError> {
        trace!(id = id, "loading form");
        let Some(bytes) = self.forms.get(record_key(id))? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Get a record by external form ID, case-insensitively.
    ///
    /// When several records share the external ID the lowest id wins.
    pub fn get_by_external_id(
        &self,
        external_form_id: &str,
    ) -> Result<Option<FormRecord>, StoreError> {
        let prefix = format!("{}/", external_form_id.trim().to_ascii_lowercase());

        for kv in self.by_external.prefix(&prefix) {
            let Ok(key_bytes) = kv.key() else {
                warn!(prefix = %prefix, "skipping unreadable index entry");
                continue;
            };
            let key = String::from_utf8_lossy(&key_bytes);
            let Some(id) = key.rsplit('/').next().and_then(|s| s.parse::<u64>().ok()) else {
                warn!(key = %key, "skipping malformed index entry");
                continue;
            };

            if let Some(record) = self.get(id)? {
                return Ok(Some(record));
            }
            warn!(id = id, "index entry points at a missing form");
        }

        Ok(None)
    }

    /// List records, newest first. `None` lists every status.
    pub fn list(&self, status: Option<FormStatus>) -> Result<Vec<FormRecord>, StoreError> {
        let mut records: Vec<FormRecord> = self
            .all_records()?
            .into_iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .collect();

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    /// Remove a record. Returns `false` if `id` does not exist.
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let Some(existing) = self.get(id)? else {
            return Ok(false);
        };

        self.forms.remove(record_key(id))?;
        self.by_external
            .remove(external_index_key(&existing.external_form_id, id))?;
        self.db.persist(PersistMode::SyncAll)?;

        info!(id = id, "form deleted");
        Ok(true)
    }

    /// Aggregate counts over every record.
    pub fn stats(&self) -> Result<FormStats, StoreError> {
        let mut stats = FormStats::default();
        for record in self.all_records()? {
            stats.total += 1;
            if record.status == FormStatus::Active {
                stats.active += 1;
            }
            match record.kind {
                FormKind::Embed => stats.embed_count += 1,
                FormKind::Create => stats.create_count += 1,
            }
        }
        Ok(stats)
    }

    /// Remove every record and index entry, returning how many records were
    /// removed. Ids are not reissued afterwards.
    pub fn purge(&self) -> Result<usize, StoreError> {
        let form_keys = collect_keys(&self.forms);
        let index_keys = collect_keys(&self.by_external);

        for key in &form_keys {
            self.forms.remove(key.as_slice())?;
        }
        for key in &index_keys {
            self.by_external.remove(key.as_slice())?;
        }
        self.db.persist(PersistMode::SyncAll)?;

        info!(removed = form_keys.len(), "form store purged");
        Ok(form_keys.len())
    }

    // Helper methods

    fn write_record(&self, record: &FormRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        trace!(id = record.id, size = bytes.len(), "writing form");
        self.forms.insert(record_key(record.id), bytes)?;
        Ok(())
    }

    fn all_records(&self) -> Result<Vec<FormRecord>, StoreError> {
        let mut records = Vec::new();
        for key in collect_keys(&self.forms) {
            let Some(bytes) = self.forms.get(key.as_slice())? else {
                continue;
            };
            records.push(serde_json::from_slice(&bytes)?);
        }
        Ok(records)
    }

    /// Next id to issue: one past both the persisted counter and the highest
    /// stored id.
    fn recover_next_id(&self) -> Result<u64, StoreError> {
        let persisted = match self.meta.get(META_NEXT_ID_KEY)? {
            Some(bytes) => u64::from_le_bytes(
                bytes
                    .as_ref()
                    .try_into()
                    .map_err(|_| StoreError::InvalidFormat("Invalid id counter".to_string()))?,
            ),
            None => 1,
        };

        let highest = collect_keys(&self.forms)
            .iter()
            .filter_map(|key| {
                std::str::from_utf8(key)
                    .ok()
                    .and_then(|k| k.strip_prefix(FORM_PREFIX))
                    .and_then(|id| id.parse::<u64>().ok())
            })
            .max()
            .unwrap_or(0);

        Ok(persisted.max(highest + 1))
    }
}

fn record_key(id: u64) -> String {
    format!("{}{:020}", FORM_PREFIX, id)
}

fn external_index_key(external_form_id: &str, id: u64) -> String {
    format!("{}/{:020}", external_form_id.to_ascii_lowercase(), id)
}

fn collect_keys(keyspace: &Keyspace) -> Vec<Vec<u8>> {
    keyspace
        .iter()
        .filter_map(|kv| kv.key().ok().map(|k| k.to_vec()))
        .collect()
}
