//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use formshive::prelude::*;
//!
//! let forms = CachedFormStore::new(FormStore::open(".formshive")?, Arc::new(MemoryCache::new()));
//! let stats = forms.stats()?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Records and validation
pub use crate::form::{
    FieldDescriptor, FieldType, FormCandidate, FormKind, FormRecord, FormStats, FormStatus,
    Framework, ValidationError,
};

// Storage and caching
pub use crate::cache::{CacheBackend, MemoryCache};
pub use crate::store::{CachedFormStore, FormStore, StoreError};

// Remote API and rendering
pub use crate::remote::{FormFetcher, HttpFetcher, RemoteError, RemoteHtmlCache};
pub use crate::render::{Markup, RenderAttributes, RenderPipeline};
pub use crate::settings::Settings;

pub use std::sync::Arc;
