//! Formshive form store.
//!
//! Stores form definitions that point at forms hosted by the Formshive API,
//! and renders them to HTML: embedded forms are fetched from the API through
//! a TTL cache, locally created forms are built from their field list.
//!
//! # Quick Start
//!
//! ```ignore
//! use formshive::prelude::*;
//!
//! let forms = FormStore::init(".formshive")?;
//! let id = forms.insert(
//!     &FormCandidate::new("Contact", "2ce22659-397b-412c-abe8-a64ce53dc4a0", "create")
//!         .with_field(FieldDescriptor::new("email", "email").with_label("Email").required()),
//! )?;
//! let record = forms.get(id)?;
//! ```
//!
//! # Modules
//!
//! - [`form`] - Record types and validation
//! - [`store`] - Record store backed by fjall, and its read-through cache
//! - [`cache`] - Shared cache substrate
//! - [`remote`] - Remote API access and the remote HTML cache
//! - [`render`] - Field renderer and render pipeline
//! - [`server`] - HTTP API server (requires `server` feature)
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `server` - Enable the HTTP API server
//! - `full` - Enable all features

pub mod cache;
pub mod form;
mod logging;
pub mod prelude;
pub mod remote;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
pub mod settings;
pub mod store;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use cache::{CacheBackend, MemoryCache};
pub use form::{
    FieldDescriptor, FieldOption, FieldType, FormCandidate, FormData, FormKind, FormRecord,
    FormStats, FormStatus, Framework, ValidationError, validate,
};
pub use remote::{
    FormFetcher, HttpFetcher, RemoteError, RemoteFormStatus, RemoteHtmlCache,
    extract_external_id, validate_remote_form,
};
pub use render::{Markup, RenderAttributes, RenderPipeline, render_field};
pub use settings::Settings;
pub use store::{CachedFormStore, FormStore, StoreError};
