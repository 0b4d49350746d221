//! Unified error type for the formshive library.
//!
//! Each module reports its own error type; [`Error`] wraps them so that
//! application code can use a single `Result` throughout.

use thiserror::Error;

use crate::form::ValidationError;
use crate::remote::RemoteError;
use crate::store::StoreError;

/// Unified error type for all formshive operations.
///
/// # Example
///
/// ```ignore
/// use formshive::{FormStore, Result};
///
/// fn count_forms() -> Result<u64> {
///     let store = FormStore::open(".formshive")?;
///     Ok(store.stats()?.total)
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the record store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Error talking to the remote Formshive API.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A form candidate failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a store error.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns `true` if this is a remote API error.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Validation messages, whether the failure came straight from the
    /// validator or through a store write.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation(e) => Some(e.messages()),
            Self::Store(e) => e.validation_messages(),
            _ => None,
        }
    }
}
