//! Persistent form record store and its write-invalidated cache.

mod cached;
mod error;
mod store;

pub use cached::CachedFormStore;
pub use error::StoreError;
pub use store::FormStore;
