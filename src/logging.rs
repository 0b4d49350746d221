//! Logging macros used throughout the library.
//!
//! With the `logging` feature they forward to `tracing`; without it they
//! expand to nothing, so the library never forces a subscriber on callers.
//!
//! Every event is emitted under the [`LOG_TARGET`] target whatever module it
//! comes from, so a filter directive such as `formshive=debug` selects all
//! store, cache, remote and render events at once.
//!
//! ```rust,ignore
//! use crate::logging::{debug, warn};
//!
//! debug!(id = id, "form loaded");
//! warn!(url = %url, error = %e, "remote request failed");
//! ```

/// Target of every event the library emits.
#[cfg_attr(not(feature = "logging"), allow(dead_code))]
pub(crate) const LOG_TARGET: &str = "formshive";

/// Cache hits and misses.
#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { tracing::trace!(target: $crate::logging::LOG_TARGET, $($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

/// Per-operation detail.
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!(target: $crate::logging::LOG_TARGET, $($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Store lifecycle and bulk invalidation.
#[cfg(feature = "logging")]
macro_rules! log_info {
    ($($arg:tt)*) => { tracing::info!(target: $crate::logging::LOG_TARGET, $($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

/// Rejected input and absorbed failures.
#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!(target: $crate::logging::LOG_TARGET, $($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Failures that propagate to the caller.
#[cfg(feature = "logging")]
macro_rules! log_error {
    ($($arg:tt)*) => { tracing::error!(target: $crate::logging::LOG_TARGET, $($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

pub(crate) use log_debug as debug;
pub(crate) use log_error as error;
pub(crate) use log_info as info;
pub(crate) use log_trace as trace;
pub(crate) use log_warn as warn;
