//! Access to the remote Formshive API.
//!
//! [`RemoteHtmlCache`] shields the API's HTML endpoint behind a TTL cache,
//! and [`validate_remote_form`] checks a form directly. Both fetch through a
//! [`FormFetcher`], which is [`HttpFetcher`] outside of tests.

mod error;
mod fetch;
mod html_cache;
mod url;

pub use error::RemoteError;
pub use fetch::{DEFAULT_TIMEOUT, FetchResponse, FormFetcher, HttpFetcher, submit_url};
pub use html_cache::{DEFAULT_HTML_TTL, RemoteHtmlCache};
pub use url::{RemoteFormStatus, extract_external_id, validate_remote_form};
