//! HTTP API server for formshive.
//!
//! JSON endpoints manage form records and the remote HTML cache under
//! `/api/v1`; `/render` serves rendered markup. Write and admin routes
//! require a bearer token when one is configured.

mod auth;
mod config;
mod error;
mod logging;
mod routes;
mod state;

pub use auth::Authorized;
pub use config::{
    AuthConfig, Config, ConfigError, CorsConfig, LogFormat, LoggingConfig, RemoteConfig,
    RenderConfig, ServerConfig, StoreConfig,
};
pub use error::ApiError;
pub use logging::{LoggingError, init as init_logging};
pub use routes::router;
pub use state::{AppState, StateError};
