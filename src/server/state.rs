//! Application state management.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::cache::{CacheBackend, MemoryCache};
use crate::logging::info;
use crate::remote::{FormFetcher, HttpFetcher, RemoteError, RemoteHtmlCache};
use crate::render::RenderPipeline;
use crate::settings::Settings;
use crate::store::{CachedFormStore, FormStore, StoreError};

use super::config::Config;

/// Components rebuilt when settings change.
struct Services {
    settings: Settings,
    remote: Arc<RemoteHtmlCache>,
    pipeline: Arc<RenderPipeline>,
}

/// Shared application state.
///
/// The store and the cache substrate live for the whole process. The remote
/// HTML cache and the render pipeline depend on [`Settings`] and are swapped
/// out together by [`AppState::reload_settings`].
#[derive(Clone)]
pub struct AppState {
    forms: Arc<CachedFormStore>,
    cache: Arc<dyn CacheBackend>,
    fetcher: Arc<dyn FormFetcher>,
    auth_token: Option<Arc<str>>,
    services: Arc<RwLock<Services>>,
}

impl AppState {
    /// Create a new AppState from configuration, fetching over HTTP.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let settings = config.settings();
        let fetcher = HttpFetcher::new(settings.request_timeout).map_err(StateError::Client)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Create a new AppState that fetches remote forms through `fetcher`.
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn FormFetcher>) -> Result<Self, StateError> {
        let path = Path::new(&config.store.path);
        let store = FormStore::open_or_init(path).map_err(|e| StateError::OpenStore {
            path: config.store.path.clone(),
            source: e,
        })?;

        let cache: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new());
        let forms = Arc::new(CachedFormStore::new(store, cache.clone()));
        let settings = config.settings();
        let services = build_services(&forms, &cache, &fetcher, settings);

        Ok(Self {
            forms,
            cache,
            fetcher,
            auth_token: config.auth.token.as_deref().map(Arc::from),
            services: Arc::new(RwLock::new(services)),
        })
    }

    pub fn forms(&self) -> &CachedFormStore {
        &self.forms
    }

    pub fn remote(&self) -> Arc<RemoteHtmlCache> {
        self.read_services(|s| s.remote.clone())
    }

    pub fn pipeline(&self) -> Arc<RenderPipeline> {
        self.read_services(|s| s.pipeline.clone())
    }

    pub fn fetcher(&self) -> &dyn FormFetcher {
        self.fetcher.as_ref()
    }

    pub fn settings(&self) -> Settings {
        self.read_services(|s| s.settings.clone())
    }

    /// Token required on write routes, if any.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Replace the settings, rebuilding the remote HTML cache and render
    /// pipeline around the same store and cache substrate.
    ///
    /// HTML cached under the previous settings is dropped. The fetcher is
    /// kept, so a new request timeout applies after a restart.
    pub fn reload_settings(&self, settings: Settings) {
        let services = build_services(&self.forms, &self.cache, &self.fetcher, settings);
        let mut guard = self.services.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, services);
        drop(guard);

        previous.remote.invalidate(None);
        info!(endpoint = %self.settings().api_endpoint, "settings reloaded");
    }

    fn read_services<T>(&self, f: impl FnOnce(&Services) -> T) -> T {
        let guard = self.services.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

fn build_services(
    forms: &Arc<CachedFormStore>,
    cache: &Arc<dyn CacheBackend>,
    fetcher: &Arc<dyn FormFetcher>,
    settings: Settings,
) -> Services {
    let remote = Arc::new(RemoteHtmlCache::new(
        fetcher.clone(),
        cache.clone(),
        settings.api_endpoint.clone(),
        settings.html_cache_ttl,
    ));
    let pipeline = Arc::new(RenderPipeline::new(
        forms.clone(),
        remote.clone(),
        settings.clone(),
    ));
    Services {
        settings,
        remote,
        pipeline,
    }
}

/// Errors that can occur when setting up application state.
#[derive(Debug)]
pub enum StateError {
    /// Failed to open or initialize the record store.
    OpenStore { path: String, source: StoreError },
    /// Failed to build the HTTP client.
    Client(RemoteError),
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::OpenStore { path, source } => {
                write!(f, "Failed to open store at '{}': {}", path, source)
            }
            StateError::Client(e) => write!(f, "Failed to create HTTP client: {}", e),
        }
    }
}

impl std::error::Error for StateError {}
