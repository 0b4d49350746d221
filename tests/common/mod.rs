//! Common test utilities and fixtures.
//!
//! Shared constants, a stub remote API and the [`TestApp`] fixture used by
//! the HTTP integration tests.

#![cfg(feature = "server")]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;

use formshive::remote::{FetchResponse, FormFetcher, RemoteError};
use formshive::server::{
    AppState, AuthConfig, Config, CorsConfig, LoggingConfig, RemoteConfig, RenderConfig,
    ServerConfig, StoreConfig, router,
};

// =============================================================================
// Form IDs
// =============================================================================

/// Form the stub API serves with fields configured.
pub const READY_FORM_ID: &str = "2ce22659-397b-412c-abe8-a64ce53dc4a0";

/// Form the stub API serves without fields configured.
pub const INCOMPLETE_FORM_ID: &str = "7d0f5a1e-8a41-4b7c-9d0e-1f2a3b4c5d6e";

/// Form the stub API does not know.
pub const MISSING_FORM_ID: &str = "00000000-0000-4000-8000-000000000000";

pub const ENDPOINT: &str = "https://api.example.com/v1";

pub const TOKEN: &str = "test-token";

// =============================================================================
// Stub Remote API
// =============================================================================

/// In-memory stand-in for the Formshive HTML endpoint.
///
/// Serves a page per known form ID and 404 for everything else, recording
/// every requested URL.
#[derive(Default)]
pub struct StubApi {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StubApi {
    pub fn new() -> Self {
        let mut pages = HashMap::new();
        pages.insert(
            READY_FORM_ID.to_string(),
            "<html><head><title>Contact us</title></head><body><form>ready</form></body></html>"
                .to_string(),
        );
        pages.insert(
            INCOMPLETE_FORM_ID.to_string(),
            "<html><head><title>Form Check Specs Required</title></head></html>".to_string(),
        );
        Self {
            pages,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FormFetcher for StubApi {
    async fn get(&self, url: &str) -> Result<FetchResponse, RemoteError> {
        self.requests.lock().unwrap().push(url.to_string());
        let page = self
            .pages
            .iter()
            .find(|(id, _)| url.contains(&format!("/forms/{}/html", id)))
            .map(|(_, page)| page.clone());
        Ok(match page {
            Some(page) => FetchResponse::new(200, page),
            None => FetchResponse::new(404, "not found"),
        })
    }
}

// =============================================================================
// Test Application
// =============================================================================

/// Test application wrapper that manages a temporary store.
pub struct TestApp {
    pub server: TestServer,
    pub api: Arc<StubApi>,
    pub state: AppState,
    _temp_dir: TempDir, // Keep alive for test duration
}

impl TestApp {
    /// Create a new test application with a fresh store and no auth token.
    pub fn new() -> anyhow::Result<Self> {
        Self::build(None)
    }

    /// Create a test application that requires [`TOKEN`] on write routes.
    pub fn with_auth() -> anyhow::Result<Self> {
        Self::build(Some(TOKEN.to_string()))
    }

    fn build(token: Option<String>) -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let store_path = temp_dir.path().join("store");
        let config = Config {
            server: ServerConfig {
                bind: "127.0.0.1".into(),
                port: 0,
            },
            store: StoreConfig {
                path: store_path.to_string_lossy().into(),
            },
            remote: RemoteConfig {
                endpoint: ENDPOINT.into(),
                ..RemoteConfig::default()
            },
            render: RenderConfig::default(),
            auth: AuthConfig { token },
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        };

        let api = Arc::new(StubApi::new());
        let state = AppState::with_fetcher(&config, api.clone())?;
        let server = TestServer::new(router(state.clone()))?;
        Ok(Self {
            server,
            api,
            state,
            _temp_dir: temp_dir,
        })
    }

    /// Save a form through the API and return its id.
    pub async fn save_form(&self, body: Value) -> u64 {
        let response = self.server.post("/api/v1/forms").json(&body).await;
        response.assert_status_ok();
        response.json::<Value>()["form_id"].as_u64().unwrap()
    }

    /// Save an embedded form pointing at `form_id`.
    pub async fn save_embed(&self, name: &str, form_id: &str) -> u64 {
        self.save_form(json!({
            "name": name,
            "form_id": form_id,
            "type": "embed",
            "framework": "bootstrap",
        }))
        .await
    }

    /// Save a created contact form with two fields.
    pub async fn save_contact(&self, name: &str) -> u64 {
        self.save_form(json!({
            "name": name,
            "form_id": READY_FORM_ID,
            "type": "create",
            "form_data": {
                "fields": [
                    { "type": "text", "name": "name", "label": "Name", "required": true },
                    { "type": "select", "name": "topic", "placeholder": "Pick one",
                      "options": [
                          { "value": "sales", "label": "Sales" },
                          { "value": "support", "label": "Support" }
                      ] }
                ],
                "submit_text": "Send"
            }
        }))
        .await
    }
}
