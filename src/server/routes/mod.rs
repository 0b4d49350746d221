//! API routes and handlers.

mod forms;
mod remote;
mod render;

use axum::{
    Router,
    routing::{get, post, put},
};

use super::state::AppState;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/forms", get(forms::list_forms).post(forms::save_form))
        .route("/forms/{id}", get(forms::get_form).delete(forms::delete_form))
        .route("/forms/{id}/duplicate", post(forms::duplicate_form))
        .route("/forms/{id}/status", put(forms::set_status))
        .route("/stats", get(forms::stats))
        .route("/validate-url", post(remote::validate_url))
        .route("/cache/invalidate", post(remote::invalidate_cache));

    Router::new()
        .route("/health", get(health))
        .route("/render", get(render::render_form))
        .nest("/api/v1", api_routes)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}
