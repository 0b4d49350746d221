//! Remote form handlers: URL validation and HTML cache invalidation.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::remote::{extract_external_id, validate_remote_form};

use super::super::{auth::Authorized, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ValidateUrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateUrlResponse {
    pub form_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct InvalidateRequest {
    /// External form ID; absent clears every cached form.
    #[serde(default)]
    pub form_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}

/// Extract the form ID from a digest URL and check the form is usable.
pub async fn validate_url(
    State(state): State<AppState>,
    _auth: Authorized,
    Json(request): Json<ValidateUrlRequest>,
) -> Result<Json<ValidateUrlResponse>, ApiError> {
    let form_id = extract_external_id(&request.url).ok_or_else(ApiError::invalid_form_url)?;

    let endpoint = state.settings().api_endpoint;
    let status = validate_remote_form(state.fetcher(), &endpoint, &form_id).await;

    if !status.exists {
        return Err(ApiError::remote_form_not_found(&form_id));
    }
    if !status.has_valid_html {
        return Err(ApiError::remote_form_incomplete(&form_id));
    }

    Ok(Json(ValidateUrlResponse { form_id }))
}

/// Drop cached remote HTML for one form or for all of them.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    _auth: Authorized,
    Json(request): Json<InvalidateRequest>,
) -> Json<InvalidateResponse> {
    let form_id = request
        .form_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let removed = state.remote().invalidate(form_id);
    Json(InvalidateResponse { removed })
}
