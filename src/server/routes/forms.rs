//! Form record handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::{FormCandidate, FormData, FormRecord, FormStats, FormStatus};
use crate::logging::info;

use super::super::{auth::Authorized, error::ApiError, state::AppState};

/// Query parameters for listing forms.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    /// `active` (default), `inactive` or `all`.
    pub status: Option<String>,
}

/// A form as the API presents it.
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub id: u64,
    pub name: String,
    pub form_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub framework: String,
    pub form_data: FormData,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FormRecord> for FormResponse {
    fn from(record: FormRecord) -> Self {
        Self {
            form_data: record.form_data(),
            id: record.id,
            name: record.name,
            form_id: record.external_form_id,
            kind: record.kind.to_string(),
            framework: record.framework.to_string(),
            status: record.status.to_string(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Body of a save request. A missing or zero `id` inserts.
#[derive(Debug, Deserialize, Default)]
pub struct SaveFormRequest {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub form_id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub framework: Option<String>,
    /// Either an object or a JSON-encoded string of one.
    #[serde(default)]
    pub form_data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct SaveFormResponse {
    pub form_id: u64,
}

#[derive(Debug, Serialize)]
pub struct DuplicateFormResponse {
    pub new_form_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// List forms, newest first.
pub async fn list_forms(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FormResponse>>, ApiError> {
    let filter = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("active") => Some(FormStatus::Active),
        Some("inactive") => Some(FormStatus::Inactive),
        Some("all") => None,
        Some(other) => return Err(ApiError::invalid_status(other)),
    };

    let records = state.forms().list(filter)?;
    Ok(Json(records.into_iter().map(FormResponse::from).collect()))
}

/// Insert or update a form.
pub async fn save_form(
    State(state): State<AppState>,
    _auth: Authorized,
    Json(request): Json<SaveFormRequest>,
) -> Result<Json<SaveFormResponse>, ApiError> {
    let form_data = parse_form_data(request.form_data)?;
    let framework = request
        .framework
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| state.settings().default_framework.to_string());
    let candidate = FormCandidate {
        name: request.name,
        external_form_id: request.form_id,
        kind: request.kind,
        framework: Some(framework),
        form_data,
    };

    let id = match request.id.filter(|id| *id > 0) {
        None => state.forms().insert(&candidate)?,
        Some(id) => {
            if !state.forms().update(id, &candidate)? {
                return Err(ApiError::form_not_found(id));
            }
            id
        }
    };

    Ok(Json(SaveFormResponse { form_id: id }))
}

/// Get a form by id.
pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<FormResponse>, ApiError> {
    let record = state
        .forms()
        .get(id)?
        .ok_or_else(|| ApiError::form_not_found(id))?;
    Ok(Json(record.into()))
}

/// Delete a form.
pub async fn delete_form(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    if state.forms().delete(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::form_not_found(id))
    }
}

/// Copy a form under a new id, suffixing its name.
pub async fn duplicate_form(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(id): Path<u64>,
) -> Result<Json<DuplicateFormResponse>, ApiError> {
    let record = state
        .forms()
        .get(id)?
        .ok_or_else(|| ApiError::form_not_found(id))?;

    let mut candidate = record.to_candidate();
    candidate.name = format!("{} (Copy)", record.name);
    let new_id = state.forms().insert(&candidate)?;

    info!(source = id, new_id = new_id, "form duplicated");
    Ok(Json(DuplicateFormResponse { new_form_id: new_id }))
}

/// Activate or deactivate a form.
pub async fn set_status(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(id): Path<u64>,
    Json(request): Json<StatusRequest>,
) -> Result<StatusCode, ApiError> {
    let status =
        FormStatus::parse(&request.status).ok_or_else(|| ApiError::invalid_status(&request.status))?;

    if state.forms().set_status(id, status)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::form_not_found(id))
    }
}

/// Aggregate counts.
pub async fn stats(State(state): State<AppState>) -> Result<Json<FormStats>, ApiError> {
    Ok(Json(state.forms().stats()?))
}

fn parse_form_data(value: Option<serde_json::Value>) -> Result<FormData, ApiError> {
    let value = match value {
        None | Some(serde_json::Value::Null) => return Ok(FormData::default()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            return Ok(FormData::default());
        }
        Some(serde_json::Value::String(s)) => serde_json::from_str(&s)
            .map_err(|e| ApiError::invalid_form_data(format!("form_data is not valid JSON: {}", e)))?,
        Some(value) => value,
    };

    FormData::from_value(value)
        .map_err(|e| ApiError::invalid_form_data(format!("Invalid form_data: {}", e)))
}
