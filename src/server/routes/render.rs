//! Public render endpoint.

use axum::{
    extract::{Query, State},
    response::Html,
};

use crate::render::RenderAttributes;

use super::super::state::AppState;

/// Render a form as an HTML fragment. Lookup and load failures render as an
/// error fragment with status 200, like any other markup.
pub async fn render_form(
    State(state): State<AppState>,
    Query(attrs): Query<RenderAttributes>,
) -> Html<String> {
    let pipeline = state.pipeline();
    Html(pipeline.render_attributes(&attrs).await.into_string())
}
