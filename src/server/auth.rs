//! Bearer token guard for write and admin routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::logging::debug;

use super::{error::ApiError, state::AppState};

/// Extractor that admits the request when no token is configured, or when
/// it carries `Authorization: Bearer <token>` with the configured token.
pub struct Authorized;

impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.auth_token() else {
            return Ok(Authorized);
        };

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    debug!(path = %parts.uri.path(), "missing bearer token");
                    ApiError::unauthorized()
                })?;

        if bearer.token() == expected {
            Ok(Authorized)
        } else {
            debug!(path = %parts.uri.path(), "rejected bearer token");
            Err(ApiError::unauthorized())
        }
    }
}
