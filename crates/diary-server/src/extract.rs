//! Request extractors: bearer auth and JSON-error wrappers

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use diary_core::User;
use diary_security::Viewer;

use crate::error::ApiError;
use crate::server::AppState;

/// `Json` whose rejection is an [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection is an [`ApiError`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// An authenticated user; the request fails with 401 without one
pub struct CurrentUser(pub User);

/// Whoever is asking. A missing credential is anonymous, a bad one is a 401.
pub struct MaybeViewer(pub Viewer);

/// The bearer token, if an Authorization header is present
fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| Some(token.trim()))
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)?.ok_or_else(|| {
            ApiError::Unauthorized("Authentication required. No token provided.".to_string())
        })?;
        let id = state.tokens.verify(token)?;

        let user = state
            .storage
            .get_user(&id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(CurrentUser(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeViewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let id = bearer_token(parts)?
            .map(|token| state.tokens.verify(token))
            .transpose()?;
        Ok(MaybeViewer(Viewer::from(id)))
    }
}
