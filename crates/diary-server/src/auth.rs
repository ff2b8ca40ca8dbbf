//! Registration, login and the current user

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use diary_core::user::{validate_email, validate_password, validate_username};
use diary_core::{User, UserProfile};
use diary_security::{hash_password, verify_password};

use crate::error::{ApiError, FieldError, Result};
use crate::extract::{ApiJson, CurrentUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

/// POST /api/auth/register - Create an account and sign in
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response> {
    let mut errors = Vec::new();
    let username = collect(&mut errors, validate_username(&req.username));
    let email = collect(&mut errors, validate_email(&req.email));
    collect(&mut errors, validate_password(&req.password));

    let (Some(username), Some(email)) = (username, email) else {
        return Err(ApiError::Validation(errors));
    };
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if state.storage.username_or_email_taken(&username, &email).await? {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let user = User::new(username, email, password_hash);
    state.storage.create_user(&user).await?;
    tracing::info!(user = %user.id, "registered user");

    let body = AuthResponse {
        token: state.tokens.issue(&user.id),
        user: user.profile(),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// POST /api/auth/login - Exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .storage
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password = req.password;
    let stored = user.password_hash.clone();
    let valid =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await??;
    if !valid {
        return Err(invalid_credentials());
    }

    tracing::debug!(user = %user.id, "login");
    Ok(Json(AuthResponse {
        token: state.tokens.issue(&user.id),
        user: user.profile(),
    }))
}

/// GET /api/auth/me - Profile of the token's owner
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.profile())
}

fn collect<T>(errors: &mut Vec<FieldError>, result: diary_core::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(diary_core::CoreError::Validation { field, message }) => {
            errors.push(FieldError { field, message });
            None
        }
        Err(other) => {
            errors.push(FieldError {
                field: "request",
                message: other.to_string(),
            });
            None
        }
    }
}
