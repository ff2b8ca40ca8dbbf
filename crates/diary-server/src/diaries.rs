//! Diary entry handlers
//!
//! The read paths look an entry up, ask the authorizer, and only on an allow
//! run the content through the redactor.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use diary_core::{
    Contribution, DiaryEntry, DiarySummary, DiaryUpdate, OwnerRef, PublicDiarySummary,
};
use diary_security::{Access, Viewer, authorize, authorize_share, can_modify, count_secret_blocks};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery, CurrentUser, MaybeViewer};
use crate::server::AppState;

pub const DEFAULT_CONTRIBUTION_DAYS: u32 = 365;
pub const MAX_CONTRIBUTION_DAYS: u32 = 366;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiaryRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContributionParams {
    pub days: Option<u32>,
}

/// One of the caller's own entries in a listing
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnDiarySummary {
    #[serde(flatten)]
    pub summary: DiarySummary,
    pub secret_count: usize,
}

impl From<&DiaryEntry> for OwnDiarySummary {
    fn from(entry: &DiaryEntry) -> Self {
        Self {
            summary: entry.summary(),
            secret_count: count_secret_blocks(&entry.content),
        }
    }
}

/// An entry as a reader sees it, content already redacted
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryView {
    pub id: String,
    pub owner: OwnerRef,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub secrets_revealed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiaryMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diary: Option<DiarySummary>,
}

/// Build the reader's view for an allowed access
fn view(state: &AppState, entry: DiaryEntry, access: Access) -> DiaryView {
    let reveal = access.reveals_secrets();
    DiaryView {
        content: state.redactor.redact(&entry.content, reveal),
        id: entry.id,
        owner: entry.owner,
        title: entry.title,
        is_public: entry.is_public,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
        secrets_revealed: reveal,
    }
}

async fn find(state: &AppState, id: &str) -> Result<DiaryEntry> {
    state
        .storage
        .get_diary(id)
        .await?
        .ok_or_else(ApiError::diary_not_found)
}

/// GET /api/diaries - The caller's own entries, newest first
pub async fn list_own(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<OwnDiarySummary>>> {
    let entries = state.storage.list_user_diaries(&user.id, params.limit).await?;
    Ok(Json(entries.iter().map(OwnDiarySummary::from).collect()))
}

/// GET /api/diaries/public - Everyone's public entries
pub async fn list_public(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<PublicDiarySummary>>> {
    Ok(Json(state.storage.list_public_diaries(params.limit).await?))
}

/// GET /api/diaries/search?q= - Search the caller's own entries
pub async fn search(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<OwnDiarySummary>>> {
    if params.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    let entries = state.storage.search_user_diaries(&user.id, &params.q).await?;
    Ok(Json(entries.iter().map(OwnDiarySummary::from).collect()))
}

/// GET /api/diaries/contributions?days= - Entries created per day
pub async fn contributions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<ContributionParams>,
) -> Result<Json<Vec<Contribution>>> {
    let days = params
        .days
        .unwrap_or(DEFAULT_CONTRIBUTION_DAYS)
        .min(MAX_CONTRIBUTION_DAYS);
    let today = OffsetDateTime::now_utc().date();

    Ok(Json(state.storage.contributions(&user.id, days, today).await?))
}

/// GET /api/diaries/share/:id - Share link view; secrets always masked
pub async fn get_shared(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DiaryView>> {
    let entry = find(&state, &id).await?;

    let access = authorize_share((&entry).into());
    if !access.is_allowed() {
        return Err(ApiError::Forbidden("This diary is private".to_string()));
    }

    Ok(Json(view(&state, entry, access)))
}

/// GET /api/diaries/:id - Read an entry as the caller (or anonymously)
pub async fn get(
    State(state): State<AppState>,
    MaybeViewer(viewer): MaybeViewer,
    Path(id): Path<String>,
) -> Result<Json<DiaryView>> {
    let entry = find(&state, &id).await?;

    let access = authorize(&viewer, (&entry).into());
    if !access.is_allowed() {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    Ok(Json(view(&state, entry, access)))
}

/// POST /api/diaries - Create an entry
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateDiaryRequest>,
) -> Result<Response> {
    let entry = DiaryEntry::new(user.id, &req.title, &req.content, req.is_public)?;
    state.storage.create_diary(&entry).await?;
    tracing::info!(diary = %entry.id, "created diary");

    let body = DiaryMessage {
        message: "Diary created successfully".to_string(),
        diary: Some(entry.summary()),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// PUT /api/diaries/:id - Owner-only partial update
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<DiaryUpdate>,
) -> Result<Json<DiaryMessage>> {
    let update = update.validated()?;
    let entry = find(&state, &id).await?;

    if !can_modify(&Viewer::User(user.id), (&entry).into()) {
        return Err(ApiError::Forbidden(
            "Not authorized to update this diary".to_string(),
        ));
    }

    let updated = state
        .storage
        .update_diary(&id, &update, OffsetDateTime::now_utc())
        .await?;

    Ok(Json(DiaryMessage {
        message: "Diary updated successfully".to_string(),
        diary: Some(updated.summary()),
    }))
}

/// DELETE /api/diaries/:id - Owner-only delete
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DiaryMessage>> {
    let entry = find(&state, &id).await?;

    if !can_modify(&Viewer::User(user.id), (&entry).into()) {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this diary".to_string(),
        ));
    }

    state.storage.delete_diary(&id).await?;
    tracing::info!(diary = %id, "deleted diary");

    Ok(Json(DiaryMessage {
        message: "Diary deleted successfully".to_string(),
        diary: None,
    }))
}
