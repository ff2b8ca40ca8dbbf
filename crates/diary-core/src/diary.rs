//! Diary entry domain model

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::id::{OwnerRef, UserId, UserSummary};
use crate::{CoreError, Result};

pub const TITLE_MAX_CHARS: usize = 200;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A diary entry owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub owner: OwnerRef,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl DiaryEntry {
    /// Create a new entry, validating title and content
    pub fn new(owner: UserId, title: &str, content: &str, is_public: bool) -> Result<Self> {
        let title = validate_title(title)?;
        let content = validate_content(content)?;
        let now = OffsetDateTime::now_utc();

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: OwnerRef::Id(owner),
            title,
            content,
            is_public,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn owner_id(&self) -> &UserId {
        self.owner.id()
    }

    pub fn summary(&self) -> DiarySummary {
        DiarySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            is_public: self.is_public,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update of an entry; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl DiaryUpdate {
    /// Normalize and check the fields that are present
    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            title: self.title.as_deref().map(validate_title).transpose()?,
            content: self.content.as_deref().map(validate_content).transpose()?,
            is_public: self.is_public,
        })
    }

    /// Apply to an entry. Returns whether anything changed; `updated_at` only
    /// moves when it did.
    pub fn apply(&self, entry: &mut DiaryEntry, now: OffsetDateTime) -> bool {
        let mut changed = false;

        if let Some(title) = &self.title
            && *title != entry.title
        {
            entry.title = title.clone();
            changed = true;
        }
        if let Some(content) = &self.content
            && *content != entry.content
        {
            entry.content = content.clone();
            changed = true;
        }
        if let Some(is_public) = self.is_public
            && is_public != entry.is_public
        {
            entry.is_public = is_public;
            changed = true;
        }

        if changed {
            entry.updated_at = now;
        }
        changed
    }
}

/// Listing projection of one of the caller's own entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiarySummary {
    pub id: String,
    pub title: String,
    pub is_public: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Listing projection of someone's public entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDiarySummary {
    pub id: String,
    pub title: String,
    pub owner: UserSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Number of entries a user created on one UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub count: u32,
}

pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(CoreError::validation("title", "title is required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(CoreError::validation(
            "title",
            format!("title cannot exceed {} characters", TITLE_MAX_CHARS),
        ));
    }
    Ok(title.to_string())
}

pub fn validate_content(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(CoreError::validation("content", "content is required"));
    }
    Ok(raw.to_string())
}
