//! Diary entry queries

use std::collections::BTreeMap;

use diary_core::{
    Contribution, DiaryEntry, DiaryUpdate, OwnerRef, PublicDiarySummary, UserId, UserSummary,
};
use time::{Date, Duration, OffsetDateTime};

use crate::db::{from_millis, to_millis};
use crate::{Result, Storage, StorageError};

/// Upper bound on distinct search terms considered per query
pub const MAX_SEARCH_TERMS: usize = 16;

#[derive(sqlx::FromRow)]
struct DiaryRow {
    id: String,
    user_id: String,
    username: String,
    title: String,
    content: String,
    is_public: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<DiaryRow> for DiaryEntry {
    type Error = StorageError;

    fn try_from(row: DiaryRow) -> Result<Self> {
        Ok(DiaryEntry {
            id: row.id,
            owner: OwnerRef::Expanded(UserSummary {
                id: UserId::new(row.user_id),
                username: row.username,
            }),
            title: row.title,
            content: row.content,
            is_public: row.is_public,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

/// One of a user's own entries; the owner stays a bare id
#[derive(sqlx::FromRow)]
struct OwnedRow {
    id: String,
    user_id: String,
    title: String,
    content: String,
    is_public: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OwnedRow> for DiaryEntry {
    type Error = StorageError;

    fn try_from(row: OwnedRow) -> Result<Self> {
        Ok(DiaryEntry {
            id: row.id,
            owner: OwnerRef::Id(UserId::new(row.user_id)),
            title: row.title,
            content: row.content,
            is_public: row.is_public,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PublicRow {
    id: String,
    user_id: String,
    username: String,
    title: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PublicRow> for PublicDiarySummary {
    type Error = StorageError;

    fn try_from(row: PublicRow) -> Result<Self> {
        Ok(PublicDiarySummary {
            id: row.id,
            title: row.title,
            owner: UserSummary {
                id: UserId::new(row.user_id),
                username: row.username,
            },
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

/// SQLite treats a negative LIMIT as "no limit"
fn limit_value(limit: Option<u32>) -> i64 {
    limit.map_or(-1, i64::from)
}

impl Storage {
    pub async fn create_diary(&self, entry: &DiaryEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO diaries (id, user_id, title, content, is_public, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.owner_id().as_str())
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.is_public)
        .bind(to_millis(entry.created_at))
        .bind(to_millis(entry.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch an entry with its owner expanded
    pub async fn get_diary(&self, id: &str) -> Result<Option<DiaryEntry>> {
        let row: Option<DiaryRow> = sqlx::query_as(
            r#"
            SELECT d.id, d.user_id, u.username, d.title, d.content, d.is_public,
                   d.created_at, d.updated_at
            FROM diaries d
            JOIN users u ON u.id = d.user_id
            WHERE d.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DiaryEntry::try_from).transpose()
    }

    /// Apply a partial update. Ownership must be checked by the caller.
    pub async fn update_diary(
        &self,
        id: &str,
        update: &DiaryUpdate,
        now: OffsetDateTime,
    ) -> Result<DiaryEntry> {
        let mut entry = self
            .get_diary(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("diary {}", id)))?;

        if update.apply(&mut entry, now) {
            sqlx::query(
                r#"
                UPDATE diaries
                SET title = ?1, content = ?2, is_public = ?3, updated_at = ?4
                WHERE id = ?5
                "#,
            )
            .bind(&entry.title)
            .bind(&entry.content)
            .bind(entry.is_public)
            .bind(to_millis(entry.updated_at))
            .bind(&entry.id)
            .execute(&self.pool)
            .await?;
        }

        Ok(entry)
    }

    pub async fn delete_diary(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM diaries WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("diary {}", id)));
        }
        Ok(())
    }

    /// A user's own entries, newest first
    pub async fn list_user_diaries(
        &self,
        user: &UserId,
        limit: Option<u32>,
    ) -> Result<Vec<DiaryEntry>> {
        let rows: Vec<OwnedRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, content, is_public, created_at, updated_at
            FROM diaries
            WHERE user_id = ?1
            ORDER BY created_at DESC, id
            LIMIT ?2
            "#,
        )
        .bind(user.as_str())
        .bind(limit_value(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DiaryEntry::try_from).collect()
    }

    /// Everyone's public entries, newest first
    pub async fn list_public_diaries(&self, limit: Option<u32>) -> Result<Vec<PublicDiarySummary>> {
        let rows: Vec<PublicRow> = sqlx::query_as(
            r#"
            SELECT d.id, d.user_id, u.username, d.title, d.created_at, d.updated_at
            FROM diaries d
            JOIN users u ON u.id = d.user_id
            WHERE d.is_public = 1
            ORDER BY d.created_at DESC, d.id
            LIMIT ?1
            "#,
        )
        .bind(limit_value(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PublicDiarySummary::try_from).collect()
    }

    /// Search a user's own entries.
    ///
    /// The query is split on whitespace; an entry matches when any term occurs
    /// in its title or content (case-insensitive). Results are ranked by
    /// matching terms, title hits weighing double, then newest first.
    pub async fn search_user_diaries(&self, user: &UserId, query: &str) -> Result<Vec<DiaryEntry>> {
        let terms = search_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // SQLite's lower() only folds ASCII, so matching happens here
        let rows: Vec<OwnedRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, content, is_public, created_at, updated_at
            FROM diaries
            WHERE user_id = ?1
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut scored = Vec::new();
        for row in rows {
            let score = score(&terms, &row.title, &row.content);
            if score > 0 {
                scored.push((score, DiaryEntry::try_from(row)?));
            }
        }
        scored.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(scored.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Per-day creation counts for the `days` days ending with `today` (UTC),
    /// zero-filled, oldest first
    pub async fn contributions(
        &self,
        user: &UserId,
        days: u32,
        today: Date,
    ) -> Result<Vec<Contribution>> {
        if days == 0 {
            return Ok(Vec::new());
        }

        let first = today - Duration::days(i64::from(days) - 1);
        let start = first.midnight().assume_utc();
        let end = today.midnight().assume_utc() + Duration::days(1);

        let created: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT created_at
            FROM diaries
            WHERE user_id = ?1 AND created_at >= ?2 AND created_at < ?3
            "#,
        )
        .bind(user.as_str())
        .bind(to_millis(start))
        .bind(to_millis(end))
        .fetch_all(&self.pool)
        .await?;

        let mut counts: BTreeMap<Date, u32> = BTreeMap::new();
        let mut day = first;
        while day <= today {
            counts.insert(day, 0);
            day = day + Duration::days(1);
        }
        for (ms,) in created {
            let date = from_millis(ms)?.date();
            if let Some(count) = counts.get_mut(&date) {
                *count += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(date, count)| Contribution { date, count })
            .collect())
    }
}

fn search_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.split_whitespace().map(str::to_lowercase) {
        if !terms.contains(&term) {
            terms.push(term);
        }
        if terms.len() == MAX_SEARCH_TERMS {
            break;
        }
    }
    terms
}

fn score(terms: &[String], title: &str, content: &str) -> u32 {
    let title = title.to_lowercase();
    let content = content.to_lowercase();
    terms
        .iter()
        .map(|term| {
            let mut s = 0;
            if title.contains(term.as_str()) {
                s += 2;
            }
            if content.contains(term.as_str()) {
                s += 1;
            }
            s
        })
        .sum()
}
