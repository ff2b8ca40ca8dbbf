//! User queries

use diary_core::{User, UserId};

use crate::db::{from_millis, to_millis};
use crate::{Result, Storage, StorageError};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: from_millis(row.created_at)?,
        })
    }
}

impl Storage {
    /// Insert a user. Duplicate usernames or emails are a `Conflict`.
    pub async fn create_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(to_millis(user.created_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                let field = if e.message().contains("users.email") {
                    "email"
                } else {
                    "username"
                };
                Err(StorageError::Conflict(format!("{} already registered", field)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Emails are stored lower-cased; lookup is case-insensitive
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Pre-insert check used to give registration a friendly message
    pub async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
        )
        .bind(username)
        .bind(email.trim().to_lowercase())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
