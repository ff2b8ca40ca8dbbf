//! Identity types
//!
//! Every ownership check compares [`UserId`] values. An entry's owner may
//! arrive as a bare identifier or as an expanded user object; [`OwnerRef::id`]
//! is the single place that extracts the identifier from either shape.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical user identifier (trimmed, ASCII lower-case)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

/// Minimal user projection used when an owner reference is expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

/// Owner of an entry, either bare or joined with the user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(UserId),
    Expanded(UserSummary),
}

impl OwnerRef {
    pub fn id(&self) -> &UserId {
        match self {
            OwnerRef::Id(id) => id,
            OwnerRef::Expanded(user) => &user.id,
        }
    }

    pub fn is(&self, other: &UserId) -> bool {
        self.id() == other
    }
}

impl From<UserId> for OwnerRef {
    fn from(id: UserId) -> Self {
        OwnerRef::Id(id)
    }
}

impl From<UserSummary> for OwnerRef {
    fn from(user: UserSummary) -> Self {
        OwnerRef::Expanded(user)
    }
}
