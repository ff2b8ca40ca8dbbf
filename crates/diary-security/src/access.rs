//! Visibility and ownership decisions
//!
//! Stateless: each call looks only at its arguments. Callers turn
//! [`Access::Deny`] into an HTTP error and pass [`Access::reveals_secrets`]
//! to the redactor for the other two outcomes.

use diary_core::{DiaryEntry, OwnerRef, UserId};

/// Outcome of an access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    AllowFull,
    AllowRedacted,
    Deny,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Access::Deny)
    }

    pub fn reveals_secrets(self) -> bool {
        matches!(self, Access::AllowFull)
    }
}

/// Who is asking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(UserId),
}

impl Viewer {
    pub fn id(&self) -> Option<&UserId> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(id),
        }
    }

    fn owns(&self, entry: &Visibility<'_>) -> bool {
        self.id().is_some_and(|id| entry.owner.is(id))
    }
}

impl From<Option<UserId>> for Viewer {
    fn from(id: Option<UserId>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::User)
    }
}

/// The two entry attributes access decisions depend on
#[derive(Debug, Clone, Copy)]
pub struct Visibility<'a> {
    pub owner: &'a OwnerRef,
    pub is_public: bool,
}

impl<'a> Visibility<'a> {
    pub fn new(owner: &'a OwnerRef, is_public: bool) -> Self {
        Self { owner, is_public }
    }
}

impl<'a> From<&'a DiaryEntry> for Visibility<'a> {
    fn from(entry: &'a DiaryEntry) -> Self {
        Self::new(&entry.owner, entry.is_public)
    }
}

/// Read access for the regular (authenticated or anonymous) path
pub fn authorize(viewer: &Viewer, entry: Visibility<'_>) -> Access {
    if viewer.owns(&entry) {
        Access::AllowFull
    } else if entry.is_public {
        Access::AllowRedacted
    } else {
        Access::Deny
    }
}

/// Read access for share links. Never reveals secrets, not even to the owner.
pub fn authorize_share(entry: Visibility<'_>) -> Access {
    if entry.is_public {
        Access::AllowRedacted
    } else {
        Access::Deny
    }
}

/// Update and delete are owner-only
pub fn can_modify(viewer: &Viewer, entry: Visibility<'_>) -> bool {
    viewer.owns(&entry)
}
