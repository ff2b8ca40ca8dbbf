//! Core domain models for kokodiary
//!
//! This crate contains:
//! - Identity types (UserId, OwnerRef)
//! - Domain models (User, DiaryEntry) and their projections
//! - Input validation shared by every surface

pub mod diary;
pub mod error;
pub mod id;
pub mod user;

pub use diary::{Contribution, DiaryEntry, DiarySummary, DiaryUpdate, PublicDiarySummary};
pub use error::{CoreError, Result};
pub use id::{OwnerRef, UserId, UserSummary};
pub use user::{User, UserProfile};
