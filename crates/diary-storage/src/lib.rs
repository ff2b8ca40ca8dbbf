//! Storage layer for kokodiary
//!
//! This crate provides:
//! - SQLite connection setup and migrations
//! - User and diary entry queries
//! - Listing, search and contribution aggregation

pub mod db;
pub mod diaries;
pub mod error;
pub mod users;

pub use db::Storage;
pub use error::{Result, StorageError};
