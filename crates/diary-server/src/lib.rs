//! HTTP API for kokodiary
//!
//! REST endpoints over axum. Every entry read goes through the authorizer
//! and, when allowed, the redactor before content leaves the server.

pub mod auth;
pub mod diaries;
pub mod error;
pub mod extract;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, DiaryServer};
