//! Access control for diary entries
//!
//! - Secret spoiler redaction
//! - Visibility/ownership decisions
//! - Password hashing and bearer session tokens

pub mod access;
pub mod password;
pub mod redactor;
pub mod token;

use thiserror::Error;

pub use access::{Access, Viewer, Visibility, authorize, authorize_share, can_modify};
pub use password::{hash_password, verify_password};
pub use redactor::{Redactor, count_secret_blocks, redact};
pub use token::{MAX_TOKEN_TTL_DAYS, TokenError, TokenSigner};

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type Result<T> = std::result::Result<T, SecurityError>;
