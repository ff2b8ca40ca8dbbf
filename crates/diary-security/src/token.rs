//! Stateless bearer session tokens
//!
//! Format: `<user_id>.<expires_unix>.<mac_hex>`, where the MAC is a BLAKE3
//! keyed hash of `<user_id>.<expires_unix>` under a key derived from the
//! server secret. Comparing `blake3::Hash` values is constant time.

use diary_core::UserId;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

const KEY_CONTEXT: &str = "kokodiary 2025 session token v1";

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// Longest lifetime a deployment may configure
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

/// Issues and verifies session tokens
pub struct TokenSigner {
    key: [u8; 32],
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &UserId) -> String {
        self.issue_at(user, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user: &UserId, now: OffsetDateTime) -> String {
        let expires = now.saturating_add(self.ttl).unix_timestamp();
        let claims = format!("{}.{}", user, expires);
        let mac = blake3::keyed_hash(&self.key, claims.as_bytes());
        format!("{}.{}", claims, mac.to_hex())
    }

    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<UserId, TokenError> {
        let (claims, mac_hex) = token.trim().rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (user, expires) = claims.rsplit_once('.').ok_or(TokenError::Malformed)?;
        if user.is_empty() {
            return Err(TokenError::Malformed);
        }
        let expires: i64 = expires.parse().map_err(|_| TokenError::Malformed)?;
        let mac = blake3::Hash::from_hex(mac_hex).map_err(|_| TokenError::Malformed)?;

        if mac != blake3::keyed_hash(&self.key, claims.as_bytes()) {
            return Err(TokenError::BadSignature);
        }
        if now.unix_timestamp() >= expires {
            return Err(TokenError::Expired);
        }

        Ok(UserId::new(user))
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", Duration::days(DEFAULT_TOKEN_TTL_DAYS))
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = signer();
        let user = UserId::generate();
        let token = signer.issue(&user);

        assert_eq!(signer.verify(&token).unwrap(), user);
    }

    #[test]
    fn test_tampered_token() {
        let signer = signer();
        let token = signer.issue(&UserId::new("u1"));
        let forged = token.replacen("u1", "u2", 1);

        assert_eq!(signer.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = signer().issue(&UserId::new("u1"));
        let other = TokenSigner::new("other-secret", Duration::days(1));

        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_expired_token() {
        let signer = signer();
        let issued = OffsetDateTime::now_utc() - Duration::days(31);
        let token = signer.issue_at(&UserId::new("u1"), issued);

        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
        assert!(
            signer
                .verify_at(&token, issued + Duration::days(29))
                .is_ok()
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let signer = signer();
        for token in ["", "abc", "u1.notanumber.00", ".123.00", "u1.123.zz"] {
            assert_eq!(signer.verify(token), Err(TokenError::Malformed), "{token}");
        }
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let signer = TokenSigner::new("s", Duration::days(i64::from(u32::MAX)));
        let token = signer.issue(&UserId::new("u1"));

        assert_eq!(signer.verify(&token).unwrap(), UserId::new("u1"));
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", signer());
        assert!(rendered.contains("<redacted>"));
    }
}
