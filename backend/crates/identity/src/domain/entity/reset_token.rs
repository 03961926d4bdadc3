//! Reset Token Entity
//!
//! Single-use, time-bounded secret enabling password recovery. A token is
//! valid iff its row exists and is unexpired; redemption deletes the row,
//! so a consumed or expired token is indistinguishable from one that never
//! existed.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::email::Email;

/// Token entropy in bytes (hex-encoded to twice this length)
pub const RESET_TOKEN_BYTES: usize = 32;

/// Validity window from issuance
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

/// Reset token entity
#[derive(Debug, Clone)]
pub struct ResetToken {
    /// Target account email
    pub email: Email,
    /// High-entropy opaque secret (64 hex characters)
    pub token: String,
    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Issue a fresh token for an email: 256 random bits, 1-hour expiry.
    pub fn issue(email: Email) -> Self {
        Self {
            email,
            token: platform::crypto::random_hex(RESET_TOKEN_BYTES),
            expires_at: Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
