//! Password Hashing and Verification
//!
//! Argon2id hashing in PHC string format, with:
//! - Zeroization of clear-text material
//! - Constant-time verification
//! - PHC-format detection, so callers can tell a digest apart from a
//!   legacy plain-text credential still present in the store
//!
//! The platform deliberately imposes no strength policy; the only input
//! rule is that a password is non-empty. Stored plain-text credentials are
//! compared byte-exact, so no normalization is applied on input.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Error Types
// ============================================================================

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Password input is empty
    #[error("Password cannot be empty")]
    Empty,

    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid digest format
    #[error("Invalid password digest format")]
    InvalidDigestFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Ensures password material is erased from memory when the value is
/// dropped.
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password.
    ///
    /// The only rule is non-empty; length and composition are the caller's
    /// concern (the store carries legacy credentials of arbitrary shape).
    pub fn new(raw: String) -> Result<Self, PasswordError> {
        if raw.is_empty() {
            return Err(PasswordError::Empty);
        }
        Ok(Self(raw))
    }

    /// Get the password as bytes for hashing/comparison
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password using Argon2id
    ///
    /// ## Returns
    /// PHC-formatted hash string wrapped in [`PasswordDigest`]
    pub fn hash(&self) -> Result<PasswordDigest, PasswordError> {
        // Random 128-bit salt per digest
        let salt = SaltString::generate(OsRng);

        // OWASP recommended Argon2id parameters:
        // m=19456 (19 MiB), t=2, p=1
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(self.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(PasswordDigest {
            digest: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Password Digest (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// Stores the Argon2id hash in PHC format, which includes the algorithm
/// identifier, version, parameters, salt, and hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    digest: String,
}

impl PasswordDigest {
    /// Create from a PHC string (e.g., from the database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordError> {
        let digest = s.into();

        // Validate it's a valid PHC string
        PasswordHash::new(&digest).map_err(|_| PasswordError::InvalidDigestFormat)?;

        Ok(Self { digest })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.digest
    }

    /// Verify a password against this digest
    ///
    /// Argon2 performs the comparison in constant time.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        let parsed_hash = match PasswordHash::new(&self.digest) {
            Ok(h) => h,
            Err(_) => return false,
        };

        let argon2 = Argon2::default();

        argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordDigest")
            .field("digest", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Format detection
// ============================================================================

/// Check whether a stored credential value is a recognized PHC digest.
///
/// Anything that does not parse as a PHC string is treated as a legacy
/// plain-text credential by callers.
pub fn looks_like_digest(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}

// ============================================================================
// Tests
// ============================================================================
