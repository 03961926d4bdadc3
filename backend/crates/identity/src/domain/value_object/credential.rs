//! Stored Credential Value Object
//!
//! The store carries passwords in two forms at once: Argon2id PHC digests
//! (written by the reset-password flow) and legacy plain text (written at
//! registration, predating the digest migration). Verification dispatches
//! on the stored form; both paths must keep working until an explicit
//! migration retires the plain form.

use std::fmt;

use platform::crypto::constant_time_eq;
use platform::password::{ClearTextPassword, PasswordDigest, looks_like_digest};

/// A stored password credential, tagged by its storage form.
#[derive(Clone, PartialEq, Eq)]
pub enum StoredCredential {
    /// Argon2id digest in PHC string format
    Digest(PasswordDigest),
    /// Legacy plain-text credential, compared byte-exact
    Plaintext(String),
}

impl StoredCredential {
    /// Classify a stored column value by format.
    ///
    /// Anything that parses as a PHC string is a digest; everything else is
    /// a legacy plain-text credential.
    pub fn from_stored(stored: String) -> Self {
        if looks_like_digest(&stored) {
            match PasswordDigest::from_phc_string(&stored) {
                Ok(digest) => Self::Digest(digest),
                Err(_) => Self::Plaintext(stored),
            }
        } else {
            Self::Plaintext(stored)
        }
    }

    /// Verify a candidate password against the stored form.
    pub fn verify(&self, candidate: &ClearTextPassword) -> bool {
        match self {
            Self::Digest(digest) => digest.verify(candidate),
            Self::Plaintext(stored) => constant_time_eq(stored.as_bytes(), candidate.as_bytes()),
        }
    }

    /// The column value to persist.
    pub fn as_stored_str(&self) -> &str {
        match self {
            Self::Digest(digest) => digest.as_phc_string(),
            Self::Plaintext(stored) => stored,
        }
    }

    pub fn is_digest(&self) -> bool {
        matches!(self, Self::Digest(_))
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(_) => f.debug_tuple("StoredCredential::Digest").field(&"[HASH]").finish(),
            Self::Plaintext(_) => f
                .debug_tuple("StoredCredential::Plaintext")
                .field(&"[REDACTED]")
                .finish(),
        }
    }
}
