//! Application Configuration
//!
//! Configuration for the identity application layer. Built once at process
//! start, treated as immutable, and passed explicitly via `Arc`; there is
//! no hidden global state.

use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Secret key for HMAC-SHA256 token signing (32 bytes)
    pub token_secret: [u8; 32],
    /// Session token validity window (24 hours)
    pub token_ttl: Duration,
    /// Session cookie name
    pub cookie_name: String,
    /// Whether to require Secure cookie (off only in local development)
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// From address for outbound recovery mail
    pub mail_from: String,
    /// Base URL embedded in recovery links
    pub reset_link_base: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            token_ttl: Duration::from_secs(24 * 3600),
            cookie_name: "token".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            mail_from: "noreply@localhost".to_string(),
            reset_link_base: "http://localhost:40922/reset-password".to_string(),
        }
    }
}

impl IdentityConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Cookie configuration matching the token lifetime
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.token_ttl.as_secs() as i64),
        }
    }
}
