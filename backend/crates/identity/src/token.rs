//! Token Issuer
//!
//! Stateless session tokens: HMAC-SHA256 signed JWTs carrying the account
//! identity claims. Possession of a token with a valid signature and an
//! unexpired timestamp is sufficient proof of authentication; there is no
//! server-side session row and no revocation list.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entity::account::Account;
use crate::error::{IdentityError, IdentityResult};

/// Session token claims
///
/// Exactly the account identity set: id, email, role, admin flag, plus the
/// standard time fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Build the claim set for an account with the given validity window.
    pub fn for_account(account: &Account, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: account.account_id.to_string(),
            email: account.email.to_string(),
            role: account.role.code().to_string(),
            is_admin: account.is_admin,
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }
}

/// Issues and verifies session tokens (HS256 over the server secret).
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a session token for an authenticated account.
    pub fn issue(&self, account: &Account) -> IdentityResult<String> {
        let claims = Claims::for_account(account, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Internal(format!("Failed to encode session token: {}", e)))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> IdentityResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| IdentityError::AuthRequired)?;

        Ok(data.claims)
    }

    /// Extract the token from an `Authorization: Bearer ...` header value.
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        auth_header.strip_prefix("Bearer ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::account::Account;
    use crate::domain::value_object::account_role::AccountRole;
    use crate::domain::value_object::credential::StoredCredential;
    use crate::domain::value_object::email::Email;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret-test-secret-test-sec", Duration::from_secs(24 * 3600))
    }

    fn account() -> Account {
        Account::new_patient(
            "Alice".to_string(),
            Email::new("alice@example.com").unwrap(),
            StoredCredential::Plaintext("pw".to_string()),
        )
    }

    #[test]
    fn test_issue_and_verify_claims() {
        let issuer = issuer();
        let account = account();

        let token = issuer.issue(&account).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, account.account_id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "patient");
        assert!(!claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let issuer = issuer();
        let token = issuer.issue(&account()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(issuer.verify(&tampered).is_err());

        let other = TokenIssuer::new(b"a-completely-different-secret!!!", Duration::from_secs(60));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issue with an already-elapsed validity window
        let issuer = TokenIssuer::new(b"test-secret-test-secret-test-sec", Duration::from_secs(0));
        let token = issuer.issue(&account()).unwrap();

        // Verification uses zero leeway, so exp == now is already invalid
        std::thread::sleep(std::time::Duration::from_secs(1));
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = issuer();
        assert!(issuer.verify("not-a-jwt").is_err());
        assert!(issuer.verify("").is_err());
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(
            TokenIssuer::extract_bearer_token("Bearer abc123"),
            Some("abc123")
        );
        assert_eq!(TokenIssuer::extract_bearer_token("abc123"), None);
    }
}
