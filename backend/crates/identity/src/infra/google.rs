//! Google Identity Verification
//!
//! Delegates signature and validity checking of Google ID tokens to the
//! provider's token-introspection endpoint. The adapter never inspects the
//! token itself; a provider-reported error or a missing verified email is
//! an invalid assertion.

use serde::Deserialize;

use crate::domain::repository::{IdentityVerifier, VerifiedIdentity};
use crate::error::{IdentityError, IdentityResult};

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Google token-introspection client
#[derive(Clone)]
pub struct GoogleVerifier {
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleVerifier {
    pub fn new() -> Self {
        Self::with_endpoint(GOOGLE_TOKENINFO_URL)
    }

    /// Point at a non-default introspection endpoint (tests, proxies)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GoogleVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Introspection response: `{email, name, sub, error?}`
#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    email: Option<String>,
    name: Option<String>,
    sub: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, provider_token: &str) -> IdentityResult<VerifiedIdentity> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", provider_token)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Identity provider unreachable");
                IdentityError::Internal("Identity provider unreachable".to_string())
            })?;

        // The provider answers non-2xx for malformed/expired tokens
        if !response.status().is_success() {
            return Err(IdentityError::InvalidProviderToken);
        }

        let info: TokenInfoResponse = response
            .json()
            .await
            .map_err(|_| IdentityError::InvalidProviderToken)?;

        if let Some(error) = info.error {
            tracing::warn!(
                error = %error,
                description = info.error_description.as_deref().unwrap_or(""),
                "Identity provider rejected token"
            );
            return Err(IdentityError::InvalidProviderToken);
        }

        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or(IdentityError::InvalidProviderToken)?;

        Ok(VerifiedIdentity {
            email,
            name: info.name,
            subject: info.sub.unwrap_or_default(),
        })
    }
}
