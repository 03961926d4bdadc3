//! Login Use Case
//!
//! Verifies credentials and issues a session token.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::IdentityConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};
use crate::token::TokenIssuer;

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    /// Signed session token (also delivered as a cookie by the handler)
    pub token: String,
    pub account: Account,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> LoginUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: LoginInput) -> IdentityResult<LoginOutput> {
        // A malformed email can never match an account
        let email = Email::new(&input.email).map_err(|_| IdentityError::InvalidCredentials)?;

        let account = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        // Federated accounts without a local password cannot log in here
        let credential = account
            .credential
            .as_ref()
            .ok_or(IdentityError::InvalidCredentials)?;

        let candidate = ClearTextPassword::new(input.password)
            .map_err(|_| IdentityError::InvalidCredentials)?;

        // Dispatches on the stored form: digest or legacy plain text.
        // No opportunistic re-hash of plain credentials on success.
        if !credential.verify(&candidate) {
            tracing::warn!(account_id = %account.account_id, "Password verification failed");
            return Err(IdentityError::InvalidCredentials);
        }

        let issuer = TokenIssuer::new(&self.config.token_secret, self.config.token_ttl);
        let token = issuer.issue(&account)?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Signed in"
        );

        Ok(LoginOutput { token, account })
    }
}
