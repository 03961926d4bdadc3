//! Federated Login Use Case
//!
//! Verifies a third-party identity assertion and resolves it to a local
//! account, creating one on first sight. Resolution is idempotent: the
//! same asserted email always maps to the same account, and a lost insert
//! race falls back to the row that won.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, IdentityVerifier};
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

/// Federated login use case
pub struct GoogleLoginUseCase<R, V>
where
    R: AccountRepository,
    V: IdentityVerifier,
{
    repo: Arc<R>,
    verifier: Arc<V>,
}

impl<R, V> GoogleLoginUseCase<R, V>
where
    R: AccountRepository,
    V: IdentityVerifier,
{
    pub fn new(repo: Arc<R>, verifier: Arc<V>) -> Self {
        Self { repo, verifier }
    }

    pub async fn execute(&self, provider_token: &str) -> IdentityResult<Account> {
        if provider_token.is_empty() {
            return Err(IdentityError::MissingField("token"));
        }

        let identity = self.verifier.verify(provider_token).await?;

        let email =
            Email::new(&identity.email).map_err(|_| IdentityError::InvalidProviderToken)?;

        // Existing account: link by email, no password comparison ever
        // happens on this path.
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            tracing::info!(account_id = %existing.account_id, "Federated sign-in to existing account");
            return Ok(existing);
        }

        let name = identity
            .name
            .unwrap_or_else(|| email.local_part().to_string());
        let account = Account::new_federated(name, email.clone());

        match self.repo.create(&account).await {
            Ok(()) => {
                self.repo.create_preferences(&account.account_id).await?;
                tracing::info!(account_id = %account.account_id, "Federated account created");
                Ok(account)
            }
            // Concurrent first sign-ins race at the unique constraint;
            // the loser adopts the winner's row.
            Err(IdentityError::EmailTaken) => self
                .repo
                .find_by_email(&email)
                .await?
                .ok_or_else(|| IdentityError::Internal("Account vanished after insert race".into())),
            Err(e) => Err(e),
        }
    }
}
