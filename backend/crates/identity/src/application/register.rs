//! Register Use Case
//!
//! Creates a new local account (patient or doctor). No session token is
//! issued at registration; the caller logs in separately.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole, credential::StoredCredential, email::Email,
};
use crate::error::{IdentityError, IdentityResult};

/// Register input
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: AccountRole,
    pub specialization: Option<String>,
    pub phone: Option<String>,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<Account> {
        let email = Email::new(&input.email)?;

        if input.password.is_empty() {
            return Err(IdentityError::MissingField("password"));
        }

        // Pre-check for a friendlier error; the unique constraint remains
        // the source of truth for concurrent registrations.
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        // Registration persists the password as given. Un-migrated
        // accounts are compared plain at login; only the reset-password
        // flow writes digests.
        let credential = StoredCredential::Plaintext(input.password);

        let mut account = match input.role {
            AccountRole::Doctor => {
                let specialization = input
                    .specialization
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(IdentityError::MissingField("specialization"))?;
                Account::new_doctor(input.name, email, credential, specialization)
            }
            _ => Account::new_patient(input.name, email, credential),
        };
        account.phone = input.phone;

        self.repo.create(&account).await?;
        self.repo.create_preferences(&account.account_id).await?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account registered"
        );

        Ok(account)
    }
}
