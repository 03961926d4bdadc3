//! Repository Traits
//!
//! Interfaces for data persistence and the identity-provider port.
//! Implementations are in the infrastructure layer.

use crate::domain::entity::{account::Account, reset_token::ResetToken};
use crate::domain::value_object::{
    account_id::AccountId, approval_status::ApprovalStatus, email::Email,
};
use crate::error::IdentityResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account.
    ///
    /// A unique-constraint violation on email must surface as
    /// [`crate::error::IdentityError::EmailTaken`], never a generic
    /// database error: concurrent registrations race at the constraint and
    /// the loser needs a Conflict.
    async fn create(&self, account: &Account) -> IdentityResult<()>;

    /// Find account by email (exact, case-sensitive match)
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>>;

    /// Find account by ID, scoped to role = doctor
    async fn find_doctor_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>>;

    /// Replace the stored credential for an email
    async fn update_password(&self, email: &Email, stored: &str) -> IdentityResult<()>;

    /// Write `status` and the derived `is_approved` mirror in one
    /// statement, scoped to role = doctor. Returns rows affected; zero
    /// means no doctor row matched (callers treat that as a no-op).
    async fn update_approval(
        &self,
        account_id: &AccountId,
        status: ApprovalStatus,
    ) -> IdentityResult<u64>;

    /// Delete an account, scoped to role = doctor. Returns rows affected.
    async fn delete_doctor(&self, account_id: &AccountId) -> IdentityResult<u64>;

    /// Create the default preference record for a new account
    async fn create_preferences(&self, account_id: &AccountId) -> IdentityResult<()>;
}

/// Reset token repository trait
#[trait_variant::make(ResetTokenRepository: Send)]
pub trait LocalResetTokenRepository {
    /// Persist a freshly issued token
    async fn insert(&self, token: &ResetToken) -> IdentityResult<()>;

    /// Atomically consume an unexpired token, returning its email.
    ///
    /// Must be a single delete-returning operation, not check-then-delete:
    /// two concurrent redemptions of the same token race here and at most
    /// one may observe the row.
    async fn redeem(&self, token: &str) -> IdentityResult<Option<Email>>;

    /// Remove expired rows (startup sweep). Returns rows removed.
    async fn delete_expired(&self) -> IdentityResult<u64>;
}

/// A third-party identity assertion that passed provider verification.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Verified email asserted by the provider
    pub email: String,
    /// Display name, when the provider supplies one
    pub name: Option<String>,
    /// Provider-scoped stable subject identifier
    pub subject: String,
}

/// Identity-provider verification port
#[trait_variant::make(IdentityVerifier: Send)]
pub trait LocalIdentityVerifier {
    /// Check a provider token against the provider's introspection
    /// endpoint. Any provider-reported error, transport-level rejection,
    /// or missing verified email is invalid.
    async fn verify(&self, provider_token: &str) -> IdentityResult<VerifiedIdentity>;
}
