//! Admin Moderation Use Case
//!
//! Doctor-account lifecycle operations. Every mutation is scoped to
//! role = doctor at the store; an id that matches no doctor row is a
//! silent no-op (zero rows affected), not an error.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{account_id::AccountId, approval_status::ApprovalStatus};
use crate::error::{IdentityError, IdentityResult};

/// Moderation use case
pub struct ModerationUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> ModerationUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Set a doctor's approval status from its wire literal.
    ///
    /// The literal set is closed; anything outside it is a malformed
    /// request. The flat transition graph allows any source state.
    pub async fn set_status(&self, account_id: &AccountId, status_literal: &str) -> IdentityResult<()> {
        let status = ApprovalStatus::from_code(status_literal)
            .ok_or_else(|| IdentityError::InvalidStatus(status_literal.to_string()))?;

        self.apply(account_id, status).await
    }

    /// Legacy convenience wrapper: equivalent to setting APPROVED.
    pub async fn approve(&self, account_id: &AccountId) -> IdentityResult<()> {
        self.apply(account_id, ApprovalStatus::Approved).await
    }

    /// Fetch a doctor account, 404 on miss.
    pub async fn get_doctor(&self, account_id: &AccountId) -> IdentityResult<Account> {
        self.repo
            .find_doctor_by_id(account_id)
            .await?
            .ok_or(IdentityError::DoctorNotFound)
    }

    /// Delete a doctor account. Non-doctor ids affect zero rows.
    pub async fn delete_doctor(&self, account_id: &AccountId) -> IdentityResult<()> {
        let affected = self.repo.delete_doctor(account_id).await?;

        tracing::info!(
            account_id = %account_id,
            affected = affected,
            "Doctor account deleted"
        );
        Ok(())
    }

    async fn apply(&self, account_id: &AccountId, status: ApprovalStatus) -> IdentityResult<()> {
        // Status and its mirror boolean are written in one statement
        let affected = self.repo.update_approval(account_id, status).await?;

        if affected == 0 {
            tracing::debug!(account_id = %account_id, "No doctor row matched; no-op");
        } else {
            tracing::info!(
                account_id = %account_id,
                status = %status,
                "Doctor approval status updated"
            );
        }
        Ok(())
    }
}
