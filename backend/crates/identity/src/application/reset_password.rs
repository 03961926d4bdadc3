//! Reset Password Use Case
//!
//! Redeems a reset token and stores the new password as an Argon2id
//! digest. Redemption is consumption: the ledger deletes the row in the
//! same atomic operation that matches it, so no token is redeemable twice.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::domain::repository::{AccountRepository, ResetTokenRepository};
use crate::error::{IdentityError, IdentityResult};

/// Reset password use case
pub struct ResetPasswordUseCase<A, T>
where
    A: AccountRepository,
    T: ResetTokenRepository,
{
    accounts: Arc<A>,
    tokens: Arc<T>,
}

impl<A, T> ResetPasswordUseCase<A, T>
where
    A: AccountRepository,
    T: ResetTokenRepository,
{
    pub fn new(accounts: Arc<A>, tokens: Arc<T>) -> Self {
        Self { accounts, tokens }
    }

    pub async fn execute(&self, token: &str, new_password: &str) -> IdentityResult<()> {
        if token.is_empty() {
            return Err(IdentityError::MissingField("token"));
        }

        let clear = ClearTextPassword::new(new_password.to_string())
            .map_err(|_| IdentityError::MissingField("password"))?;

        // Expired, consumed, and never-issued tokens are indistinguishable
        let email = self
            .tokens
            .redeem(token)
            .await?
            .ok_or(IdentityError::InvalidResetToken)?;

        // This is the only path that writes digests; login keeps accepting
        // the legacy plain form for accounts that never reset.
        let digest = clear
            .hash()
            .map_err(|e| IdentityError::Internal(format!("Password hashing failed: {}", e)))?;

        self.accounts
            .update_password(&email, digest.as_phc_string())
            .await?;

        tracing::info!("Password reset completed");
        Ok(())
    }
}
