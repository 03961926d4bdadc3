//! Forgot Password Use Case
//!
//! Issues a reset token and dispatches the recovery mail. The response is
//! identical whether or not the email is registered: the success envelope
//! must not act as an account-existence oracle.

use std::sync::Arc;

use platform::mail::{MailMessage, MailTransport};

use crate::application::config::IdentityConfig;
use crate::domain::entity::reset_token::ResetToken;
use crate::domain::repository::{AccountRepository, ResetTokenRepository};
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

/// Forgot password use case
pub struct ForgotPasswordUseCase<A, T, M>
where
    A: AccountRepository,
    T: ResetTokenRepository,
    M: MailTransport,
{
    accounts: Arc<A>,
    tokens: Arc<T>,
    mailer: Arc<M>,
    config: Arc<IdentityConfig>,
}

impl<A, T, M> ForgotPasswordUseCase<A, T, M>
where
    A: AccountRepository,
    T: ResetTokenRepository,
    M: MailTransport,
{
    pub fn new(accounts: Arc<A>, tokens: Arc<T>, mailer: Arc<M>, config: Arc<IdentityConfig>) -> Self {
        Self {
            accounts,
            tokens,
            mailer,
            config,
        }
    }

    /// Always succeeds for any well-formed request; side effects happen
    /// only when the email is registered.
    pub async fn execute(&self, email_raw: &str) -> IdentityResult<()> {
        if email_raw.is_empty() {
            return Err(IdentityError::MissingField("email"));
        }

        // A malformed address cannot be registered; it gets the same
        // success response as an unknown one.
        let Ok(email) = Email::new(email_raw) else {
            return Ok(());
        };

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            tracing::debug!("Password recovery requested for unknown email");
            return Ok(());
        };

        let reset = ResetToken::issue(account.email.clone());
        self.tokens.insert(&reset).await?;

        let message = MailMessage {
            from: self.config.mail_from.clone(),
            to: account.email.to_string(),
            subject: "Password Recovery".to_string(),
            html: recovery_html(&self.config.reset_link_base, &reset.token),
        };

        // Dispatch is synchronous; a transport failure surfaces as a 500.
        self.mailer.send(&message).await?;

        tracing::info!(account_id = %account.account_id, "Recovery mail dispatched");
        Ok(())
    }
}

/// Recovery mail body with the out-of-band token link.
fn recovery_html(link_base: &str, token: &str) -> String {
    format!(
        "<p>A password reset was requested for your account.</p>\
         <p><a href=\"{link_base}/{token}\">Reset your password</a></p>\
         <p>The link expires in one hour. If you did not request this, you can ignore this message.</p>"
    )
}
