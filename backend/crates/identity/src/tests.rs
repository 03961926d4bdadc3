//! Scenario tests for the identity crate
//!
//! Use cases are exercised against in-memory implementations of the
//! repository, mail-transport, and identity-provider ports.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use platform::mail::{MailError, MailMessage, MailTransport};

use crate::application::config::IdentityConfig;
use crate::application::{
    ForgotPasswordUseCase, GoogleLoginUseCase, LoginInput, LoginUseCase, ModerationUseCase,
    RegisterInput, RegisterUseCase, ResetPasswordUseCase,
};
use crate::domain::entity::account::Account;
use crate::domain::entity::reset_token::ResetToken;
use crate::domain::repository::{
    AccountRepository, IdentityVerifier, ResetTokenRepository, VerifiedIdentity,
};
use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, approval_status::ApprovalStatus, email::Email,
};
use crate::error::{IdentityError, IdentityResult};
use crate::token::TokenIssuer;

// ============================================================================
// In-memory collaborators
// ============================================================================

#[derive(Clone, Default)]
struct MemoryStore {
    accounts: Arc<Mutex<Vec<Account>>>,
    tokens: Arc<Mutex<Vec<ResetToken>>>,
    preferences: Arc<Mutex<Vec<AccountId>>>,
}

impl MemoryStore {
    fn account_by_email(&self, email: &str) -> Option<Account> {
        let email = Email::from_db(email);
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    fn first_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .unwrap()
            .first()
            .map(|t| t.token.clone())
    }
}

impl AccountRepository for MemoryStore {
    async fn create(&self, account: &Account) -> IdentityResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == account.email) {
            // Mirrors the store's unique constraint
            return Err(IdentityError::EmailTaken);
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.account_id == account_id)
            .cloned())
    }

    async fn find_doctor_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.account_id == account_id && a.is_doctor())
            .cloned())
    }

    async fn update_password(&self, email: &Email, stored: &str) -> IdentityResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        for account in accounts.iter_mut() {
            if &account.email == email {
                account.credential = Some(
                    crate::domain::value_object::credential::StoredCredential::from_stored(
                        stored.to_string(),
                    ),
                );
            }
        }
        Ok(())
    }

    async fn update_approval(
        &self,
        account_id: &AccountId,
        status: ApprovalStatus,
    ) -> IdentityResult<u64> {
        let mut accounts = self.accounts.lock().unwrap();
        let mut affected = 0;
        for account in accounts.iter_mut() {
            if &account.account_id == account_id && account.is_doctor() {
                account.set_approval(status);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete_doctor(&self, account_id: &AccountId) -> IdentityResult<u64> {
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| !(&a.account_id == account_id && a.is_doctor()));
        Ok((before - accounts.len()) as u64)
    }

    async fn create_preferences(&self, account_id: &AccountId) -> IdentityResult<()> {
        self.preferences.lock().unwrap().push(*account_id);
        Ok(())
    }
}

impl ResetTokenRepository for MemoryStore {
    async fn insert(&self, token: &ResetToken) -> IdentityResult<()> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn redeem(&self, token: &str) -> IdentityResult<Option<Email>> {
        let mut tokens = self.tokens.lock().unwrap();
        // Atomic match-and-remove under one lock; expired rows never match
        match tokens
            .iter()
            .position(|t| t.token == token && t.expires_at > Utc::now())
        {
            Some(pos) => {
                let consumed = tokens.remove(pos);
                Ok(Some(consumed.email))
            }
            None => Ok(None),
        }
    }

    async fn delete_expired(&self) -> IdentityResult<u64> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.expires_at > Utc::now());
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Clone)]
struct StaticVerifier {
    email: String,
    name: Option<String>,
}

impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, _provider_token: &str) -> IdentityResult<VerifiedIdentity> {
        Ok(VerifiedIdentity {
            email: self.email.clone(),
            name: self.name.clone(),
            subject: "subject-1".to_string(),
        })
    }
}

#[derive(Clone)]
struct RejectingVerifier;

impl IdentityVerifier for RejectingVerifier {
    async fn verify(&self, _provider_token: &str) -> IdentityResult<VerifiedIdentity> {
        Err(IdentityError::InvalidProviderToken)
    }
}

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
    fail: bool,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl MailTransport for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::SendFailed("transport down".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn config() -> Arc<IdentityConfig> {
    Arc::new(IdentityConfig::development())
}

async fn register_patient(store: &MemoryStore, email: &str, password: &str) -> Account {
    RegisterUseCase::new(Arc::new(store.clone()))
        .execute(RegisterInput {
            name: "Pat".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: AccountRole::Patient,
            specialization: None,
            phone: None,
        })
        .await
        .unwrap()
}

async fn register_doctor(store: &MemoryStore, email: &str, password: &str) -> Account {
    RegisterUseCase::new(Arc::new(store.clone()))
        .execute(RegisterInput {
            name: "Dr. A".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: AccountRole::Doctor,
            specialization: Some("Cardiology".to_string()),
            phone: None,
        })
        .await
        .unwrap()
}

async fn login(
    store: &MemoryStore,
    config: &Arc<IdentityConfig>,
    email: &str,
    password: &str,
) -> IdentityResult<crate::application::LoginOutput> {
    LoginUseCase::new(Arc::new(store.clone()), config.clone())
        .execute(LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
}

fn forgot_use_case(
    store: &MemoryStore,
    mailer: &RecordingMailer,
    config: &Arc<IdentityConfig>,
) -> ForgotPasswordUseCase<MemoryStore, MemoryStore, RecordingMailer> {
    ForgotPasswordUseCase::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(mailer.clone()),
        config.clone(),
    )
}

fn reset_use_case(store: &MemoryStore) -> ResetPasswordUseCase<MemoryStore, MemoryStore> {
    ResetPasswordUseCase::new(Arc::new(store.clone()), Arc::new(store.clone()))
}

// ============================================================================
// Registration
// ============================================================================

mod registration {
    use super::*;

    #[tokio::test]
    async fn duplicate_email_conflicts_without_duplicate_row() {
        let store = MemoryStore::default();
        register_patient(&store, "a@x.com", "pw").await;

        let result = RegisterUseCase::new(Arc::new(store.clone()))
            .execute(RegisterInput {
                name: "Other".to_string(),
                email: "a@x.com".to_string(),
                password: "other".to_string(),
                role: AccountRole::Patient,
                specialization: None,
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(IdentityError::EmailTaken)));
        assert_eq!(store.accounts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn doctor_requires_specialization() {
        let store = MemoryStore::default();
        let result = RegisterUseCase::new(Arc::new(store.clone()))
            .execute(RegisterInput {
                name: "Dr. A".to_string(),
                email: "a@x.com".to_string(),
                password: "pw".to_string(),
                role: AccountRole::Doctor,
                specialization: None,
                phone: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(IdentityError::MissingField("specialization"))
        ));
    }

    #[tokio::test]
    async fn registration_creates_default_preferences() {
        let store = MemoryStore::default();
        let account = register_patient(&store, "a@x.com", "pw").await;
        assert_eq!(
            store.preferences.lock().unwrap().as_slice(),
            &[account.account_id]
        );
    }

    #[tokio::test]
    async fn registration_stores_password_as_given() {
        // The legacy plain form: only the reset path writes digests
        let store = MemoryStore::default();
        register_patient(&store, "a@x.com", "pw").await;

        let account = store.account_by_email("a@x.com").unwrap();
        assert!(!account.credential.unwrap().is_digest());
    }
}

// ============================================================================
// Login
// ============================================================================

mod login_flow {
    use super::*;

    #[tokio::test]
    async fn unknown_email_is_unauthenticated() {
        let store = MemoryStore::default();
        let config = config();
        let result = login(&store, &config, "nobody@x.com", "pw").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthenticated() {
        let store = MemoryStore::default();
        let config = config();
        register_patient(&store, "a@x.com", "pw").await;

        let result = login(&store, &config, "a@x.com", "wrong").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn token_claims_decode_to_the_account() {
        let store = MemoryStore::default();
        let config = config();
        let account = register_patient(&store, "a@x.com", "pw").await;

        let output = login(&store, &config, "a@x.com", "pw").await.unwrap();

        let issuer = TokenIssuer::new(&config.token_secret, config.token_ttl);
        let claims = issuer.verify(&output.token).unwrap();
        assert_eq!(claims.sub, account.account_id.to_string());
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, "patient");
        assert!(!claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn digest_and_plaintext_accounts_both_verify() {
        let store = MemoryStore::default();
        let config = config();

        // Legacy plain credential straight from registration
        register_patient(&store, "plain@x.com", "plainpw").await;
        assert!(login(&store, &config, "plain@x.com", "plainpw").await.is_ok());

        // Digest credential written by the reset flow
        register_patient(&store, "digest@x.com", "oldpw").await;
        let digest = platform::password::ClearTextPassword::new("newpw".to_string())
            .unwrap()
            .hash()
            .unwrap();
        AccountRepository::update_password(
            &store,
            &Email::new("digest@x.com").unwrap(),
            digest.as_phc_string(),
        )
        .await
        .unwrap();

        assert!(login(&store, &config, "digest@x.com", "newpw").await.is_ok());
        assert!(matches!(
            login(&store, &config, "digest@x.com", "oldpw").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn federated_account_has_no_local_login() {
        let store = MemoryStore::default();
        let config = config();

        let verifier = StaticVerifier {
            email: "fed@x.com".to_string(),
            name: Some("Fed".to_string()),
        };
        GoogleLoginUseCase::new(Arc::new(store.clone()), Arc::new(verifier))
            .execute("provider-token")
            .await
            .unwrap();

        let result = login(&store, &config, "fed@x.com", "anything").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }
}

// ============================================================================
// Password recovery
// ============================================================================

mod recovery {
    use super::*;

    #[tokio::test]
    async fn unknown_email_gets_same_success_and_no_side_effects() {
        let store = MemoryStore::default();
        let mailer = RecordingMailer::default();
        let config = config();
        register_patient(&store, "known@x.com", "pw").await;

        let use_case = forgot_use_case(&store, &mailer, &config);

        let unknown = use_case.execute("unknown@x.com").await;
        assert!(unknown.is_ok());
        assert_eq!(store.token_count(), 0);
        assert_eq!(mailer.sent_count(), 0);

        let known = use_case.execute("known@x.com").await;
        assert!(known.is_ok());
        assert_eq!(store.token_count(), 1);
        assert_eq!(mailer.sent_count(), 1);
    }

    #[tokio::test]
    async fn recovery_mail_carries_the_token() {
        let store = MemoryStore::default();
        let mailer = RecordingMailer::default();
        let config = config();
        register_patient(&store, "a@x.com", "pw").await;

        forgot_use_case(&store, &mailer, &config)
            .execute("a@x.com")
            .await
            .unwrap();

        let token = store.first_token().unwrap();
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].to, "a@x.com");
        assert!(sent[0].html.contains(&token));
    }

    #[tokio::test]
    async fn mail_failure_surfaces_as_internal() {
        let store = MemoryStore::default();
        let mailer = RecordingMailer::failing();
        let config = config();
        register_patient(&store, "a@x.com", "pw").await;

        let result = forgot_use_case(&store, &mailer, &config)
            .execute("a@x.com")
            .await;
        assert!(matches!(result, Err(IdentityError::Mail(_))));
    }

    #[tokio::test]
    async fn token_is_single_use() {
        let store = MemoryStore::default();
        let mailer = RecordingMailer::default();
        let config = config();
        register_patient(&store, "a@x.com", "pw").await;

        forgot_use_case(&store, &mailer, &config)
            .execute("a@x.com")
            .await
            .unwrap();
        let token = store.first_token().unwrap();

        let reset = reset_use_case(&store);
        reset.execute(&token, "newpw").await.unwrap();

        let second = reset.execute(&token, "again").await;
        assert!(matches!(second, Err(IdentityError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn expired_token_is_invalid_even_if_never_consumed() {
        let store = MemoryStore::default();
        register_patient(&store, "a@x.com", "pw").await;

        let mut token = ResetToken::issue(Email::new("a@x.com").unwrap());
        token.expires_at = Utc::now() - Duration::seconds(1);
        let secret = token.token.clone();
        ResetTokenRepository::insert(&store, &token).await.unwrap();

        let result = reset_use_case(&store).execute(&secret, "newpw").await;
        assert!(matches!(result, Err(IdentityError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn reset_upgrades_credential_to_digest() {
        let store = MemoryStore::default();
        let mailer = RecordingMailer::default();
        let config = config();
        register_patient(&store, "a@x.com", "pw").await;

        forgot_use_case(&store, &mailer, &config)
            .execute("a@x.com")
            .await
            .unwrap();
        let token = store.first_token().unwrap();
        reset_use_case(&store).execute(&token, "newpw").await.unwrap();

        let account = store.account_by_email("a@x.com").unwrap();
        assert!(account.credential.unwrap().is_digest());
    }
}

// ============================================================================
// Federated identity
// ============================================================================

mod federation {
    use super::*;

    #[tokio::test]
    async fn create_or_link_is_idempotent() {
        let store = MemoryStore::default();
        let verifier = Arc::new(StaticVerifier {
            email: "fed@x.com".to_string(),
            name: Some("Fed".to_string()),
        });

        let use_case = GoogleLoginUseCase::new(Arc::new(store.clone()), verifier);

        let first = use_case.execute("provider-token").await.unwrap();
        let second = use_case.execute("provider-token").await.unwrap();

        assert_eq!(first.account_id, second.account_id);
        assert_eq!(store.accounts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn first_sign_in_creates_passwordless_patient() {
        let store = MemoryStore::default();
        let verifier = Arc::new(StaticVerifier {
            email: "fed@x.com".to_string(),
            name: None,
        });

        let account = GoogleLoginUseCase::new(Arc::new(store.clone()), verifier)
            .execute("provider-token")
            .await
            .unwrap();

        assert!(account.credential.is_none());
        assert_eq!(account.role, AccountRole::Patient);
        // Name falls back to the email local part
        assert_eq!(account.name, "fed");
        // Default preferences created alongside
        assert_eq!(store.preferences.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn linking_existing_account_skips_password_check() {
        let store = MemoryStore::default();
        register_patient(&store, "a@x.com", "pw").await;
        let verifier = Arc::new(StaticVerifier {
            email: "a@x.com".to_string(),
            name: None,
        });

        let account = GoogleLoginUseCase::new(Arc::new(store.clone()), verifier)
            .execute("provider-token")
            .await
            .unwrap();

        assert_eq!(account.email.as_str(), "a@x.com");
        assert_eq!(store.accounts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn provider_rejection_is_unauthenticated() {
        let store = MemoryStore::default();
        let result = GoogleLoginUseCase::new(Arc::new(store.clone()), Arc::new(RejectingVerifier))
            .execute("bad-token")
            .await;

        assert!(matches!(result, Err(IdentityError::InvalidProviderToken)));
        assert!(store.accounts.lock().unwrap().is_empty());
    }
}

// ============================================================================
// Admin moderation
// ============================================================================

mod moderation {
    use super::*;

    #[tokio::test]
    async fn approve_sets_status_and_mirror() {
        let store = MemoryStore::default();
        let doctor = register_doctor(&store, "a@x.com", "pw").await;

        let use_case = ModerationUseCase::new(Arc::new(store.clone()));
        use_case
            .set_status(&doctor.account_id, "APPROVED")
            .await
            .unwrap();

        let updated = store.account_by_email("a@x.com").unwrap();
        assert_eq!(updated.status, Some(ApprovalStatus::Approved));
        assert!(updated.is_approved);
    }

    #[tokio::test]
    async fn ban_clears_mirror() {
        let store = MemoryStore::default();
        let doctor = register_doctor(&store, "a@x.com", "pw").await;

        let use_case = ModerationUseCase::new(Arc::new(store.clone()));
        use_case.set_status(&doctor.account_id, "APPROVED").await.unwrap();
        use_case.set_status(&doctor.account_id, "BANNED").await.unwrap();

        let updated = store.account_by_email("a@x.com").unwrap();
        assert_eq!(updated.status, Some(ApprovalStatus::Banned));
        assert!(!updated.is_approved);
    }

    #[tokio::test]
    async fn invalid_literal_is_rejected_and_account_unchanged() {
        let store = MemoryStore::default();
        let doctor = register_doctor(&store, "a@x.com", "pw").await;

        let use_case = ModerationUseCase::new(Arc::new(store.clone()));
        let result = use_case.set_status(&doctor.account_id, "INVALID").await;

        assert!(matches!(result, Err(IdentityError::InvalidStatus(_))));
        let unchanged = store.account_by_email("a@x.com").unwrap();
        assert_eq!(unchanged.status, Some(ApprovalStatus::Pending));
        assert!(!unchanged.is_approved);
    }

    #[tokio::test]
    async fn non_doctor_id_is_a_silent_noop() {
        let store = MemoryStore::default();
        let patient = register_patient(&store, "p@x.com", "pw").await;

        let use_case = ModerationUseCase::new(Arc::new(store.clone()));
        let result = use_case.set_status(&patient.account_id, "APPROVED").await;

        assert!(result.is_ok());
        let unchanged = store.account_by_email("p@x.com").unwrap();
        assert_eq!(unchanged.status, None);
        assert!(!unchanged.is_approved);
    }

    #[tokio::test]
    async fn legacy_approve_wrapper_matches_set_status() {
        let store = MemoryStore::default();
        let doctor = register_doctor(&store, "a@x.com", "pw").await;

        ModerationUseCase::new(Arc::new(store.clone()))
            .approve(&doctor.account_id)
            .await
            .unwrap();

        let updated = store.account_by_email("a@x.com").unwrap();
        assert_eq!(updated.status, Some(ApprovalStatus::Approved));
        assert!(updated.is_approved);
    }

    #[tokio::test]
    async fn delete_is_doctor_scoped() {
        let store = MemoryStore::default();
        let doctor = register_doctor(&store, "d@x.com", "pw").await;
        let patient = register_patient(&store, "p@x.com", "pw").await;

        let use_case = ModerationUseCase::new(Arc::new(store.clone()));
        use_case.delete_doctor(&doctor.account_id).await.unwrap();
        use_case.delete_doctor(&patient.account_id).await.unwrap();

        assert!(store.account_by_email("d@x.com").is_none());
        assert!(store.account_by_email("p@x.com").is_some());
    }

    #[tokio::test]
    async fn get_doctor_misses_are_not_found() {
        let store = MemoryStore::default();
        let patient = register_patient(&store, "p@x.com", "pw").await;

        let use_case = ModerationUseCase::new(Arc::new(store.clone()));
        let result = use_case.get_doctor(&patient.account_id).await;
        assert!(matches!(result, Err(IdentityError::DoctorNotFound)));
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn doctor_registration_review_approval() {
        let store = MemoryStore::default();

        // Register doctor a@x.com / pw / Cardiology
        let doctor = register_doctor(&store, "a@x.com", "pw").await;
        assert_eq!(doctor.status, Some(ApprovalStatus::Pending));
        assert!(!doctor.is_approved);

        // Admin approves
        let moderation = ModerationUseCase::new(Arc::new(store.clone()));
        moderation
            .set_status(&doctor.account_id, "APPROVED")
            .await
            .unwrap();

        // Reading the doctor back shows the mirror
        let fetched = moderation.get_doctor(&doctor.account_id).await.unwrap();
        assert_eq!(fetched.status, Some(ApprovalStatus::Approved));
        assert!(fetched.is_approved);
        assert_eq!(fetched.specialization.as_deref(), Some("Cardiology"));
    }

    #[tokio::test]
    async fn full_password_recovery_cycle() {
        let store = MemoryStore::default();
        let mailer = RecordingMailer::default();
        let config = config();
        register_patient(&store, "a@x.com", "pw").await;

        // forgotPassword issues token T
        forgot_use_case(&store, &mailer, &config)
            .execute("a@x.com")
            .await
            .unwrap();
        let token = store.first_token().unwrap();

        // resetPassword(T, "newpw") succeeds
        reset_use_case(&store).execute(&token, "newpw").await.unwrap();

        // login with the new password succeeds, old one fails
        assert!(login(&store, &config, "a@x.com", "newpw").await.is_ok());
        assert!(matches!(
            login(&store, &config, "a@x.com", "pw").await,
            Err(IdentityError::InvalidCredentials)
        ));

        // resetPassword(T, "again") now fails
        let replay = reset_use_case(&store).execute(&token, "again").await;
        assert!(matches!(replay, Err(IdentityError::InvalidResetToken)));
    }
}
