//! Account Entity
//!
//! The single identity record: credentials, role, admin flag, and (for
//! doctor accounts) the approval lifecycle with its mirror boolean.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, approval_status::ApprovalStatus,
    credential::StoredCredential, email::Email,
};

/// Account entity
///
/// Invariants:
/// - `is_approved == status.is_approved()` whenever `status` is set; the
///   two fields only ever change together via [`Account::set_approval`]
///   (or the equivalent single-statement store update).
/// - `credential` is `None` iff the account was created through federated
///   identity and has never set a local password.
/// - `status` is `Some` only for doctor-role accounts.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    /// Unique, case-sensitive as stored
    pub email: Email,
    pub name: String,
    /// None only for federated-identity accounts
    pub credential: Option<StoredCredential>,
    pub role: AccountRole,
    /// Independent of role
    pub is_admin: bool,
    /// Legacy mirror of `status == Approved`
    pub is_approved: bool,
    /// Doctor accounts only
    pub status: Option<ApprovalStatus>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a patient account from local registration.
    pub fn new_patient(name: String, email: Email, credential: StoredCredential) -> Self {
        Self {
            account_id: AccountId::new(),
            email,
            name,
            credential: Some(credential),
            role: AccountRole::Patient,
            is_admin: false,
            is_approved: false,
            status: None,
            phone: None,
            specialization: None,
            experience_years: None,
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    /// Create a doctor account from self-registration.
    ///
    /// Starts in `PENDING` with the mirror boolean false; only an admin
    /// action moves it from there.
    pub fn new_doctor(
        name: String,
        email: Email,
        credential: StoredCredential,
        specialization: String,
    ) -> Self {
        let status = ApprovalStatus::Pending;
        Self {
            account_id: AccountId::new(),
            email,
            name,
            credential: Some(credential),
            role: AccountRole::Doctor,
            is_admin: false,
            is_approved: status.is_approved(),
            status: Some(status),
            phone: None,
            specialization: Some(specialization),
            experience_years: None,
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    /// Create an account from a verified federated identity.
    ///
    /// No local password; default role and profile.
    pub fn new_federated(name: String, email: Email) -> Self {
        Self {
            account_id: AccountId::new(),
            email,
            name,
            credential: None,
            role: AccountRole::default(),
            is_admin: false,
            is_approved: false,
            status: None,
            phone: None,
            specialization: None,
            experience_years: None,
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    /// Set the approval status, keeping the mirror boolean consistent.
    pub fn set_approval(&mut self, status: ApprovalStatus) {
        self.status = Some(status);
        self.is_approved = status.is_approved();
    }

    pub fn is_doctor(&self) -> bool {
        self.role.is_doctor()
    }
}
