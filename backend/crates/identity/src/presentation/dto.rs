//! API DTOs (Data Transfer Objects)
//!
//! Success responses carry the `{"success": true, ...}` envelope; failures
//! are rendered by the error type as `{"success": false, "message": ...}`.
//! Request fields are optional at the serde layer so missing input maps to
//! a 400, not a deserialization rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::account::Account;

// ============================================================================
// Account projection
// ============================================================================

/// Account projection returned to callers. The stored credential is not
/// representable here; it can never leak into a response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub is_approved: bool,
    /// Approval literal, doctors only
    pub status: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.to_string(),
            name: account.name.clone(),
            email: account.email.to_string(),
            role: account.role.code().to_string(),
            is_admin: account.is_admin,
            is_approved: account.is_approved,
            status: account.status.map(|s| s.code().to_string()),
            phone: account.phone.clone(),
            specialization: account.specialization.clone(),
            experience_years: account.experience_years,
            bio: account.bio.clone(),
            avatar_url: account.avatar_url.clone(),
            created_at: account.created_at,
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// Register request (patient and doctor endpoints)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Required on the doctor endpoint
    pub specialization: Option<String>,
    pub phone: Option<String>,
}

/// Register response. No token; the caller logs in separately
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub user: AccountResponse,
}

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: AccountResponse,
}

// ============================================================================
// Federated login
// ============================================================================

/// Federated login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub token: Option<String>,
}

/// Minimal projection for the federated path
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedAccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Federated login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginResponse {
    pub success: bool,
    pub user: FederatedAccountResponse,
}

// ============================================================================
// Password recovery
// ============================================================================

/// Forgot password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Reset password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

// ============================================================================
// Admin moderation
// ============================================================================

/// Set approval status request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    /// One of PENDING | APPROVED | SUSPENDED | BANNED
    pub status: Option<String>,
}

/// Doctor lookup response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponse {
    pub success: bool,
    pub doctor: AccountResponse,
}

// ============================================================================
// Generic message envelope
// ============================================================================

/// Success envelope with a human-readable message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::credential::StoredCredential;
    use crate::domain::value_object::email::Email;

    #[test]
    fn test_account_response_never_carries_password() {
        let account = Account::new_patient(
            "Alice".to_string(),
            Email::new("alice@example.com").unwrap(),
            StoredCredential::Plaintext("hunter2".to_string()),
        );

        let json = serde_json::to_value(AccountResponse::from(&account)).unwrap();
        assert!(json.get("password").is_none());
        assert!(!json.to_string().contains("hunter2"));
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["role"], "patient");
        assert_eq!(json["isAdmin"], false);
    }

    #[test]
    fn test_doctor_projection_carries_status_literal() {
        let doctor = Account::new_doctor(
            "Dr. A".to_string(),
            Email::new("a@x.com").unwrap(),
            StoredCredential::Plaintext("pw".to_string()),
            "Cardiology".to_string(),
        );

        let json = serde_json::to_value(AccountResponse::from(&doctor)).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["isApproved"], false);
        assert_eq!(json["specialization"], "Cardiology");
    }

    #[test]
    fn test_reset_request_uses_camel_case() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"token": "abc", "newPassword": "pw"}"#).unwrap();
        assert_eq!(req.token.as_deref(), Some("abc"));
        assert_eq!(req.new_password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_missing_fields_deserialize_to_none() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }
}
