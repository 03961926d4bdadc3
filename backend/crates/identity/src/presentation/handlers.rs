//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;
use uuid::Uuid;

use platform::mail::MailTransport;

use crate::application::config::IdentityConfig;
use crate::application::{
    ForgotPasswordUseCase, GoogleLoginUseCase, LoginInput, LoginUseCase, ModerationUseCase,
    RegisterInput, RegisterUseCase, ResetPasswordUseCase,
};
use crate::domain::repository::{AccountRepository, IdentityVerifier, ResetTokenRepository};
use crate::domain::value_object::{account_id::AccountId, account_role::AccountRole};
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    AccountResponse, DoctorResponse, FederatedAccountResponse, ForgotPasswordRequest,
    GoogleLoginRequest, GoogleLoginResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse, ResetPasswordRequest, SetStatusRequest,
};

/// Shared state for identity handlers
pub struct IdentityAppState<R, M, V>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub verifier: Arc<V>,
    pub config: Arc<IdentityConfig>,
}

impl<R, M, V> Clone for IdentityAppState<R, M, V>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            verifier: self.verifier.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

/// POST /auth/register/patient
pub async fn register_patient<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<impl IntoResponse>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    register(state, req, AccountRole::Patient).await
}

/// POST /auth/register/doctor
pub async fn register_doctor<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<impl IntoResponse>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    register(state, req, AccountRole::Doctor).await
}

async fn register<R, M, V>(
    state: IdentityAppState<R, M, V>,
    req: RegisterRequest,
    role: AccountRole,
) -> IdentityResult<impl IntoResponse>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let input = RegisterInput {
        name: require(req.name, "name")?,
        email: require(req.email, "email")?,
        password: require(req.password, "password")?,
        role,
        specialization: req.specialization,
        phone: req.phone,
    };

    let use_case = RegisterUseCase::new(state.repo.clone());
    let account = use_case.execute(input).await?;

    // No token at registration; the caller logs in separately
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user: AccountResponse::from(&account),
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
pub async fn login<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Json(req): Json<LoginRequest>,
) -> IdentityResult<impl IntoResponse>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let input = LoginInput {
        email: require(req.email, "email")?,
        password: require(req.password, "password")?,
    };

    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case.execute(input).await?;

    // Token in the body and as the session cookie, same 24h lifetime
    let cookie = state.config.cookie().build_set_cookie(&output.token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            token: output.token,
            user: AccountResponse::from(&output.account),
        }),
    ))
}

// ============================================================================
// Federated login
// ============================================================================

/// POST /auth/google
pub async fn google_login<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Json(req): Json<GoogleLoginRequest>,
) -> IdentityResult<Json<GoogleLoginResponse>>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let token = require(req.token, "token")?;

    let use_case = GoogleLoginUseCase::new(state.repo.clone(), state.verifier.clone());
    let account = use_case.execute(&token).await?;

    // This path returns the minimal projection and does not set a session
    // cookie; clients continue through the local login flow.
    Ok(Json(GoogleLoginResponse {
        success: true,
        user: FederatedAccountResponse {
            id: account.account_id.to_string(),
            name: account.name.clone(),
            email: account.email.to_string(),
        },
    }))
}

// ============================================================================
// Password recovery
// ============================================================================

/// POST /auth/forgot-password
pub async fn forgot_password<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let email = require(req.email, "email")?;

    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.execute(&email).await?;

    // Identical response whether or not the email is registered
    Ok(Json(MessageResponse {
        success: true,
        message: "If that email is registered, a recovery message has been sent".to_string(),
    }))
}

/// POST /auth/reset-password
pub async fn reset_password<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Json(req): Json<ResetPasswordRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let token = require(req.token, "token")?;
    let new_password = require(req.new_password, "password")?;

    let use_case = ResetPasswordUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.execute(&token, &new_password).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Password updated".to_string(),
    }))
}

// ============================================================================
// Admin moderation
// ============================================================================

/// PUT /admin/doctors/{id}/status
pub async fn set_doctor_status<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let status = require(req.status, "status")?;

    let use_case = ModerationUseCase::new(state.repo.clone());
    use_case
        .set_status(&AccountId::from_uuid(id), &status)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Status updated".to_string(),
    }))
}

/// PUT /admin/doctors/{id}/approve
pub async fn approve_doctor<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Path(id): Path<Uuid>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = ModerationUseCase::new(state.repo.clone());
    use_case.approve(&AccountId::from_uuid(id)).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Doctor approved".to_string(),
    }))
}

/// GET /admin/doctors/{id}
pub async fn get_doctor<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Path(id): Path<Uuid>,
) -> IdentityResult<Json<DoctorResponse>>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = ModerationUseCase::new(state.repo.clone());
    let doctor = use_case.get_doctor(&AccountId::from_uuid(id)).await?;

    Ok(Json(DoctorResponse {
        success: true,
        doctor: AccountResponse::from(&doctor),
    }))
}

/// DELETE /admin/doctors/{id}
pub async fn delete_doctor<R, M, V>(
    State(state): State<IdentityAppState<R, M, V>>,
    Path(id): Path<Uuid>,
) -> IdentityResult<Json<MessageResponse>>
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = ModerationUseCase::new(state.repo.clone());
    use_case.delete_doctor(&AccountId::from_uuid(id)).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Doctor deleted".to_string(),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Missing or blank required fields are a 400, not a serde rejection.
fn require(value: Option<String>, field: &'static str) -> IdentityResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(IdentityError::MissingField(field))
}
