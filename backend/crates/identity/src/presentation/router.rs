//! Identity Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use platform::mail::MailTransport;

use crate::application::config::IdentityConfig;
use crate::domain::repository::{AccountRepository, IdentityVerifier, ResetTokenRepository};
use crate::infra::google::GoogleVerifier;
use crate::infra::postgres::PgIdentityRepository;
use crate::presentation::handlers::{self, IdentityAppState};
use crate::presentation::middleware::{AdminGuardState, require_admin};

/// Create the identity router with the PostgreSQL repository and Google
/// verifier.
pub fn identity_router<M>(
    repo: PgIdentityRepository,
    mailer: M,
    config: IdentityConfig,
) -> Router
where
    M: MailTransport + Send + Sync + 'static,
{
    identity_router_generic(repo, mailer, GoogleVerifier::new(), config)
}

/// Create the identity router for any collaborator implementations.
pub fn identity_router_generic<R, M, V>(
    repo: R,
    mailer: M,
    verifier: V,
    config: IdentityConfig,
) -> Router
where
    R: AccountRepository + ResetTokenRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let state = IdentityAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        verifier: Arc::new(verifier),
        config: Arc::new(config),
    };

    let guard = AdminGuardState {
        config: state.config.clone(),
    };

    let admin = Router::new()
        .route(
            "/doctors/{id}",
            get(handlers::get_doctor::<R, M, V>).delete(handlers::delete_doctor::<R, M, V>),
        )
        .route(
            "/doctors/{id}/status",
            put(handlers::set_doctor_status::<R, M, V>),
        )
        .route(
            "/doctors/{id}/approve",
            put(handlers::approve_doctor::<R, M, V>),
        )
        .layer(middleware::from_fn_with_state(guard, require_admin))
        .with_state(state.clone());

    Router::new()
        .route(
            "/auth/register/patient",
            post(handlers::register_patient::<R, M, V>),
        )
        .route(
            "/auth/register/doctor",
            post(handlers::register_doctor::<R, M, V>),
        )
        .route("/auth/login", post(handlers::login::<R, M, V>))
        .route("/auth/google", post(handlers::google_login::<R, M, V>))
        .route(
            "/auth/forgot-password",
            post(handlers::forgot_password::<R, M, V>),
        )
        .route(
            "/auth/reset-password",
            post(handlers::reset_password::<R, M, V>),
        )
        .with_state(state)
        .nest("/admin", admin)
}
