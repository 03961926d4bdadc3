//! Identity & Access Control Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - Database implementation, identity-provider client
//! - `presentation/` - HTTP handlers, DTOs, router, admin guard
//!
//! ## Features
//! - Local registration (patient/doctor) and login
//! - Stateless HMAC-signed session tokens (24h), cookie + body delivery
//! - Single-use, time-bounded password-recovery tokens
//! - Google identity federation with idempotent create-or-link
//! - Admin-gated doctor approval lifecycle (PENDING/APPROVED/SUSPENDED/BANNED)
//!
//! ## Security Model
//! - New digests use Argon2id (PHC format); legacy plain credentials keep
//!   verifying until an explicit migration retires them
//! - Password recovery never reveals whether an email is registered
//! - Reset-token redemption is atomic; no token is redeemable twice
//! - Moderation writes are scoped to doctor rows at the store

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;
pub mod token;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use infra::google::GoogleVerifier;
pub use infra::postgres::PgIdentityRepository;
pub use presentation::router::identity_router;
pub use token::{Claims, TokenIssuer};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgIdentityRepository as IdentityStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
