//! Identity Middleware
//!
//! Admin guard for the moderation routes: verifies the session token from
//! the cookie (or a bearer header) and requires the admin claim.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::error::IdentityError;
use crate::token::TokenIssuer;

/// Guard state
#[derive(Clone)]
pub struct AdminGuardState {
    pub config: Arc<IdentityConfig>,
}

/// Middleware requiring a valid session token with the admin claim.
pub async fn require_admin(
    State(state): State<AdminGuardState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let headers = req.headers();

    let token = platform::cookie::extract_cookie(headers, &state.config.cookie_name).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(TokenIssuer::extract_bearer_token)
            .map(str::to_string)
    });

    let Some(token) = token else {
        return Err(IdentityError::AuthRequired.into_response());
    };

    let issuer = TokenIssuer::new(&state.config.token_secret, state.config.token_ttl);
    let claims = issuer.verify(&token).map_err(|e| e.into_response())?;

    if !claims.is_admin {
        return Err(IdentityError::AdminRequired.into_response());
    }

    tracing::debug!(admin = %claims.sub, "Admin action authorized");

    Ok(next.run(req).await)
}
