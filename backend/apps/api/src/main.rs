//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use identity::domain::repository::ResetTokenRepository;
use identity::{IdentityConfig, PgIdentityRepository, identity_router};
use platform::mail::{ConsoleMailer, HttpMailer};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,identity=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired reset tokens
    // Errors here should not prevent server startup
    let repo = PgIdentityRepository::new(pool.clone());
    match repo.delete_expired().await {
        Ok(deleted) => {
            tracing::info!(tokens_deleted = deleted, "Reset token cleanup completed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Reset token cleanup failed, continuing anyway"
            );
        }
    }

    // Identity configuration
    let mut config = if cfg!(debug_assertions) {
        IdentityConfig::development()
    } else {
        // In production, load the signing secret from environment
        let secret_b64 = env::var("IDENTITY_TOKEN_SECRET")
            .expect("IDENTITY_TOKEN_SECRET must be set in production");
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&secret_bytes);
        IdentityConfig {
            token_secret: secret,
            ..IdentityConfig::default()
        }
    };

    if let Ok(mail_from) = env::var("MAIL_FROM") {
        config.mail_from = mail_from;
    }
    if let Ok(reset_link_base) = env::var("RESET_LINK_BASE") {
        config.reset_link_base = reset_link_base;
    }

    // Mail transport: HTTP delivery API when configured, console otherwise
    let identity_routes = match (env::var("MAIL_API_URL"), env::var("MAIL_API_KEY")) {
        (Ok(url), Ok(key)) => identity_router(repo, HttpMailer::new(url, key), config),
        _ => {
            tracing::warn!("MAIL_API_URL/MAIL_API_KEY not set; recovery mail goes to the log");
            identity_router(repo, ConsoleMailer, config)
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", identity_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31113));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
