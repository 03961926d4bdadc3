//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{account::Account, reset_token::ResetToken};
use crate::domain::repository::{AccountRepository, ResetTokenRepository};
use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, approval_status::ApprovalStatus,
    credential::StoredCredential, email::Email,
};
use crate::error::{IdentityError, IdentityResult};

/// PostgreSQL-backed identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map an insert failure, surfacing the unique-constraint race as the
/// duplicate-email error the gateway expects.
fn into_create_error(err: sqlx::Error) -> IdentityError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return IdentityError::EmailTaken;
        }
    }
    IdentityError::Database(err)
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

const ACCOUNT_COLUMNS: &str = r#"
    id,
    email,
    name,
    password,
    role,
    is_admin,
    is_approved,
    status,
    phone,
    specialization,
    experience_years,
    bio,
    avatar_url,
    created_at
"#;

impl AccountRepository for PgIdentityRepository {
    async fn create(&self, account: &Account) -> IdentityResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id,
                email,
                name,
                password,
                role,
                is_admin,
                is_approved,
                status,
                phone,
                specialization,
                experience_years,
                bio,
                avatar_url,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(&account.name)
        .bind(account.credential.as_ref().map(|c| c.as_stored_str()))
        .bind(account.role.code())
        .bind(account.is_admin)
        .bind(account.is_approved)
        .bind(account.status.map(|s| s.code()))
        .bind(&account.phone)
        .bind(&account.specialization)
        .bind(account.experience_years)
        .bind(&account.bio)
        .bind(&account.avatar_url)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(into_create_error)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_doctor_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND role = 'doctor'"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn update_password(&self, email: &Email, stored: &str) -> IdentityResult<()> {
        sqlx::query("UPDATE accounts SET password = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(stored)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_approval(
        &self,
        account_id: &AccountId,
        status: ApprovalStatus,
    ) -> IdentityResult<u64> {
        // Status and mirror boolean in one statement; the WHERE clause is
        // what makes moderation of a non-doctor id a zero-row no-op.
        let affected = sqlx::query(
            r#"
            UPDATE accounts SET
                status = $2,
                is_approved = $3
            WHERE id = $1 AND role = 'doctor'
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(status.code())
        .bind(status.is_approved())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }

    async fn delete_doctor(&self, account_id: &AccountId) -> IdentityResult<u64> {
        let affected = sqlx::query("DELETE FROM accounts WHERE id = $1 AND role = 'doctor'")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected)
    }

    async fn create_preferences(&self, account_id: &AccountId) -> IdentityResult<()> {
        sqlx::query(
            "INSERT INTO preferences (account_id) VALUES ($1) ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Reset Token Repository Implementation
// ============================================================================

impl ResetTokenRepository for PgIdentityRepository {
    async fn insert(&self, token: &ResetToken) -> IdentityResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reset_tokens (
                token,
                email,
                expires_at
            ) VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.token)
        .bind(token.email.as_str())
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn redeem(&self, token: &str) -> IdentityResult<Option<Email>> {
        // Single atomic delete-returning: of two concurrent redemptions,
        // at most one observes the row.
        let email = sqlx::query_scalar::<_, String>(
            "DELETE FROM reset_tokens WHERE token = $1 AND expires_at > $2 RETURNING email",
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(email.map(Email::from_db))
    }

    async fn delete_expired(&self) -> IdentityResult<u64> {
        let deleted = sqlx::query("DELETE FROM reset_tokens WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(tokens_deleted = deleted, "Cleaned up expired reset tokens");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    name: String,
    password: Option<String>,
    role: String,
    is_admin: bool,
    is_approved: bool,
    status: Option<String>,
    phone: Option<String>,
    specialization: Option<String>,
    experience_years: Option<i32>,
    bio: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> IdentityResult<Account> {
        let role = AccountRole::from_code(&self.role)
            .ok_or_else(|| IdentityError::Internal(format!("Invalid role in store: {}", self.role)))?;

        let status = self
            .status
            .map(|code| {
                ApprovalStatus::from_code(&code).ok_or_else(|| {
                    IdentityError::Internal(format!("Invalid status in store: {}", code))
                })
            })
            .transpose()?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.id),
            email: Email::from_db(self.email),
            name: self.name,
            credential: self.password.map(StoredCredential::from_stored),
            role,
            is_admin: self.is_admin,
            is_approved: self.is_approved,
            status,
            phone: self.phone,
            specialization: self.specialization,
            experience_years: self.experience_years,
            bio: self.bio,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
        })
    }
}
