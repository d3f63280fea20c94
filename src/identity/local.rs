use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::identity::{AuthSession, Identity, IdentityProvider};
use crate::jwt::JwtConfig;
use crate::utils::{hash_password, utc_now, verify_password};

/// Credential backend over the local `credentials` table.
#[derive(Clone)]
pub struct LocalIdentityProvider {
    pool: SqlitePool,
    jwt: Arc<JwtConfig>,
}

impl LocalIdentityProvider {
    pub fn new(pool: SqlitePool, jwt: Arc<JwtConfig>) -> Self {
        Self { pool, jwt }
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM credentials WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn insert_credential(&self, id: Uuid, email: &str, password: &str) -> AppResult<()> {
        let hash = hash_password(password)?;
        let now = utc_now();

        sqlx::query(
            "INSERT INTO credentials (user_id, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(email)
        .bind(hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT user_id, password_hash FROM credentials WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        // Same message for unknown email and wrong password.
        let (user_id, password_hash) =
            row.ok_or_else(|| AppError::unauthorized("invalid email or password"))?;

        if !verify_password(password, &password_hash)? {
            return Err(AppError::unauthorized("invalid email or password"));
        }

        let id = Uuid::parse_str(&user_id)
            .map_err(|_| AppError::internal("stored credential has a malformed user id"))?;
        let token = self.jwt.encode(id, email)?;

        Ok(AuthSession {
            token,
            identity: Identity {
                id,
                email: email.to_string(),
            },
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Identity> {
        if self.email_taken(email).await? {
            return Err(AppError::conflict("email is already registered"));
        }

        let id = Uuid::new_v4();
        self.insert_credential(id, email, password).await?;

        Ok(Identity {
            id,
            email: email.to_string(),
        })
    }

    async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE credentials SET reset_requested_at = ? WHERE email = ?")
            .bind(utc_now())
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!(email, "password reset requested");
        }

        // Unknown addresses get the same answer as known ones.
        Ok(())
    }

    async fn admin_create_account(&self, email: &str, password: &str) -> AppResult<Uuid> {
        if self.email_taken(email).await? {
            return Err(AppError::conflict("email is already registered"));
        }

        let id = Uuid::new_v4();
        self.insert_credential(id, email, password).await?;

        Ok(id)
    }

    async fn admin_delete_account(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM credentials WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn admin_set_password(&self, user_id: Uuid, new_password: &str) -> AppResult<()> {
        let hash = hash_password(new_password)?;

        let result = sqlx::query(
            "UPDATE credentials SET password_hash = ?, reset_requested_at = NULL, updated_at = ? \
             WHERE user_id = ?",
        )
        .bind(hash)
        .bind(utc_now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("account not found"));
        }

        Ok(())
    }
}
