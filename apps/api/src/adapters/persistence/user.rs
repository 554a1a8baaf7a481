use std::str::FromStr;

use async_trait::async_trait;
use carecode_auth_types::Role;
use chrono::NaiveDateTime;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::{
        identity_provider::IdentityProvider,
        user::{LocalUser, NewLocalUser},
    },
    use_cases::user::UserRepo,
};

const USER_COLUMNS: &str = "id, email, display_name, role, is_active, email_verified, \
     password_hash, provider, provider_user_id, registration_completed, last_login_at, \
     created_at, updated_at";

fn row_to_user(row: PgRow) -> AppResult<LocalUser> {
    let role: String = row.get("role");
    let role = Role::from_str(&role)
        .map_err(|_| AppError::Internal(format!("Unknown role in users table: {role}")))?;

    let provider: Option<String> = row.get("provider");
    let provider = provider
        .map(|p| {
            IdentityProvider::from_str(&p)
                .map_err(|_| AppError::Internal(format!("Unknown provider in users table: {p}")))
        })
        .transpose()?;

    Ok(LocalUser {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        role,
        is_active: row.get("is_active"),
        email_verified: row.get("email_verified"),
        password_hash: row.get("password_hash"),
        provider,
        provider_user_id: row.get("provider_user_id"),
        registration_completed: row.get("registration_completed"),
        last_login_at: row.get("last_login_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<LocalUser>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        row.map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<LocalUser>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        row.map(row_to_user).transpose()
    }

    async fn get_by_provider(
        &self,
        provider: IdentityProvider,
        provider_user_id: &str,
    ) -> AppResult<Option<LocalUser>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider = $1 AND provider_user_id = $2"
        ))
        .bind(provider.as_ref())
        .bind(provider_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        row.map(row_to_user).transpose()
    }

    async fn create(&self, user: &NewLocalUser) -> AppResult<LocalUser> {
        let row = sqlx::query(&format!(
            r#"
                INSERT INTO users (
                    id, email, display_name, role, email_verified, password_hash,
                    provider, provider_user_id, registration_completed, last_login_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(user.email.as_deref())
        .bind(&user.display_name)
        .bind(user.role.as_ref())
        .bind(user.email_verified)
        .bind(user.password_hash.as_deref())
        .bind(user.provider.as_ref().map(|p| p.as_ref()))
        .bind(user.provider_user_id.as_deref())
        .bind(user.registration_completed)
        .bind(user.last_login_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        row_to_user(row)
    }

    async fn link_provider(
        &self,
        id: Uuid,
        provider: IdentityProvider,
        provider_user_id: &str,
    ) -> AppResult<LocalUser> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE users
                SET provider = $2, provider_user_id = $3, email_verified = TRUE, updated_at = (NOW() AT TIME ZONE 'utc')
                WHERE id = $1
                RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(provider.as_ref())
        .bind(provider_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        row_to_user(row)
    }

    async fn record_login(&self, id: Uuid, at: NaiveDateTime) -> AppResult<LocalUser> {
        let row = sqlx::query(&format!(
            "UPDATE users SET last_login_at = $2, updated_at = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        row_to_user(row)
    }

    async fn complete_registration(
        &self,
        id: Uuid,
        display_name: &str,
        role: Role,
    ) -> AppResult<LocalUser> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE users
                SET display_name = $2, role = $3, registration_completed = TRUE, updated_at = (NOW() AT TIME ZONE 'utc')
                WHERE id = $1
                RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(display_name)
        .bind(role.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        row_to_user(row)
    }

    async fn display_name_taken(&self, display_name: &str, excluding: Uuid) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE display_name = $1 AND id <> $2)",
        )
        .bind(display_name)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(taken)
    }
}
