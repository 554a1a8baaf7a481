use async_trait::async_trait;
use carecode_auth_types::Role;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::{
        identity_provider::IdentityProvider,
        user::{LocalUser, NewLocalUser},
    },
};

/// User store consumed by the auth core.
///
/// Implementations must enforce uniqueness of `email` and of
/// `(provider, provider_user_id)` themselves and report violations as
/// `AppError::Conflict`; provisioning relies on that to settle concurrent first logins.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<LocalUser>>;

    /// `email` is expected to be normalized (trimmed, lowercase).
    async fn get_by_email(&self, email: &str) -> AppResult<Option<LocalUser>>;

    async fn get_by_provider(
        &self,
        provider: IdentityProvider,
        provider_user_id: &str,
    ) -> AppResult<Option<LocalUser>>;

    async fn create(&self, user: &NewLocalUser) -> AppResult<LocalUser>;

    /// Attach a provider identity to an existing account and mark its email verified.
    async fn link_provider(
        &self,
        id: Uuid,
        provider: IdentityProvider,
        provider_user_id: &str,
    ) -> AppResult<LocalUser>;

    async fn record_login(&self, id: Uuid, at: NaiveDateTime) -> AppResult<LocalUser>;

    async fn complete_registration(
        &self,
        id: Uuid,
        display_name: &str,
        role: Role,
    ) -> AppResult<LocalUser>;

    /// Whether any user other than `excluding` already uses `display_name`.
    async fn display_name_taken(&self, display_name: &str, excluding: Uuid) -> AppResult<bool>;
}
