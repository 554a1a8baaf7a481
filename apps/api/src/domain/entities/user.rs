use carecode_auth_types::{Role, UserDetails};
use chrono::NaiveDateTime;
use uuid::Uuid;

use super::identity_provider::IdentityProvider;

/// A user record as held by the user store.
///
/// Local accounts carry a `password_hash`; federated accounts carry
/// `provider` + `provider_user_id` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub password_hash: Option<String>,
    pub provider: Option<IdentityProvider>,
    pub provider_user_id: Option<String>,
    pub registration_completed: bool,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl LocalUser {
    pub fn is_federated(&self) -> bool {
        self.provider.is_some()
    }

    pub fn to_details(&self) -> UserDetails {
        UserDetails {
            id: self.id.to_string(),
            email: self.email.clone(),
            name: self.display_name.clone(),
            role: self.role,
            is_active: self.is_active,
            email_verified: self.email_verified,
            provider: self.provider.map(|p| p.to_string()),
            registration_completed: self.registration_completed,
            last_login_at: self
                .last_login_at
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// Fields for inserting a user. The store assigns `created_at`/`updated_at`.
#[derive(Debug, Clone)]
pub struct NewLocalUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: String,
    pub role: Role,
    pub email_verified: bool,
    pub password_hash: Option<String>,
    pub provider: Option<IdentityProvider>,
    pub provider_user_id: Option<String>,
    pub registration_completed: bool,
    pub last_login_at: Option<NaiveDateTime>,
}
