use serde::{Deserialize, Serialize};

use crate::Role;

/// Public view of a local user, embedded in auth responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    /// User ID
    pub id: String,

    pub email: Option<String>,

    /// Display name
    pub name: String,

    pub role: Role,

    pub is_active: bool,

    pub email_verified: bool,

    /// Identity provider for federated accounts ("kakao", "google"), None for local accounts
    pub provider: Option<String>,

    /// False until a federated user has picked a name and role
    pub registration_completed: bool,

    /// When the user last logged in (ISO 8601 format)
    pub last_login_at: Option<String>,
}

/// Token pair issued by login, registration, refresh and federation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Only set by federation logins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new_user: Option<bool>,
    pub user: UserDetails,
}

/// Result of `POST /auth/validate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidationResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}
