//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use carecode_auth_types::Role;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    application::ports::federation::FederatedIdentity,
    domain::entities::{identity_provider::IdentityProvider, user::LocalUser},
};

/// Signing key used by every test token service.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-test-jwt-secret-0123456789";

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Create an active, local parent account with sensible defaults.
///
/// The email is derived from the id so several default users never collide.
pub fn create_test_user(overrides: impl FnOnce(&mut LocalUser)) -> LocalUser {
    let id = Uuid::new_v4();
    let mut user = LocalUser {
        id,
        email: Some(format!("{}@example.com", id.simple())),
        display_name: "Test Parent".to_string(),
        role: Role::Parent,
        is_active: true,
        email_verified: true,
        password_hash: None,
        provider: None,
        provider_user_id: None,
        registration_completed: true,
        last_login_at: None,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut user);
    user
}

/// Create a Kakao identity with a verified email and a nickname.
pub fn create_test_identity(overrides: impl FnOnce(&mut FederatedIdentity)) -> FederatedIdentity {
    let mut identity = FederatedIdentity {
        provider: IdentityProvider::Kakao,
        provider_user_id: "4102938475".to_string(),
        email: Some("parent@kakao.test".to_string()),
        display_name: Some("민지".to_string()),
    };
    overrides(&mut identity);
    identity
}

/// bcrypt hash of `password` at [`TEST_BCRYPT_COST`].
pub fn test_password_hash(password: &str) -> String {
    bcrypt::hash(password, TEST_BCRYPT_COST).expect("bcrypt hash should succeed")
}

/// Fixed timestamp for reproducible records.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 12, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid test datetime")
}
