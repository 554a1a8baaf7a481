use async_trait::async_trait;
use bcrypt::{hash, verify};

use crate::app_error::{AppError, AppResult};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (bcrypt only reads the first 72 bytes)
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {e}")))?
}

/// Verify a password against a stored bcrypt hash on the blocking pool.
///
/// Returns `Ok(false)` on mismatch. A hash that bcrypt cannot parse is an error.
pub async fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {e}")))?
}

/// Password hashing port, so login and registration can be exercised without a fixed cost.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> AppResult<String>;

    /// `Ok(false)` on mismatch.
    async fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool>;
}

/// bcrypt at a fixed cost, on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> AppResult<String> {
        hash_password(password, self.cost).await
    }

    async fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        verify_password(password, password_hash).await
    }
}

/// Length checks for new passwords, measured in bytes.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hashed = hash_password("correct horse", TEST_COST).await.unwrap();

        assert_ne!(hashed, "correct horse");
        assert!(verify_password("correct horse", &hashed).await.unwrap());
        assert!(!verify_password("wrong horse", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_unparseable_hash_is_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").await.is_err());
    }

    #[tokio::test]
    async fn test_bcrypt_hasher_uses_configured_cost() {
        let hasher = BcryptPasswordHasher::new(TEST_COST);
        let hashed = hasher.hash("correct horse").await.unwrap();

        assert!(hashed.starts_with("$2b$04$"));
        assert!(hasher.verify("correct horse", &hashed).await.unwrap());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"a".repeat(72)).is_ok());
        assert!(validate_password(&"a".repeat(73)).is_err());
    }
}
