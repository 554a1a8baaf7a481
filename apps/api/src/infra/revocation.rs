use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use super::InfraError;
use crate::{
    app_error::{AppError, AppResult},
    use_cases::token::RevokedTokenStore,
};

/// Redis-backed revocation set for refresh tokens.
///
/// Each revoked `jti` is a key that expires together with the token it names, so the
/// set never outgrows the refresh tokens that could still verify.
#[derive(Clone)]
pub struct RedisRevokedTokenStore {
    manager: ConnectionManager,
}

impl RedisRevokedTokenStore {
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        Ok(Self { manager })
    }

    fn key(jti: &str) -> String {
        format!("revoked_refresh:{jti}")
    }
}

#[async_trait]
impl RevokedTokenStore for RedisRevokedTokenStore {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> AppResult<bool> {
        let mut conn = self.manager.clone();

        // SET NX EX: only the first revocation of a jti succeeds.
        let set: Option<String> = redis::cmd("SET")
            .arg(Self::key(jti))
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs.max(1))
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to revoke refresh token: {e}")))?;

        Ok(set.is_some())
    }

    async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        conn.exists(Self::key(jti))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check revocation: {e}")))
    }
}
