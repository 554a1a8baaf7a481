use std::sync::Arc;

use async_trait::async_trait;
use carecode_auth_types::{Claims, JwtError, Role, TokenKind};
use secrecy::SecretString;
use time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{clock::Clock, jwt},
    domain::entities::user::LocalUser,
    use_cases::user::UserRepo,
};

pub const TOKEN_TYPE: &str = "Bearer";

/// Revoked refresh-token ids, kept only as long as the token could still verify.
#[async_trait]
pub trait RevokedTokenStore: Send + Sync {
    /// Atomically mark `jti` revoked for `ttl_secs`.
    /// Returns `false` if it was already revoked.
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> AppResult<bool>;

    async fn is_revoked(&self, jti: &str) -> AppResult<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Issues, validates and rotates access/refresh tokens.
///
/// The access-token path is pure: `validate` and `extract_claims` only verify the
/// signature and expiry. Refresh tokens are additionally checked against the
/// revocation store and are single-use.
pub struct TokenService {
    secret: SecretString,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
    users: Arc<dyn UserRepo>,
    revoked: Arc<dyn RevokedTokenStore>,
}

impl TokenService {
    pub fn new(
        secret: SecretString,
        access_ttl: Duration,
        refresh_ttl: Duration,
        clock: Arc<dyn Clock>,
        users: Arc<dyn UserRepo>,
        revoked: Arc<dyn RevokedTokenStore>,
    ) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
            clock,
            users,
            revoked,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    // ========================================================================
    // Issuance
    // ========================================================================

    pub fn issue_access_token(
        &self,
        subject_id: Uuid,
        email: Option<&str>,
        role: Role,
        display_name: Option<&str>,
    ) -> AppResult<String> {
        let now = self.clock.unix_timestamp();
        let claims = Claims {
            sub: subject_id.to_string(),
            email: email.map(str::to_string),
            role: Some(role),
            name: display_name.map(str::to_string),
            typ: TokenKind::Access,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.access_ttl.whole_seconds(),
        };
        jwt::sign(&claims, &self.secret)
    }

    pub fn issue_refresh_token(&self, subject_id: Uuid, email: Option<&str>) -> AppResult<String> {
        let now = self.clock.unix_timestamp();
        let claims = Claims {
            sub: subject_id.to_string(),
            email: email.map(str::to_string),
            role: None,
            name: None,
            typ: TokenKind::Refresh,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.refresh_ttl.whole_seconds(),
        };
        jwt::sign(&claims, &self.secret)
    }

    pub fn issue_pair(&self, user: &LocalUser) -> AppResult<TokenPair> {
        let email = user.email.as_deref();
        Ok(TokenPair {
            access_token: self.issue_access_token(
                user.id,
                email,
                user.role,
                Some(&user.display_name),
            )?,
            refresh_token: self.issue_refresh_token(user.id, email)?,
            token_type: TOKEN_TYPE,
            expires_in: self.access_ttl.whole_seconds(),
        })
    }

    // ========================================================================
    // Access tokens
    // ========================================================================

    /// True iff `token` is an access token with a valid signature that has not expired.
    pub fn validate(&self, token: &str) -> bool {
        self.verify(token).is_ok_and(|claims| claims.is_access())
    }

    /// Verified claims of an access or refresh token.
    pub fn extract_claims(&self, token: &str) -> AppResult<Claims> {
        self.verify(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            AppError::InvalidToken
        })
    }

    fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        jwt::verify(token, &self.secret, self.clock.unix_timestamp())
    }

    // ========================================================================
    // Refresh tokens
    // ========================================================================

    /// Verified claims of a refresh token that has not been revoked.
    pub async fn validate_refresh(&self, token: &str) -> AppResult<Claims> {
        let claims = self
            .verify(token)
            .map_err(|e| {
                debug!(error = %e, "Refresh token rejected");
                AppError::InvalidRefreshToken
            })
            .and_then(|claims| {
                if claims.is_refresh() {
                    Ok(claims)
                } else {
                    Err(AppError::InvalidRefreshToken)
                }
            })?;

        if self.revoked.is_revoked(&claims.jti).await? {
            return Err(AppError::InvalidRefreshToken);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The user is re-read so the new access token carries the current role and
    /// display name. The presented refresh token is revoked; presenting it again fails.
    #[instrument(skip_all)]
    pub async fn rotate(&self, refresh_token: &str) -> AppResult<(TokenPair, LocalUser)> {
        let claims = self.validate_refresh(refresh_token).await?;
        let subject_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidRefreshToken)?;

        let user = self
            .users
            .get_by_id(subject_id)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;
        if !user.is_active {
            warn!(user_id = %user.id, "Refresh rejected for inactive account");
            return Err(AppError::InvalidRefreshToken);
        }

        let remaining = claims.remaining_secs(self.clock.unix_timestamp());
        if !self.revoked.revoke(&claims.jti, remaining).await? {
            warn!(user_id = %user.id, "Refresh token reused");
            return Err(AppError::InvalidRefreshToken);
        }

        let pair = self.issue_pair(&user)?;
        Ok((pair, user))
    }

    /// Revoke a refresh token for the rest of its lifetime. Anything that is not a
    /// currently valid refresh token is ignored.
    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> AppResult<()> {
        let now = self.clock.unix_timestamp();
        match self.verify(refresh_token) {
            Ok(claims) if claims.is_refresh() => {
                self.revoked
                    .revoke(&claims.jti, claims.remaining_secs(now))
                    .await?;
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => {
                debug!(error = %e, "Ignoring revocation of unverifiable token");
                Ok(())
            }
        }
    }
}
