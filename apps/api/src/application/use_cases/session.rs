use std::{str::FromStr, sync::Arc};

use carecode_auth_types::Role;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        clock::Clock,
        password::{self, PasswordHasher},
        validators,
    },
    domain::entities::{
        identity_provider::IdentityProvider,
        user::{LocalUser, NewLocalUser},
    },
    ports::federation::FederationError,
    use_cases::{
        federation_registry::FederationRegistry,
        identity::{IdentityResolver, Resolution},
        token::{TokenPair, TokenService},
        user::UserRepo,
    },
};

/// Issued token pair and the user it was issued for.
#[derive(Debug, Clone)]
pub struct Session {
    pub tokens: TokenPair,
    pub user: LocalUser,
}

#[derive(Debug, Clone)]
pub struct FederatedSession {
    pub session: Session,
    pub is_new_user: bool,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Option<String>,
}

/// Turns credentials (password or provider authorization code) into token pairs.
pub struct SessionBootstrapper {
    users: Arc<dyn UserRepo>,
    tokens: Arc<TokenService>,
    identities: Arc<IdentityResolver>,
    federation: Arc<FederationRegistry>,
    clock: Arc<dyn Clock>,
    passwords: Arc<dyn PasswordHasher>,
    /// Hash compared against when there is no stored hash, so every login pays one verify.
    dummy_hash: OnceCell<String>,
}

const DUMMY_PASSWORD: &str = "carecode-no-such-account";

impl SessionBootstrapper {
    pub fn new(
        users: Arc<dyn UserRepo>,
        tokens: Arc<TokenService>,
        identities: Arc<IdentityResolver>,
        federation: Arc<FederationRegistry>,
        clock: Arc<dyn Clock>,
        passwords: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            tokens,
            identities,
            federation,
            clock,
            passwords,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn federation(&self) -> &FederationRegistry {
        &self.federation
    }

    // ========================================================================
    // Local accounts
    // ========================================================================

    /// Unknown account, wrong password and inactive account are distinct errors
    /// but render identically to the client. Each path runs exactly one password verify.
    #[instrument(skip(self, password))]
    pub async fn login_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = validators::normalize_email(email);

        let Some(user) = self.users.get_by_email(&email).await? else {
            self.verify_against_dummy(password).await?;
            return Err(AppError::UnknownAccount);
        };

        let Some(password_hash) = user.password_hash.as_deref() else {
            info!(user_id = %user.id, "Password login attempted on federated account");
            self.verify_against_dummy(password).await?;
            return Err(AppError::BadCredentials);
        };

        if !self.passwords.verify(password, password_hash).await? {
            return Err(AppError::BadCredentials);
        }

        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        let user = self.users.record_login(user.id, self.clock.naive_now()).await?;
        self.session_for(user)
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> AppResult<Session> {
        let email = validators::normalize_email(&registration.email);
        if !validators::is_valid_email(&email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }
        password::validate_password(&registration.password)?;

        let name = registration.name.trim();
        if !validators::is_valid_display_name(name) {
            return Err(AppError::InvalidInput("Invalid name".into()));
        }

        let role = parse_self_assignable_role(registration.role.as_deref())?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let password_hash = self.passwords.hash(&registration.password).await?;
        let new_user = NewLocalUser {
            id: Uuid::new_v4(),
            email: Some(email),
            display_name: name.to_string(),
            role,
            email_verified: false,
            password_hash: Some(password_hash),
            provider: None,
            provider_user_id: None,
            registration_completed: true,
            last_login_at: Some(self.clock.naive_now()),
        };

        let user = match self.users.create(&new_user).await {
            Ok(user) => user,
            Err(AppError::Conflict(_)) => return Err(AppError::EmailTaken),
            Err(e) => return Err(e),
        };

        info!(user_id = %user.id, "Registered local account");
        self.session_for(user)
    }

    // ========================================================================
    // Federation
    // ========================================================================

    /// Exchange, profile fetch, resolution and issuance run strictly in order; the
    /// first failure ends the login.
    #[instrument(skip(self, code))]
    pub async fn login_with_federation(
        &self,
        provider: IdentityProvider,
        code: &str,
    ) -> AppResult<FederatedSession> {
        if !validators::is_valid_authorization_code(code) {
            return Err(AppError::InvalidInput("Invalid authorization code".into()));
        }

        let adapter = self.federation.get(provider)?;
        let provider_token = adapter
            .exchange_code_for_provider_token(code)
            .await
            .map_err(federation_failure)?;
        debug!(expires_in = ?provider_token.expires_in, "Provider token issued");
        let identity = adapter
            .fetch_profile(&provider_token)
            .await
            .map_err(federation_failure)?;

        let Resolution { user, is_new_user } =
            self.identities.resolve_or_provision(&identity).await?;

        if !user.is_active {
            warn!(user_id = %user.id, "Federated login on inactive account");
            return Err(AppError::AccountInactive);
        }

        Ok(FederatedSession {
            session: self.session_for(user)?,
            is_new_user,
        })
    }

    pub fn authorization_url(&self, provider: IdentityProvider) -> AppResult<String> {
        Ok(self.federation.get(provider)?.authorization_url())
    }

    /// One-time step after a first federated login: pick a role and a display name.
    #[instrument(skip(self))]
    pub async fn complete_federated_registration(
        &self,
        user_id: Uuid,
        provider: IdentityProvider,
        display_name: &str,
        role: &str,
    ) -> AppResult<LocalUser> {
        let role = parse_self_assignable_role(Some(role))?;

        let name = display_name.trim();
        if !validators::is_valid_display_name(name) {
            return Err(AppError::InvalidInput("Invalid name".into()));
        }

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if user.provider != Some(provider) {
            return Err(AppError::InvalidInput(format!(
                "Account is not linked to {}",
                provider.display_name()
            )));
        }
        if user.registration_completed {
            return Err(AppError::InvalidInput("Registration already completed".into()));
        }

        let name = if self.users.display_name_taken(name, user.id).await? {
            format!("{name}_{}", user.provider_user_id.as_deref().unwrap_or_default())
        } else {
            name.to_string()
        };

        let user = self.users.complete_registration(user.id, &name, role).await?;
        info!(user_id = %user.id, role = %user.role, "Completed federated registration");
        Ok(user)
    }

    pub async fn current_user(&self, user_id: Uuid) -> AppResult<LocalUser> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn verify_against_dummy(&self, password: &str) -> AppResult<()> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| self.passwords.hash(DUMMY_PASSWORD))
            .await?;
        self.passwords.verify(password, dummy_hash).await?;
        Ok(())
    }

    fn session_for(&self, user: LocalUser) -> AppResult<Session> {
        let tokens = self.tokens.issue_pair(&user)?;
        Ok(Session { tokens, user })
    }
}

fn federation_failure(err: FederationError) -> AppError {
    warn!(error = %err, retryable = err.is_retryable(), "Federated login failed");
    err.into()
}

/// Parse a role chosen by the user. Defaults to PARENT; ADMIN is never self-assigned.
fn parse_self_assignable_role(role: Option<&str>) -> AppResult<Role> {
    let Some(raw) = role.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Role::Parent);
    };
    let role = Role::from_str(raw).map_err(|_| AppError::InvalidRole(raw.to_string()))?;
    if !role.is_self_assignable() {
        return Err(AppError::InvalidRole(raw.to_string()));
    }
    Ok(role)
}
