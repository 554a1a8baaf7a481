use std::sync::Arc;

use carecode_auth_types::Role;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{clock::Clock, ports::federation::FederatedIdentity, validators},
    domain::entities::user::{LocalUser, NewLocalUser},
    use_cases::user::UserRepo,
};

#[derive(Debug, Clone)]
pub struct Resolution {
    pub user: LocalUser,
    /// True only when this call created the user record
    pub is_new_user: bool,
}

/// Maps federated identities onto local users, provisioning on first login.
pub struct IdentityResolver {
    users: Arc<dyn UserRepo>,
    clock: Arc<dyn Clock>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// Find the local user for `identity` or create one.
    ///
    /// Lookup order is the provider key, then the verified email. Concurrent first
    /// logins race on the store's unique provider key; the loser re-reads the winner's
    /// record. Every path stamps `last_login_at`.
    #[instrument(skip(self, identity), fields(provider = %identity.provider, provider_user_id = %identity.provider_user_id))]
    pub async fn resolve_or_provision(&self, identity: &FederatedIdentity) -> AppResult<Resolution> {
        if let Some(user) = self
            .users
            .get_by_provider(identity.provider, &identity.provider_user_id)
            .await?
        {
            return self.existing(user).await;
        }

        if let Some(email) = identity.email.as_deref().map(validators::normalize_email) {
            if let Some(user) = self.users.get_by_email(&email).await? {
                let user = self.link(user, identity).await?;
                return self.existing(user).await;
            }
        }

        let new_user = self.new_user(identity);
        match self.users.create(&new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "Provisioned federated user");
                Ok(Resolution {
                    user,
                    is_new_user: true,
                })
            }
            Err(AppError::Conflict(constraint)) => {
                debug!(%constraint, "Provisioning lost a race, re-reading");
                let user = self
                    .users
                    .get_by_provider(identity.provider, &identity.provider_user_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Conflict("Email is already registered to another account".into())
                    })?;
                self.existing(user).await
            }
            Err(e) => Err(e),
        }
    }

    async fn existing(&self, user: LocalUser) -> AppResult<Resolution> {
        let user = self.users.record_login(user.id, self.clock.naive_now()).await?;
        Ok(Resolution {
            user,
            is_new_user: false,
        })
    }

    async fn link(&self, user: LocalUser, identity: &FederatedIdentity) -> AppResult<LocalUser> {
        // Provisioned concurrently between our provider lookup and this one.
        if user.provider == Some(identity.provider)
            && user.provider_user_id.as_deref() == Some(identity.provider_user_id.as_str())
        {
            return Ok(user);
        }
        if user.is_federated() {
            warn!(user_id = %user.id, "Email already linked to a different provider account");
            return Err(AppError::Conflict(
                "Email is already linked to another account".into(),
            ));
        }
        info!(user_id = %user.id, "Linking provider identity to existing account");
        self.users
            .link_provider(user.id, identity.provider, &identity.provider_user_id)
            .await
    }

    fn new_user(&self, identity: &FederatedIdentity) -> NewLocalUser {
        NewLocalUser {
            id: Uuid::new_v4(),
            email: identity.email.as_deref().map(validators::normalize_email),
            display_name: unique_handle(identity),
            role: Role::Parent,
            email_verified: true,
            password_hash: None,
            provider: Some(identity.provider),
            provider_user_id: Some(identity.provider_user_id.clone()),
            registration_completed: false,
            last_login_at: Some(self.clock.naive_now()),
        }
    }
}

/// `{display name}_{provider user id}`, falling back to the provider name.
pub fn unique_handle(identity: &FederatedIdentity) -> String {
    let base = identity
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(identity.provider.as_ref());
    format!("{base}_{}", identity.provider_user_id)
}
