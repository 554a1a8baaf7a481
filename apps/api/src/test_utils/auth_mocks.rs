//! In-memory mock implementations of the auth ports.
//!
//! The user repo enforces the same uniqueness rules as the database (email and the
//! provider identity pair) and reports violations as `AppError::Conflict`.

use async_trait::async_trait;
use carecode_auth_types::Role;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        clock::Clock,
        password::{BcryptPasswordHasher, PasswordHasher},
        ports::federation::{FederatedIdentity, FederationAdapter, FederationError, ProviderToken},
    },
    domain::entities::{
        identity_provider::IdentityProvider,
        user::{LocalUser, NewLocalUser},
    },
    use_cases::{token::RevokedTokenStore, user::UserRepo},
};

use super::{TEST_BCRYPT_COST, create_test_identity};

// ============================================================================
// InMemoryUserRepo
// ============================================================================

/// In-memory implementation of UserRepo for testing.
#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, LocalUser>>,
    hidden_provider_lookups: AtomicUsize,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<LocalUser>) -> Self {
        let map: HashMap<Uuid, LocalUser> = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Mutex::new(map),
            hidden_provider_lookups: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` provider lookups miss, simulating a row committed by a
    /// concurrent request right after the lookup ran.
    pub fn hide_provider_lookups(self, count: usize) -> Self {
        self.hidden_provider_lookups.store(count, Ordering::SeqCst);
        self
    }

    pub fn insert(&self, user: LocalUser) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get(&self, id: Uuid) -> Option<LocalUser> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn update(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut LocalUser),
    ) -> AppResult<LocalUser> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        apply(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<LocalUser>> {
        Ok(self.get(id))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<LocalUser>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn get_by_provider(
        &self,
        provider: IdentityProvider,
        provider_user_id: &str,
    ) -> AppResult<Option<LocalUser>> {
        let hidden = self
            .hidden_provider_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }

        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| {
                u.provider == Some(provider)
                    && u.provider_user_id.as_deref() == Some(provider_user_id)
            })
            .cloned())
    }

    async fn create(&self, new_user: &NewLocalUser) -> AppResult<LocalUser> {
        let mut users = self.users.lock().unwrap();

        if users.contains_key(&new_user.id) {
            return Err(AppError::Conflict("users_pkey".into()));
        }
        if new_user.email.is_some() && users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict("users_email_key".into()));
        }
        if new_user.provider.is_some()
            && users.values().any(|u| {
                u.provider == new_user.provider && u.provider_user_id == new_user.provider_user_id
            })
        {
            return Err(AppError::Conflict("users_provider_identity_key".into()));
        }

        let user = LocalUser {
            id: new_user.id,
            email: new_user.email.clone(),
            display_name: new_user.display_name.clone(),
            role: new_user.role,
            is_active: true,
            email_verified: new_user.email_verified,
            password_hash: new_user.password_hash.clone(),
            provider: new_user.provider,
            provider_user_id: new_user.provider_user_id.clone(),
            registration_completed: new_user.registration_completed,
            last_login_at: new_user.last_login_at,
            created_at: new_user.last_login_at,
            updated_at: new_user.last_login_at,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn link_provider(
        &self,
        id: Uuid,
        provider: IdentityProvider,
        provider_user_id: &str,
    ) -> AppResult<LocalUser> {
        let taken = self.users.lock().unwrap().values().any(|u| {
            u.id != id
                && u.provider == Some(provider)
                && u.provider_user_id.as_deref() == Some(provider_user_id)
        });
        if taken {
            return Err(AppError::Conflict("users_provider_identity_key".into()));
        }

        self.update(id, |u| {
            u.provider = Some(provider);
            u.provider_user_id = Some(provider_user_id.to_string());
            u.email_verified = true;
        })
    }

    async fn record_login(&self, id: Uuid, at: NaiveDateTime) -> AppResult<LocalUser> {
        self.update(id, |u| u.last_login_at = Some(at))
    }

    async fn complete_registration(
        &self,
        id: Uuid,
        display_name: &str,
        role: Role,
    ) -> AppResult<LocalUser> {
        self.update(id, |u| {
            u.display_name = display_name.to_string();
            u.role = role;
            u.registration_completed = true;
        })
    }

    async fn display_name_taken(&self, display_name: &str, excluding: Uuid) -> AppResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.id != excluding && u.display_name == display_name))
    }
}

// ============================================================================
// InMemoryRevokedTokenStore
// ============================================================================

/// Revocation set keyed by jti. Records the TTL it was asked to keep each entry for.
#[derive(Default)]
pub struct InMemoryRevokedTokenStore {
    pub entries: Mutex<HashMap<String, u64>>,
}

impl InMemoryRevokedTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl_of(&self, jti: &str) -> Option<u64> {
        self.entries.lock().unwrap().get(jti).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl RevokedTokenStore for InMemoryRevokedTokenStore {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(jti) {
            return Ok(false);
        }
        entries.insert(jti.to_string(), ttl_secs);
        Ok(true)
    }

    async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        Ok(self.entries.lock().unwrap().contains_key(jti))
    }
}

// ============================================================================
// FixedClock
// ============================================================================

/// Clock that only moves when told to. Starts at 2025-01-01T00:00:00Z.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// CountingPasswordHasher
// ============================================================================

/// Real bcrypt at the test cost, counting every hash and verify.
pub struct CountingPasswordHasher {
    inner: BcryptPasswordHasher,
    hashes: AtomicUsize,
    verifies: AtomicUsize,
}

impl CountingPasswordHasher {
    pub fn new() -> Self {
        Self {
            inner: BcryptPasswordHasher::new(TEST_BCRYPT_COST),
            hashes: AtomicUsize::new(0),
            verifies: AtomicUsize::new(0),
        }
    }

    pub fn hashes(&self) -> usize {
        self.hashes.load(Ordering::SeqCst)
    }

    pub fn verifies(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }
}

impl Default for CountingPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordHasher for CountingPasswordHasher {
    async fn hash(&self, password: &str) -> AppResult<String> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        self.inner.hash(password).await
    }

    async fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(password, password_hash).await
    }
}

// ============================================================================
// StubFederationAdapter
// ============================================================================

type ErrorFactory = Box<dyn Fn(IdentityProvider) -> FederationError + Send + Sync>;

/// Identity provider stand-in. Returns a fixed identity for any code unless told to fail.
pub struct StubFederationAdapter {
    provider: IdentityProvider,
    identity: Mutex<FederatedIdentity>,
    exchange_error: Mutex<Option<ErrorFactory>>,
    profile_error: Mutex<Option<ErrorFactory>>,
    exchanged_codes: Mutex<Vec<String>>,
}

impl StubFederationAdapter {
    pub fn new(provider: IdentityProvider) -> Self {
        Self {
            provider,
            identity: Mutex::new(create_test_identity(|i| i.provider = provider)),
            exchange_error: Mutex::new(None),
            profile_error: Mutex::new(None),
            exchanged_codes: Mutex::new(Vec::new()),
        }
    }

    /// Identity returned by the next profile fetches. Its provider is forced to this stub's.
    pub fn set_identity(&self, mut identity: FederatedIdentity) {
        identity.provider = self.provider;
        *self.identity.lock().unwrap() = identity;
    }

    pub fn fail_exchange_with(
        &self,
        error: impl Fn(IdentityProvider) -> FederationError + Send + Sync + 'static,
    ) {
        *self.exchange_error.lock().unwrap() = Some(Box::new(error));
    }

    pub fn fail_profile_with(
        &self,
        error: impl Fn(IdentityProvider) -> FederationError + Send + Sync + 'static,
    ) {
        *self.profile_error.lock().unwrap() = Some(Box::new(error));
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged_codes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FederationAdapter for StubFederationAdapter {
    fn provider(&self) -> IdentityProvider {
        self.provider
    }

    fn authorization_url(&self) -> String {
        format!(
            "https://{}.test/oauth/authorize?client_id=stub&response_type=code",
            self.provider
        )
    }

    async fn exchange_code_for_provider_token(
        &self,
        code: &str,
    ) -> Result<ProviderToken, FederationError> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        if let Some(error) = self.exchange_error.lock().unwrap().as_ref() {
            return Err(error(self.provider));
        }
        Ok(ProviderToken {
            access_token: SecretString::new(format!("provider-token-{code}").into()),
            expires_in: Some(21_599),
        })
    }

    async fn fetch_profile(
        &self,
        _token: &ProviderToken,
    ) -> Result<FederatedIdentity, FederationError> {
        if let Some(error) = self.profile_error.lock().unwrap().as_ref() {
            return Err(error(self.provider));
        }
        Ok(self.identity.lock().unwrap().clone())
    }
}
