//! Test app state builder for use case and HTTP-level testing.
//!
//! `TestAppStateBuilder` wires the real use cases to in-memory mocks: a user repo,
//! a revocation set, a fixed clock and a stub Kakao adapter.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;

use crate::{
    adapters::http::{app_state::AppState, exemptions::ExemptionPolicy},
    domain::entities::{identity_provider::IdentityProvider, user::LocalUser},
    infra::config::AppConfig,
    test_utils::{
        CountingPasswordHasher, FixedClock, InMemoryRevokedTokenStore, InMemoryUserRepo,
        StubFederationAdapter, TEST_BCRYPT_COST, TEST_JWT_SECRET,
    },
    use_cases::{
        federation_registry::FederationRegistry, identity::IdentityResolver,
        session::SessionBootstrapper, token::TokenService,
    },
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user = create_test_user(|u| u.email = Some("a@x.com".to_string()));
///
/// let builder = TestAppStateBuilder::new().with_user(user);
/// let clock = builder.clock();
/// let app_state = builder.build();
/// ```
pub struct TestAppStateBuilder {
    users: Arc<InMemoryUserRepo>,
    revoked: Arc<InMemoryRevokedTokenStore>,
    clock: Arc<FixedClock>,
    kakao: Arc<StubFederationAdapter>,
    passwords: Arc<CountingPasswordHasher>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
            revoked: Arc::new(InMemoryRevokedTokenStore::new()),
            clock: Arc::new(FixedClock::default()),
            kakao: Arc::new(StubFederationAdapter::new(IdentityProvider::Kakao)),
            passwords: Arc::new(CountingPasswordHasher::new()),
        }
    }

    /// Add a user to the in-memory store.
    pub fn with_user(self, user: LocalUser) -> Self {
        self.users.insert(user);
        self
    }

    pub fn users(&self) -> Arc<InMemoryUserRepo> {
        self.users.clone()
    }

    pub fn revoked(&self) -> Arc<InMemoryRevokedTokenStore> {
        self.revoked.clone()
    }

    pub fn clock(&self) -> Arc<FixedClock> {
        self.clock.clone()
    }

    /// The only configured provider. Google is left unconfigured.
    pub fn kakao(&self) -> Arc<StubFederationAdapter> {
        self.kakao.clone()
    }

    pub fn passwords(&self) -> Arc<CountingPasswordHasher> {
        self.passwords.clone()
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        let config = Arc::new(AppConfig {
            jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
            access_token_ttl: Duration::hours(1),
            refresh_token_ttl: Duration::days(30),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            bind_addr: "127.0.0.1:8080".parse::<SocketAddr>().unwrap(),
            redis_url: String::new(),
            database_url: String::new(),
            federation_timeout: std::time::Duration::from_secs(10),
            bcrypt_cost: TEST_BCRYPT_COST,
            kakao: None,
            google: None,
        });

        let token_service = Arc::new(TokenService::new(
            SecretString::new(TEST_JWT_SECRET.into()),
            config.access_token_ttl,
            config.refresh_token_ttl,
            self.clock.clone(),
            self.users.clone(),
            self.revoked.clone(),
        ));

        let identities = Arc::new(IdentityResolver::new(self.users.clone(), self.clock.clone()));
        let federation = Arc::new(FederationRegistry::new().with_adapter(self.kakao.clone()));

        let sessions = Arc::new(SessionBootstrapper::new(
            self.users.clone(),
            token_service.clone(),
            identities,
            federation,
            self.clock.clone(),
            self.passwords.clone(),
        ));

        AppState {
            config,
            token_service,
            sessions,
            exemptions: Arc::new(ExemptionPolicy::default()),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
