use crate::{
    adapters::http::{app_state::AppState, exemptions::ExemptionPolicy},
    application::{
        clock::{Clock, SystemClock},
        password::BcryptPasswordHasher,
    },
    infra::{
        InfraError, config::AppConfig, google_federation_adapter::GoogleFederationAdapter,
        kakao_federation_adapter::KakaoFederationAdapter, postgres_persistence,
        revocation::RedisRevokedTokenStore,
    },
    use_cases::{
        federation_registry::FederationRegistry,
        identity::IdentityResolver,
        session::SessionBootstrapper,
        token::{RevokedTokenStore, TokenService},
        user::UserRepo,
    },
};
use secrecy::{ExposeSecret, SecretString};
use std::fs::File;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let revoked = Arc::new(RedisRevokedTokenStore::new(&config.redis_url).await?);
    let federation = Arc::new(build_federation_registry(&config)?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let user_repo_arc = postgres_arc.clone() as Arc<dyn UserRepo>;
    let revoked_arc = revoked as Arc<dyn RevokedTokenStore>;

    let token_service = Arc::new(TokenService::new(
        SecretString::new(config.jwt_secret.expose_secret().into()),
        config.access_token_ttl,
        config.refresh_token_ttl,
        clock.clone(),
        user_repo_arc.clone(),
        revoked_arc,
    ));

    let identities = Arc::new(IdentityResolver::new(user_repo_arc.clone(), clock.clone()));

    let sessions = SessionBootstrapper::new(
        user_repo_arc,
        token_service.clone(),
        identities,
        federation,
        clock,
        Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
    );

    Ok(AppState {
        config: Arc::new(config),
        token_service,
        sessions: Arc::new(sessions),
        exemptions: Arc::new(ExemptionPolicy::default()),
    })
}

/// One adapter per provider with a configured client id.
pub fn build_federation_registry(config: &AppConfig) -> Result<FederationRegistry, InfraError> {
    let mut registry = FederationRegistry::new();

    if let Some(kakao) = config.kakao.clone() {
        registry = registry.with_adapter(Arc::new(KakaoFederationAdapter::new(
            kakao,
            config.federation_timeout,
        )?));
    }
    if let Some(google) = config.google.clone() {
        registry = registry.with_adapter(Arc::new(GoogleFederationAdapter::new(
            google,
            config.federation_timeout,
        )?));
    }

    let providers = registry.providers();
    if providers.is_empty() {
        warn!("No identity providers configured; federated login is disabled");
    } else {
        info!(?providers, "Identity providers enabled");
    }

    Ok(registry)
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "carecode_auth_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
