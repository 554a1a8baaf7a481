use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::{ExposeSecret, SecretString};
use time::Duration;
use url::Url;

/// Minimum length of `JWT_SECRET` in bytes (HS256 key size).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// OAuth client registration and endpoints for one identity provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub authorize_url: Url,
    pub token_url: Url,
    pub profile_url: Url,
}

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub redis_url: String,
    pub database_url: String,
    /// Total timeout for each outbound identity provider call.
    pub federation_timeout: std::time::Duration,
    pub bcrypt_cost: u32,
    /// `None` unless `KAKAO_CLIENT_ID` is set.
    pub kakao: Option<ProviderConfig>,
    /// `None` unless `GOOGLE_CLIENT_ID` is set.
    pub google: Option<ProviderConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());
        assert!(
            jwt_secret.expose_secret().len() >= MIN_JWT_SECRET_BYTES,
            "JWT_SECRET must be at least {MIN_JWT_SECRET_BYTES} bytes"
        );

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 3_600);
        let refresh_token_ttl_days: i64 = get_env_default("REFRESH_TOKEN_TTL_DAYS", 30);

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:8080".parse().unwrap());
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let database_url: String = get_env("DATABASE_URL");
        let federation_timeout_secs: u64 = get_env_default("FEDERATION_TIMEOUT_SECS", 10);
        let bcrypt_cost: u32 = get_env_default("BCRYPT_COST", bcrypt::DEFAULT_COST);

        let kakao = provider_from_env(
            "KAKAO",
            "https://kauth.kakao.com/oauth/authorize",
            "https://kauth.kakao.com/oauth/token",
            "https://kapi.kakao.com/v2/user/me",
        );
        let google = provider_from_env(
            "GOOGLE",
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
            "https://openidconnect.googleapis.com/v1/userinfo",
        );

        Self {
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            refresh_token_ttl: Duration::days(refresh_token_ttl_days),
            cors_origin,
            bind_addr,
            redis_url,
            database_url,
            federation_timeout: std::time::Duration::from_secs(federation_timeout_secs),
            bcrypt_cost,
            kakao,
            google,
        }
    }
}

/// Reads `{PREFIX}_CLIENT_ID` and friends. A provider without a client id is disabled.
/// Endpoint URLs can be overridden with `{PREFIX}_AUTHORIZE_URL`, `{PREFIX}_TOKEN_URL` and
/// `{PREFIX}_PROFILE_URL`.
fn provider_from_env(
    prefix: &str,
    authorize_url: &str,
    token_url: &str,
    profile_url: &str,
) -> Option<ProviderConfig> {
    let client_id = std::env::var(format!("{prefix}_CLIENT_ID"))
        .ok()
        .filter(|id| !id.trim().is_empty())?;

    let url = |suffix: &str, default: &str| -> Url {
        let var = format!("{prefix}_{suffix}");
        std::env::var(&var)
            .unwrap_or_else(|_| default.to_string())
            .parse()
            .unwrap_or_else(|e| panic!("{var} must be a valid URL: {e}"))
    };

    Some(ProviderConfig {
        client_id,
        client_secret: std::env::var(format!("{prefix}_CLIENT_SECRET")).unwrap_or_default(),
        redirect_uri: redirect_uri_from_env(prefix),
        authorize_url: url("AUTHORIZE_URL", authorize_url),
        token_url: url("TOKEN_URL", token_url),
        profile_url: url("PROFILE_URL", profile_url),
    })
}

/// `{PREFIX}_REDIRECT_URI` is required once a provider is enabled.
fn redirect_uri_from_env(prefix: &str) -> Url {
    let var = format!("{prefix}_REDIRECT_URI");
    let value = std::env::var(&var).unwrap_or_else(|_| panic!("{var} must be set"));
    value
        .parse()
        .unwrap_or_else(|e| panic!("{var} must be a valid URL: {e}"))
}
