use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::{app_error::AppError, domain::entities::identity_provider::IdentityProvider};

// ============================================================================
// Port Types - Provider-agnostic identity types
// ============================================================================

/// Access token issued by an identity provider for a single profile fetch.
#[derive(Debug)]
pub struct ProviderToken {
    pub access_token: SecretString,
    /// Lifetime in seconds, when the provider reports one
    pub expires_in: Option<i64>,
}

/// Canonical identity extracted from a provider profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub provider: IdentityProvider,
    /// Stable user identifier at the provider
    pub provider_user_id: String,
    /// Only set when the provider reports a verified address
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Failure talking to an identity provider.
#[derive(Debug, Error)]
pub enum FederationError {
    /// The authorization code was already consumed or has expired
    #[error("{provider} rejected the authorization code")]
    InvalidGrant { provider: IdentityProvider },

    /// Network failure, timeout, or an unexpected error status
    #[error("{provider} unavailable: {message}")]
    ProviderUnavailable {
        provider: IdentityProvider,
        status: Option<u16>,
        message: String,
    },

    /// The provider answered but required fields were missing or unparseable
    #[error("malformed {provider} response: {message}")]
    MalformedProfile {
        provider: IdentityProvider,
        message: String,
    },
}

impl FederationError {
    /// Whether the caller may retry the same call later. An invalid grant needs a fresh
    /// authorization code instead.
    pub fn is_retryable(&self) -> bool {
        match self {
            FederationError::InvalidGrant { .. } => false,
            FederationError::ProviderUnavailable { status, .. } => {
                status.is_none_or(|status| status >= 500)
            }
            FederationError::MalformedProfile { .. } => false,
        }
    }
}

impl From<FederationError> for AppError {
    fn from(value: FederationError) -> Self {
        match value {
            FederationError::InvalidGrant { .. } => AppError::InvalidGrant,
            FederationError::ProviderUnavailable {
                provider,
                status,
                message,
            } => match status {
                Some(status) => {
                    AppError::ProviderUnavailable(format!("{provider} ({status}): {message}"))
                }
                None => AppError::ProviderUnavailable(format!("{provider}: {message}")),
            },
            FederationError::MalformedProfile { provider, message } => {
                AppError::MalformedProfile(format!("{provider}: {message}"))
            }
        }
    }
}

/// Identity provider port.
///
/// One implementation per provider. Each call is a single HTTP round trip with no
/// retries: authorization codes are single-use, so a failed exchange is surfaced as is.
#[async_trait]
pub trait FederationAdapter: Send + Sync {
    fn provider(&self) -> IdentityProvider;

    /// URL the client is sent to in order to obtain an authorization code.
    fn authorization_url(&self) -> String;

    /// Exchange an authorization code at the provider's token endpoint
    /// (`grant_type=authorization_code`).
    async fn exchange_code_for_provider_token(
        &self,
        code: &str,
    ) -> Result<ProviderToken, FederationError>;

    /// Fetch the provider profile and normalize it into a [`FederatedIdentity`].
    async fn fetch_profile(&self, token: &ProviderToken)
    -> Result<FederatedIdentity, FederationError>;
}
