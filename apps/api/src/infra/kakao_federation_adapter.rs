use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    application::ports::federation::{
        FederatedIdentity, FederationAdapter, FederationError, ProviderToken,
    },
    domain::entities::identity_provider::IdentityProvider,
    infra::{
        InfraError,
        config::ProviderConfig,
        oauth_client::{OAuthClient, non_blank},
    },
};

// ============================================================================
// Kakao API Types
// ============================================================================

/// `GET /v2/user/me`
#[derive(Debug, Deserialize)]
struct KakaoUser {
    id: i64,
    #[serde(default)]
    kakao_account: Option<KakaoAccount>,
    #[serde(default)]
    properties: Option<KakaoProperties>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    is_email_verified: Option<bool>,
    #[serde(default)]
    profile: Option<KakaoProfile>,
}

#[derive(Debug, Deserialize)]
struct KakaoProfile {
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KakaoProperties {
    nickname: Option<String>,
}

impl KakaoUser {
    fn into_identity(self) -> FederatedIdentity {
        let (email, nickname) = match self.kakao_account {
            Some(account) => {
                // Kakao may return an address the user never confirmed, or omit the flag.
                let email = match account.is_email_verified {
                    Some(true) => non_blank(account.email),
                    _ => None,
                };
                (email, non_blank(account.profile.and_then(|p| p.nickname)))
            }
            None => (None, None),
        };

        let display_name =
            nickname.or_else(|| non_blank(self.properties.and_then(|p| p.nickname)));

        FederatedIdentity {
            provider: IdentityProvider::Kakao,
            provider_user_id: self.id.to_string(),
            email,
            display_name,
        }
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Kakao Login (`kauth.kakao.com` / `kapi.kakao.com`).
pub struct KakaoFederationAdapter {
    client: OAuthClient,
}

impl KakaoFederationAdapter {
    pub fn new(config: ProviderConfig, timeout: Duration) -> Result<Self, InfraError> {
        Ok(Self {
            client: OAuthClient::new(IdentityProvider::Kakao, config, timeout)?,
        })
    }
}

#[async_trait]
impl FederationAdapter for KakaoFederationAdapter {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::Kakao
    }

    fn authorization_url(&self) -> String {
        self.client.authorization_url(&[])
    }

    async fn exchange_code_for_provider_token(
        &self,
        code: &str,
    ) -> Result<ProviderToken, FederationError> {
        self.client.exchange_code(code).await
    }

    async fn fetch_profile(
        &self,
        token: &ProviderToken,
    ) -> Result<FederatedIdentity, FederationError> {
        let user: KakaoUser = self.client.fetch_profile(token).await?;
        Ok(user.into_identity())
    }
}
