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

const GOOGLE_SCOPES: &str = "openid email profile";

/// OpenID Connect userinfo response
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    /// Google user ID (stable identifier)
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
}

/// Google sign-in through the authorization code flow and the userinfo endpoint.
pub struct GoogleFederationAdapter {
    client: OAuthClient,
}

impl GoogleFederationAdapter {
    pub fn new(config: ProviderConfig, timeout: Duration) -> Result<Self, InfraError> {
        Ok(Self {
            client: OAuthClient::new(IdentityProvider::Google, config, timeout)?,
        })
    }
}

#[async_trait]
impl FederationAdapter for GoogleFederationAdapter {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::Google
    }

    fn authorization_url(&self) -> String {
        self.client.authorization_url(&[("scope", GOOGLE_SCOPES)])
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
        let info: GoogleUserInfo = self.client.fetch_profile(token).await?;

        let provider_user_id = info.sub.trim().to_string();
        if provider_user_id.is_empty() {
            return Err(FederationError::MalformedProfile {
                provider: IdentityProvider::Google,
                message: "empty sub".to_string(),
            });
        }

        Ok(FederatedIdentity {
            provider: IdentityProvider::Google,
            provider_user_id,
            email: if info.email_verified {
                non_blank(info.email)
            } else {
                None
            },
            display_name: non_blank(info.name),
        })
    }
}
