//! Authorization-code plumbing shared by the identity provider adapters.
//!
//! Each call is exactly one HTTP round trip through a client built by
//! [`http_client::build_client`]. Failures are classified into [`FederationError`] here so
//! the per-provider adapters only deal with their profile shapes.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;

use crate::{
    application::ports::federation::{FederationError, ProviderToken},
    domain::entities::identity_provider::IdentityProvider,
    infra::{InfraError, config::ProviderConfig, http_client},
};

/// Kakao reports a consumed or expired authorization code with this error code.
const KAKAO_INVALID_GRANT_CODE: &str = "KOE320";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
}

impl TokenErrorResponse {
    fn is_invalid_grant(&self) -> bool {
        self.error.as_deref() == Some("invalid_grant")
            || self.error_code.as_deref() == Some(KAKAO_INVALID_GRANT_CODE)
    }
}

pub struct OAuthClient {
    provider: IdentityProvider,
    config: ProviderConfig,
    http: Client,
}

impl OAuthClient {
    pub fn new(
        provider: IdentityProvider,
        config: ProviderConfig,
        timeout: Duration,
    ) -> Result<Self, InfraError> {
        let http = http_client::build_client(timeout).map_err(|source| InfraError::HttpClient {
            provider: provider.display_name(),
            source,
        })?;
        Ok(Self {
            provider,
            config,
            http,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Provider authorize URL for the code flow, plus any provider-specific parameters.
    pub fn authorization_url(&self, extra: &[(&str, &str)]) -> String {
        let mut url: Url = self.config.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", self.config.redirect_uri.as_str())
                .append_pair("response_type", "code");
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }
        url.into()
    }

    /// `grant_type=authorization_code` form POST to the token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<ProviderToken, FederationError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];
        if !self.config.client_secret.is_empty() {
            form.push(("client_secret", self.config.client_secret.as_str()));
        }

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let error: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            if status.is_client_error() && error.is_invalid_grant() {
                debug!(provider = %self.provider, "Authorization code rejected");
                return Err(FederationError::InvalidGrant {
                    provider: self.provider,
                });
            }
            warn!(
                provider = %self.provider,
                status = %status,
                error = ?error.error,
                description = ?error.error_description,
                "Token exchange failed"
            );
            return Err(self.status_error(status, "token exchange failed"));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            FederationError::MalformedProfile {
                provider: self.provider,
                message: format!("unparseable token response: {e}"),
            }
        })?;

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FederationError::MalformedProfile {
                provider: self.provider,
                message: "token response has no access_token".to_string(),
            })?;

        Ok(ProviderToken {
            access_token: SecretString::new(access_token.into()),
            expires_in: token.expires_in,
        })
    }

    /// Bearer GET against the profile endpoint, deserialized into `T`.
    pub async fn fetch_profile<T: DeserializeOwned>(
        &self,
        token: &ProviderToken,
    ) -> Result<T, FederationError> {
        let response = self
            .http
            .get(self.config.profile_url.clone())
            .bearer_auth(token.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!(provider = %self.provider, status = %status, "Profile fetch failed");
            return Err(self.status_error(status, "profile fetch failed"));
        }

        serde_json::from_str(&body).map_err(|e| FederationError::MalformedProfile {
            provider: self.provider,
            message: e.to_string(),
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> FederationError {
        let message = if e.is_timeout() {
            "request timed out".to_string()
        } else {
            e.to_string()
        };
        warn!(provider = %self.provider, error = %message, "Provider request failed");
        FederationError::ProviderUnavailable {
            provider: self.provider,
            status: None,
            message,
        }
    }

    fn status_error(&self, status: StatusCode, message: &str) -> FederationError {
        FederationError::ProviderUnavailable {
            provider: self.provider,
            status: Some(status.as_u16()),
            message: message.to_string(),
        }
    }
}

/// Trimmed, non-empty value or `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
