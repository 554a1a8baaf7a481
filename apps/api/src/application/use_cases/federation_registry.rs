use std::{collections::HashMap, str::FromStr, sync::Arc};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::federation::FederationAdapter,
    domain::entities::identity_provider::IdentityProvider,
};

/// Enabled identity providers, keyed by provider.
///
/// A provider is present only when it was configured at startup.
#[derive(Default, Clone)]
pub struct FederationRegistry {
    adapters: HashMap<IdentityProvider, Arc<dyn FederationAdapter>>,
}

impl FederationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn FederationAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    pub fn get(&self, provider: IdentityProvider) -> AppResult<Arc<dyn FederationAdapter>> {
        self.adapters
            .get(&provider)
            .cloned()
            .ok_or_else(|| AppError::UnknownProvider(provider.to_string()))
    }

    /// Resolve a provider from a URL path segment such as `kakao`.
    pub fn resolve(&self, segment: &str) -> AppResult<IdentityProvider> {
        let provider = IdentityProvider::from_str(segment)
            .map_err(|_| AppError::UnknownProvider(segment.to_string()))?;
        if self.adapters.contains_key(&provider) {
            Ok(provider)
        } else {
            Err(AppError::UnknownProvider(segment.to_string()))
        }
    }

    pub fn providers(&self) -> Vec<IdentityProvider> {
        let mut providers: Vec<_> = self.adapters.keys().copied().collect();
        providers.sort_by_key(|p| p.as_ref().to_string());
        providers
    }
}
