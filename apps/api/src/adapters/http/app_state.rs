use std::sync::Arc;

use crate::{
    adapters::http::exemptions::ExemptionPolicy,
    infra::config::AppConfig,
    use_cases::{session::SessionBootstrapper, token::TokenService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub token_service: Arc<TokenService>,
    pub sessions: Arc<SessionBootstrapper>,
    pub exemptions: Arc<ExemptionPolicy>,
}
