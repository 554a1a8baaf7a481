pub mod auth;
pub mod federation;
pub mod health;

use axum::Router;
use carecode_auth_types::AuthTokenResponse;

use crate::{
    adapters::http::app_state::AppState, domain::entities::user::LocalUser,
    use_cases::token::TokenPair,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router().merge(federation::router()))
        .merge(health::router())
}

fn token_response(
    tokens: TokenPair,
    user: &LocalUser,
    is_new_user: Option<bool>,
) -> AuthTokenResponse {
    AuthTokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: tokens.token_type.to_string(),
        expires_in: tokens.expires_in,
        is_new_user,
        user: user.to_details(),
    }
}
