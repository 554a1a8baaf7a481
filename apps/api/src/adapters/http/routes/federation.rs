//! Identity provider login routes (`/auth/{provider}/...`).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use carecode_auth_types::{AuthTokenResponse, UserDetails};
use serde::{Deserialize, Serialize};

use super::token_response;
use crate::{
    adapters::http::{app_state::AppState, json::AppJson, principal::RequirePrincipal},
    app_error::{AppError, AppResult},
};

#[derive(Deserialize)]
struct CodeQuery {
    code: Option<String>,
}

#[derive(Deserialize)]
struct CompleteRegistrationPayload {
    name: String,
    role: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderSummary {
    provider: String,
    display_name: &'static str,
}

#[derive(Serialize)]
struct ProvidersResponse {
    providers: Vec<ProviderSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginUrlResponse {
    provider: String,
    login_url: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/providers", get(providers))
        .route("/{provider}/login", post(login))
        .route("/{provider}/login-url", get(login_url))
        .route(
            "/{provider}/complete-registration",
            post(complete_registration),
        )
}

/// GET /auth/providers
async fn providers(State(app_state): State<AppState>) -> Json<ProvidersResponse> {
    let providers = app_state
        .sessions
        .federation()
        .providers()
        .into_iter()
        .map(|provider| ProviderSummary {
            provider: provider.to_string(),
            display_name: provider.display_name(),
        })
        .collect();
    Json(ProvidersResponse { providers })
}

/// POST /auth/{provider}/login?code=...
async fn login(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CodeQuery>,
) -> AppResult<Json<AuthTokenResponse>> {
    let provider = app_state.sessions.federation().resolve(&provider)?;
    let code = query
        .code
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".into()))?;

    let result = app_state
        .sessions
        .login_with_federation(provider, &code)
        .await?;

    Ok(Json(token_response(
        result.session.tokens,
        &result.session.user,
        Some(result.is_new_user),
    )))
}

/// GET /auth/{provider}/login-url
async fn login_url(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
) -> AppResult<Json<LoginUrlResponse>> {
    let provider = app_state.sessions.federation().resolve(&provider)?;
    Ok(Json(LoginUrlResponse {
        provider: provider.to_string(),
        login_url: app_state.sessions.authorization_url(provider)?,
    }))
}

/// POST /auth/{provider}/complete-registration
async fn complete_registration(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    RequirePrincipal(principal): RequirePrincipal,
    AppJson(payload): AppJson<CompleteRegistrationPayload>,
) -> AppResult<Json<UserDetails>> {
    let provider = app_state.sessions.federation().resolve(&provider)?;
    let user = app_state
        .sessions
        .complete_federated_registration(
            principal.subject_id,
            provider,
            &payload.name,
            &payload.role,
        )
        .await?;
    Ok(Json(user.to_details()))
}
