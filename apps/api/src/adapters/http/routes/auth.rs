//! Password login, registration and token lifecycle routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use carecode_auth_types::{AuthTokenResponse, TokenValidationResponse, UserDetails};
use serde::Deserialize;

use super::token_response;
use crate::{
    adapters::http::{app_state::AppState, json::AppJson, principal::RequirePrincipal},
    app_error::AppResult,
    use_cases::session::Registration,
};

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RegisterPayload {
    email: String,
    password: String,
    name: String,
    role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
    refresh_token: String,
}

#[derive(Deserialize)]
struct ValidatePayload {
    token: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/refresh", post(refresh))
        .route("/validate", post(validate))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// POST /auth/login
async fn login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> AppResult<Json<AuthTokenResponse>> {
    let session = app_state
        .sessions
        .login_with_password(&payload.email, &payload.password)
        .await?;
    Ok(Json(token_response(session.tokens, &session.user, None)))
}

/// POST /auth/register
async fn register(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let session = app_state
        .sessions
        .register(Registration {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            role: payload.role,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(token_response(session.tokens, &session.user, None)),
    ))
}

/// POST /auth/refresh
async fn refresh(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RefreshPayload>,
) -> AppResult<Json<AuthTokenResponse>> {
    let (tokens, user) = app_state
        .token_service
        .rotate(&payload.refresh_token)
        .await?;
    Ok(Json(token_response(tokens, &user, None)))
}

/// POST /auth/validate
/// Reports on an access token without ever failing for a bad one.
async fn validate(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<ValidatePayload>,
) -> Json<TokenValidationResponse> {
    let tokens = &app_state.token_service;
    if !tokens.validate(&payload.token) {
        return Json(TokenValidationResponse::default());
    }

    match tokens.extract_claims(&payload.token) {
        Ok(claims) => Json(TokenValidationResponse {
            valid: true,
            user_id: Some(claims.sub),
            email: claims.email,
            role: claims.role,
        }),
        Err(_) => Json(TokenValidationResponse::default()),
    }
}

/// POST /auth/logout
async fn logout(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RefreshPayload>,
) -> AppResult<StatusCode> {
    app_state
        .token_service
        .revoke_refresh_token(&payload.refresh_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me
async fn me(
    State(app_state): State<AppState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> AppResult<Json<UserDetails>> {
    let user = app_state.sessions.current_user(principal.subject_id).await?;
    Ok(Json(user.to_details()))
}
