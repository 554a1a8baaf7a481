use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    adapters::http::{app_state::AppState, principal::Principal},
    use_cases::token::TokenService,
};

const BEARER_SCHEME: &str = "Bearer";

/// Result of inspecting one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Exempt,
    NoToken,
    Unauthenticated,
    Authenticated(Principal),
}

/// Establishes the request principal from a bearer access token.
///
/// Never rejects: handlers decide whether a principal is required.
pub async fn authentication_gate(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = evaluate(
        &app_state.token_service,
        app_state.exemptions.is_exempt(request.uri().path()),
        request.headers(),
    );
    apply(outcome, &mut request);
    next.run(request).await
}

pub fn evaluate(tokens: &TokenService, exempt: bool, headers: &HeaderMap) -> GateOutcome {
    if exempt {
        return GateOutcome::Exempt;
    }

    let Some(token) = bearer_token(headers) else {
        return GateOutcome::NoToken;
    };

    if !tokens.validate(token) {
        tracing::debug!("Bearer token rejected");
        return GateOutcome::Unauthenticated;
    }

    match tokens.extract_claims(token).and_then(Principal::try_from) {
        Ok(principal) => GateOutcome::Authenticated(principal),
        Err(_) => GateOutcome::Unauthenticated,
    }
}

/// Any principal already on the request is replaced or removed.
pub fn apply(outcome: GateOutcome, request: &mut Request) {
    let extensions = request.extensions_mut();
    match outcome {
        GateOutcome::Authenticated(principal) => {
            tracing::debug!(subject_id = %principal.subject_id, role = %principal.role, "Principal established");
            extensions.insert(principal);
        }
        GateOutcome::Exempt | GateOutcome::NoToken | GateOutcome::Unauthenticated => {
            extensions.remove::<Principal>();
        }
    }
}

/// The auth scheme is matched case-insensitively (RFC 6750).
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return None;
    }
    Some(token)
}
