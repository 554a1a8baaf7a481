use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError),
            // Unknown account, wrong password and inactive account look the same to clients.
            AppError::UnknownAccount | AppError::BadCredentials | AppError::AccountInactive => {
                (StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials)
            }
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
            AppError::InvalidRole(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidRole),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, ErrorCode::InvalidToken),
            AppError::InvalidRefreshToken => {
                (StatusCode::UNAUTHORIZED, ErrorCode::InvalidRefreshToken)
            }
            AppError::InvalidGrant => (StatusCode::BAD_REQUEST, ErrorCode::InvalidGrant),
            AppError::ProviderUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ProviderUnavailable)
            }
            AppError::MalformedProfile(_) => (StatusCode::BAD_GATEWAY, ErrorCode::MalformedProfile),
            AppError::UnknownProvider(_) => (StatusCode::NOT_FOUND, ErrorCode::UnknownProvider),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated),
            AppError::EmailTaken => (StatusCode::CONFLICT, ErrorCode::EmailTaken),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::info!(error = ?self, "Request rejected");
        }

        // Only messages written for clients are echoed back.
        let message = match self {
            AppError::InvalidInput(msg) => Some(msg),
            AppError::InvalidRole(role) => Some(format!("Role not allowed: {role}")),
            AppError::UnknownProvider(provider) => Some(format!("Unknown provider: {provider}")),
            AppError::Conflict(_) => Some("Email is already linked to another account".into()),
            _ => None,
        };

        error_resp(status, code, message)
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
