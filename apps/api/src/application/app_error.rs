use thiserror::Error;

pub use carecode_auth_types::ErrorCode;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown account")]
    UnknownAccount,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Authorization code expired or already used")]
    InvalidGrant,

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Malformed provider response: {0}")]
    MalformedProfile(String),

    #[error("Unknown identity provider: {0}")]
    UnknownProvider(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;
