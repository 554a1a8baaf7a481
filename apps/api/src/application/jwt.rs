use carecode_auth_types::{Claims, JwtError, decode_token, encode_token};
use secrecy::{ExposeSecret, SecretString};

use crate::app_error::{AppError, AppResult};

pub fn sign(claims: &Claims, secret: &SecretString) -> AppResult<String> {
    encode_token(claims, secret.expose_secret().as_bytes())
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Verifies signature and expiry at `now` (Unix seconds).
pub fn verify(token: &str, secret: &SecretString, now: i64) -> Result<Claims, JwtError> {
    decode_token(token, secret.expose_secret().as_bytes(), now)
}
