use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

use crate::{Claims, JwtError};

/// Signs `claims` into a compact HS256 token.
pub fn encode_token(claims: &Claims, secret: &[u8]) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    Ok(encode(&header, claims, &EncodingKey::from_secret(secret))?)
}

/// Verifies a token and returns its claims.
///
/// # Arguments
/// * `token` - The compact JWT string
/// * `secret` - The shared signing secret
/// * `now` - Current Unix timestamp, supplied by the caller's clock
///
/// Expiry is checked against `now` rather than the system time, with no leeway:
/// a token is accepted only while `now < exp`.
pub fn decode_token(token: &str, secret: &[u8], now: i64) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            let mapped = match e.kind() {
                ErrorKind::InvalidSignature => Some(JwtError::InvalidSignature),
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                    Some(JwtError::InvalidFormat(e.to_string()))
                }
                ErrorKind::Json(_) => Some(JwtError::InvalidClaims(e.to_string())),
                ErrorKind::MissingRequiredClaim(claim) => Some(JwtError::MissingClaim(claim.clone())),
                _ => None,
            };
            mapped.unwrap_or(JwtError::Library(e))
        })?;

    if now >= token_data.claims.exp {
        return Err(JwtError::Expired);
    }

    Ok(token_data.claims)
}
