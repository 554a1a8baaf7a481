use axum::{extract::FromRequestParts, http::request::Parts};
use carecode_auth_types::{Claims, Role};
use uuid::Uuid;

use crate::app_error::AppError;

/// Authenticated caller, stored in request extensions by the authentication gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: Uuid,
    pub role: Role,
    pub email: Option<String>,
}

impl TryFrom<Claims> for Principal {
    type Error = AppError;

    /// Only access-token claims with a uuid subject and a role make a principal.
    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if !claims.is_access() {
            return Err(AppError::InvalidToken);
        }
        let subject_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
        let role = claims.role.ok_or(AppError::InvalidToken)?;
        Ok(Self {
            subject_id,
            role,
            email: claims.email,
        })
    }
}

/// The principal if the gate established one.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Option<Principal>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentPrincipal {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}

/// Rejects with 401 `UNAUTHENTICATED` when the request carries no principal.
#[derive(Debug, Clone)]
pub struct RequirePrincipal(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for RequirePrincipal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or(AppError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carecode_auth_types::TokenKind;

    fn claims(typ: TokenKind, role: Option<Role>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: Some("a@x.com".to_string()),
            role,
            name: None,
            typ,
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            exp: 3600,
        }
    }

    #[test]
    fn access_claims_become_principal() {
        let c = claims(TokenKind::Access, Some(Role::Admin));
        let sub = c.sub.clone();
        let principal = Principal::try_from(c).unwrap();
        assert_eq!(principal.subject_id.to_string(), sub);
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn unusable_claims_are_rejected() {
        assert!(Principal::try_from(claims(TokenKind::Refresh, Some(Role::Parent))).is_err());
        assert!(Principal::try_from(claims(TokenKind::Access, None)).is_err());

        let mut bad_sub = claims(TokenKind::Access, Some(Role::Parent));
        bad_sub.sub = "not-a-uuid".to_string();
        assert!(Principal::try_from(bad_sub).is_err());
    }
}
