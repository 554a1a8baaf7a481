use serde::{Deserialize, Serialize};

use crate::Role;

/// Which credential a token is. Signed into every token as the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims for Carecode access and refresh tokens.
///
/// Refresh tokens carry neither `role` nor `name`; their absence is not an
/// authorization signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,

    /// Email address, absent for federated accounts without a provider email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub typ: TokenKind,

    /// Unique token ID, keys the refresh-token revocation set
    pub jti: String,

    /// Token issued at (Unix timestamp)
    pub iat: i64,

    /// Token expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn is_access(&self) -> bool {
        self.typ == TokenKind::Access
    }

    pub fn is_refresh(&self) -> bool {
        self.typ == TokenKind::Refresh
    }

    /// Seconds left before expiry at `now`, zero once expired.
    pub fn remaining_secs(&self, now: i64) -> u64 {
        u64::try_from(self.exp - now).unwrap_or(0)
    }
}
