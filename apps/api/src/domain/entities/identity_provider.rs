use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// External OAuth2 identity provider a local user can be federated through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IdentityProvider {
    Kakao,
    Google,
}

impl IdentityProvider {
    /// Human-readable display name for the provider
    pub fn display_name(&self) -> &'static str {
        match self {
            IdentityProvider::Kakao => "Kakao",
            IdentityProvider::Google => "Google",
        }
    }
}
