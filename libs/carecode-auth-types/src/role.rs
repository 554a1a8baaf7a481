use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Authorization role of a local user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsRefStr, Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Parent,
    Admin,
}

impl Role {
    /// Whether a user may pick this role for themselves (registration, profile completion).
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Parent)
    }
}
