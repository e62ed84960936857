use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

/// Something a role is allowed to do. Handlers ask for capabilities, never roles.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Capability {
    RequestLeave,
    ReviewLeave,
}

impl Role {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Admin | Role::Manager => &[Capability::RequestLeave, Capability::ReviewLeave],
            Role::Employee => &[Capability::RequestLeave],
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}
