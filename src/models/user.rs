use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Dashboard role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Cleaner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Cleaner => write!(f, "cleaner"),
        }
    }
}

/// Row of the `users` table, keyed by the auth identity id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
}

impl UserProfile {
    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Insert payload for the `users` table
#[derive(Debug, Clone, Serialize)]
pub struct NewUserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: Role,
}
