use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staff role. Managers alone may manage the catalog and user accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Operator,
    Kitchen,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Manager => "manager",
            Role::Operator => "operator",
            Role::Kitchen => "kitchen",
        };
        write!(f, "{}", s)
    }
}

/// A staff account.
///
/// `auth_id` links the profile row to the opaque identity issued by the
/// authentication collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub auth_id: Option<String>,
    pub username: String,
    pub role: Role,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new staff account.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub role: Role,
    pub auth_id: Option<String>,
    pub phone: Option<String>,
}

impl UserCreate {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            auth_id: None,
            phone: None,
        }
    }

    pub fn with_auth_id(mut self, auth_id: impl Into<String>) -> Self {
        self.auth_id = Some(auth_id.into());
        self
    }
}
