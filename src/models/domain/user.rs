use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type UserId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Default view an authenticated user of this role lands on.
    pub fn landing_path(&self) -> &'static str {
        match self {
            UserRole::User => "/user/dashboard",
            UserRole::Admin => "/admin/dashboard",
        }
    }
}

/// Identity returned by the backend for the signed-in account. Replaced
/// wholesale on every login or verify, never edited in place.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(flatten)]
    pub profile: HashMap<String, serde_json::Value>,
}

impl UserIdentity {
    pub fn new(id: UserId, email: &str, full_name: &str, role: UserRole) -> Self {
        UserIdentity {
            id,
            email: email.to_string(),
            full_name: Some(full_name.to_string()),
            role,
            profile: HashMap::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}
