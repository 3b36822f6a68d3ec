use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role value the backend assigns to administrators
pub const ADMIN_ROLE: u8 = 1;

/// User record as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: u8,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Admins are flagged either by role or by an explicit `isAdmin`
    pub fn has_admin_role(&self) -> bool {
        self.role == ADMIN_ROLE || self.is_admin
    }

    /// Align the `is_admin` flag with the role
    pub fn normalized(mut self) -> Self {
        self.is_admin = self.has_admin_role();
        self
    }
}
