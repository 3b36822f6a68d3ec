use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a record: either a bare id or a populated user document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    User {
        #[serde(rename = "_id", alias = "id", default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        email: String,
    },
}

impl UserRef {
    pub fn display_name(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::User { name, id, .. } if name.is_empty() => id,
            UserRef::User { name, .. } => name,
        }
    }
}

/// Feedback left by a member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Feedback {
    /// Rating rendered as stars, e.g. `★★★☆☆`
    pub fn stars(&self) -> String {
        let filled = usize::from(self.rating.min(5));
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}
