use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Handling state of a contact query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Pending,
    Resolved,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactStatus::Pending => write!(f, "pending"),
            ContactStatus::Resolved => write!(f, "resolved"),
            ContactStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Contact query submitted through the "contact us" form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactQuery {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a new contact query
#[derive(Debug, Clone, Serialize)]
pub struct NewContactQuery {
    pub name: String,
    pub email: String,
    pub city: String,
    pub phone: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_pending() {
        let query: ContactQuery =
            serde_json::from_str(r#"{"_id":"c1","name":"Meera","message":"Timings?"}"#).unwrap();
        assert_eq!(query.status, ContactStatus::Pending);

        let resolved: ContactQuery =
            serde_json::from_str(r#"{"_id":"c2","status":"resolved"}"#).unwrap();
        assert_eq!(resolved.status.to_string(), "resolved");
    }

    #[test]
    fn test_unrecognised_status_keeps_the_list() {
        let queries: Vec<ContactQuery> = serde_json::from_str(
            r#"[{"_id":"c1","status":"in-progress"},{"_id":"c2","status":"pending"}]"#,
        )
        .unwrap();
        assert_eq!(queries[0].status, ContactStatus::Unknown);
        assert_eq!(queries[1].status, ContactStatus::Pending);
    }
}
