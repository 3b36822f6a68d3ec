use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::auth::UserResponse;
use super::{ApiClient, ApiError, MessageResponse};
use crate::models::{AdminStats, ContactQuery, Feedback, Subscription, SubscriptionDraft, User};

/// Entries shown in the dashboard's "recent" panels
pub const RECENT_LIMIT: u32 = 5;

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct FeedbacksResponse {
    #[serde(default)]
    feedbacks: Vec<Feedback>,
}

#[derive(Debug, Deserialize)]
struct ContactsResponse {
    #[serde(default)]
    contacts: Vec<ContactQuery>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionsResponse {
    #[serde(default)]
    subscriptions: Vec<Subscription>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Serialize)]
struct PageQuery {
    page: u32,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct LimitQuery {
    limit: u32,
}

/// One page of the subscriber listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberPage {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub current_page: u32,
}

fn first_page() -> u32 {
    1
}

/// Dashboard counts plus the counts that could not be fetched
#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    pub stats: AdminStats,
    pub failed: Vec<String>,
}

impl ApiClient {
    /// Fetch all dashboard counts concurrently. A failed count reads as zero
    /// and is listed in `failed`; an expired session fails the whole report.
    pub async fn admin_stats(&self) -> Result<StatsReport, ApiError> {
        const ENDPOINTS: [(&str, &str); 5] = [
            ("users", "/admin/users/count"),
            ("plans", "/admin/plans/count"),
            ("subscribers", "/admin/subscriptions/count"),
            ("contacts", "/admin/contacts/count"),
            ("feedbacks", "/admin/feedbacks/count"),
        ];

        let results = join_all(ENDPOINTS.iter().map(|(key, path)| async move {
            (*key, self.get::<CountResponse>(path).await)
        }))
        .await;

        let mut report = StatsReport::default();
        for (key, result) in results {
            let total = match result {
                Ok(count) => count.total,
                Err(e @ ApiError::SessionExpired { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(count = key, "Failed to fetch count: {}", e);
                    report.failed.push(format!("{key}: {e}"));
                    0
                }
            };

            match key {
                "users" => report.stats.users = total,
                "plans" => report.stats.plans = total,
                "subscribers" => report.stats.subscribers = total,
                "contacts" => report.stats.contacts = total,
                _ => report.stats.feedbacks = total,
            }
        }

        Ok(report)
    }

    /// Most recent feedback entries, newest first
    pub async fn admin_feedbacks(&self, limit: u32) -> Result<Vec<Feedback>, ApiError> {
        let response: FeedbacksResponse = self
            .get_with_query("/admin/feedbacks", &LimitQuery { limit })
            .await?;
        Ok(response.feedbacks)
    }

    /// Most recent contact queries, newest first
    pub async fn admin_contacts(&self, limit: u32) -> Result<Vec<ContactQuery>, ApiError> {
        let response: ContactsResponse = self
            .get_with_query("/admin/contacts", &LimitQuery { limit })
            .await?;
        Ok(response.contacts)
    }

    pub async fn subscribers(&self, page: u32, limit: u32) -> Result<SubscriberPage, ApiError> {
        self.get_with_query("/admin/subscriptions", &PageQuery { page, limit })
            .await
    }

    pub async fn admin_user(&self, id: &str) -> Result<User, ApiError> {
        let response: UserResponse = self.get(&format!("/admin/users/{id}")).await?;
        response
            .user
            .ok_or_else(|| ApiError::NotFound(format!("User {id}")))
    }

    pub async fn admin_user_subscriptions(&self, id: &str) -> Result<Vec<Subscription>, ApiError> {
        let response: SubscriptionsResponse = self
            .get(&format!("/admin/users/{id}/subscriptions"))
            .await?;
        Ok(response.subscriptions)
    }

    pub async fn admin_users(&self) -> Result<Vec<User>, ApiError> {
        let response: UsersResponse = self.get("/admin/users").await?;
        Ok(response.users)
    }

    pub async fn create_subscription(&self, draft: &SubscriptionDraft) -> Result<String, ApiError> {
        let response: MessageResponse = self
            .post("/subscription/create-subscription", draft)
            .await?;
        tracing::info!(plan = %draft.plan_id, user = %draft.user_name, "Created subscription");
        Ok(response.message_or("Subscription created successfully"))
    }
}
