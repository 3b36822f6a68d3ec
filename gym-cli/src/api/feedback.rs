use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, MessageResponse};
use crate::models::Feedback;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFeedback<'a> {
    message: &'a str,
    rating: u8,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct FeedbackEdit<'a> {
    message: &'a str,
    rating: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedFeedback {
    updated_feedback: Option<Feedback>,
}

impl ApiClient {
    pub async fn create_feedback(
        &self,
        user_id: &str,
        message: &str,
        rating: u8,
    ) -> Result<String, ApiError> {
        let body = NewFeedback {
            message,
            rating,
            user_id,
        };
        let response: MessageResponse = self.post("/feedback/create-feedback", &body).await?;
        Ok(response.message_or("Feedback submitted successfully!"))
    }

    /// Edit a feedback entry; returns the server's copy when it sends one
    pub async fn update_feedback(
        &self,
        id: &str,
        message: &str,
        rating: u8,
    ) -> Result<Option<Feedback>, ApiError> {
        let response: UpdatedFeedback = self
            .put(
                &format!("/feedback/update-feedback/{id}"),
                &FeedbackEdit { message, rating },
            )
            .await?;
        Ok(response.updated_feedback)
    }

    pub async fn delete_feedback(&self, id: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .delete(&format!("/feedback/delete-feedback/{id}"))
            .await?;
        Ok(())
    }
}
