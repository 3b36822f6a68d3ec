use serde::Deserialize;
use serde_json::json;

use super::{ApiClient, ApiError, MessageResponse};
use crate::models::{ContactQuery, ContactStatus, NewContactQuery};

#[derive(Debug, Deserialize)]
struct ContactsResponse {
    #[serde(default)]
    contact: Vec<ContactQuery>,
}

impl ApiClient {
    pub async fn create_contact(&self, query: &NewContactQuery) -> Result<String, ApiError> {
        let response: MessageResponse = self.post("/contact/create-contact", query).await?;
        Ok(response.message_or("Your query has been submitted"))
    }

    pub async fn list_contacts(&self) -> Result<Vec<ContactQuery>, ApiError> {
        let response: ContactsResponse = self.get("/contact/getall-contact").await?;
        Ok(response.contact)
    }

    pub async fn set_contact_status(&self, id: &str, status: ContactStatus) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .put(
                &format!("/contact/update-contact/{id}"),
                &json!({ "status": status }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_contact(&self, id: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .delete(&format!("/contact/delete-contact/{id}"))
            .await?;
        Ok(())
    }
}
