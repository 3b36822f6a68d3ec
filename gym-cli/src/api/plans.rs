use serde::Deserialize;
use serde_json::json;

use super::{ApiClient, ApiError, MessageResponse};
use crate::models::Plan;

#[derive(Debug, Deserialize)]
struct PlansResponse {
    #[serde(default)]
    plans: Vec<Plan>,
}

#[derive(Debug, Deserialize)]
struct PlanResponse {
    plan: Option<Plan>,
}

impl ApiClient {
    pub async fn list_plans(&self) -> Result<Vec<Plan>, ApiError> {
        let response: PlansResponse = self.get("/plan/getall-plan").await?;
        Ok(response.plans)
    }

    pub async fn get_plan(&self, id: &str) -> Result<Plan, ApiError> {
        let response: PlanResponse = self.get(&format!("/plan/get-plan/{id}")).await?;
        response
            .plan
            .ok_or_else(|| ApiError::NotFound(format!("Plan {id}")))
    }

    pub async fn create_plan(&self, plan: &Plan) -> Result<String, ApiError> {
        let response: MessageResponse = self.post("/plan/create-plan", plan).await?;
        tracing::info!(name = %plan.plan_name, "Created plan");
        Ok(response.message_or("Plan created successfully!"))
    }

    /// Replace every editable field of a plan
    pub async fn update_plan(&self, id: &str, plan: &Plan) -> Result<String, ApiError> {
        let response: MessageResponse = self
            .put(&format!("/plan/update-plan/{id}"), plan)
            .await?;
        Ok(response.message_or("Plan updated successfully!"))
    }

    /// Flip the active flag; only `isActive` is sent
    pub async fn set_plan_active(&self, id: &str, active: bool) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .put(&format!("/plan/update-plan/{id}"), &json!({ "isActive": active }))
            .await?;
        Ok(())
    }

    /// The server flips the popular flag itself
    pub async fn toggle_plan_popular(&self, id: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .put(&format!("/plan/toggle-popular/{id}"), &json!({}))
            .await?;
        Ok(())
    }

    pub async fn delete_plan(&self, id: &str) -> Result<(), ApiError> {
        let _: MessageResponse = self.delete(&format!("/plan/delete-plan/{id}")).await?;
        tracing::info!(%id, "Deleted plan");
        Ok(())
    }
}
