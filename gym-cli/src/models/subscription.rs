use anyhow::{anyhow, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Plan, User};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubscriberRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanRef {
    #[serde(default)]
    pub name: String,
}

/// Subscription as listed on the admin screens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<SubscriberRef>,
    #[serde(default)]
    pub plan: Option<PlanRef>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default)]
    pub plan_amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub payment_status: Option<String>,
}

fn default_status() -> String {
    "inactive".to_string()
}

impl Subscription {
    pub fn subscriber_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("N/A")
    }

    pub fn subscriber_email(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.email.as_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("N/A")
    }

    /// Date part of an ISO timestamp, e.g. `2024-01-31`
    pub fn period(&self) -> String {
        let day = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| v.chars().take(10).collect::<String>())
                .unwrap_or_else(|| "?".to_string())
        };
        format!("{} → {}", day(&self.start_date), day(&self.end_date))
    }

    pub fn plan_name(&self) -> &str {
        self.plan
            .as_ref()
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .or(self.plan_type.as_deref())
            .unwrap_or("N/A")
    }
}

/// Billing period of a new subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Billing {
    Monthly,
    Yearly,
}

impl Billing {
    fn months(self) -> u32 {
        match self {
            Billing::Monthly => 1,
            Billing::Yearly => 12,
        }
    }
}

/// Body of `POST /subscription/create-subscription`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDraft {
    pub user_name: String,
    pub plan_type: String,
    pub plan_amount: f64,
    pub plan_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub payment_status: String,
}

impl SubscriptionDraft {
    /// Build a subscription for `user` on `plan`, ending one billing period
    /// after `start`
    pub fn for_plan(user: &User, plan: &Plan, start: NaiveDate, billing: Billing) -> Result<Self> {
        if !plan.is_active {
            return Err(anyhow!("Plan {} is not active", plan.plan_name));
        }

        let end_date = start
            .checked_add_months(Months::new(billing.months()))
            .ok_or_else(|| anyhow!("End date out of range"))?;

        let plan_amount = match billing {
            Billing::Monthly => plan.monthly_plan_amount,
            Billing::Yearly => plan.yearly_plan_amount,
        };

        Ok(Self {
            user_name: user.name.clone(),
            plan_type: plan.plan_name.clone(),
            plan_amount,
            plan_id: plan.id.clone(),
            start_date: start,
            end_date,
            status: "active".to_string(),
            payment_status: "paid".to_string(),
        })
    }
}
