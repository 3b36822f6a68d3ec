use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature flags the plan screens know how to label, as (wire name, label)
pub const KNOWN_FEATURES: [(&str, &str); 9] = [
    ("waterStations", "Water stations"),
    ("lockerRooms", "Locker rooms"),
    ("wifiService", "Wi-Fi service"),
    ("cardioClass", "Cardio class"),
    ("refreshment", "Refreshment"),
    ("groupFitnessClasses", "Group fitness classes"),
    ("personalTrainer", "Personal trainer"),
    ("specialEvents", "Special events"),
    ("cafeOrLounge", "Cafe or lounge"),
];

/// Membership plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub plan_name: String,
    pub monthly_plan_amount: f64,
    pub yearly_plan_amount: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub features: PlanFeatures,
}

fn default_true() -> bool {
    true
}

impl Plan {
    /// Amount saved per year by paying yearly instead of monthly
    pub fn yearly_savings(&self) -> f64 {
        (self.monthly_plan_amount * 12.0 - self.yearly_plan_amount).max(0.0)
    }

    /// Yearly savings as a whole percentage of twelve monthly payments
    pub fn savings_percent(&self) -> u32 {
        let full = self.monthly_plan_amount * 12.0;
        if full <= 0.0 {
            return 0;
        }
        (self.yearly_savings() / full * 100.0).round() as u32
    }
}

/// Feature flag map; unknown flags from the server are preserved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PlanFeatures(BTreeMap<String, bool>);

impl Default for PlanFeatures {
    fn default() -> Self {
        Self(
            KNOWN_FEATURES
                .iter()
                .map(|(name, _)| (name.to_string(), false))
                .collect(),
        )
    }
}

impl PlanFeatures {
    pub fn set(&mut self, name: &str, enabled: bool) {
        self.0.insert(name.to_string(), enabled);
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Names of enabled flags in wire order
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, enabled)| (name.as_str(), *enabled))
    }
}

/// Human label for a feature flag, falling back to the wire name
pub fn feature_label(name: &str) -> &str {
    KNOWN_FEATURES
        .iter()
        .find(|(wire, _)| *wire == name)
        .map(|(_, label)| *label)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Plan {
        serde_json::from_str(
            r#"{
                "_id": "p1",
                "planName": "Gold",
                "monthlyPlanAmount": 1000,
                "yearlyPlanAmount": 10000,
                "isPopular": true,
                "features": {"lockerRooms": true, "sauna": true, "wifiService": false}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_plan() {
        let plan = sample();
        assert_eq!(plan.id, "p1");
        assert!(plan.is_active);
        assert!(plan.is_popular);
        assert!(plan.features.is_enabled("lockerRooms"));
        assert!(plan.features.is_enabled("sauna"));
        assert!(!plan.features.is_enabled("cardioClass"));
    }

    #[test]
    fn test_savings() {
        let plan = sample();
        assert_eq!(plan.yearly_savings(), 2000.0);
        assert_eq!(plan.savings_percent(), 17);
    }

    #[test]
    fn test_new_plan_omits_empty_id() {
        let mut plan = sample();
        plan.id.clear();
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("_id").is_none());
        assert_eq!(json["planName"], "Gold");
    }

    #[test]
    fn test_default_features_all_disabled() {
        let features = PlanFeatures::default();
        assert_eq!(features.iter().count(), KNOWN_FEATURES.len());
        assert_eq!(features.enabled().count(), 0);
        assert_eq!(feature_label("cafeOrLounge"), "Cafe or lounge");
        assert_eq!(feature_label("sauna"), "sauna");
    }
}
