// Client-side form validation
//
// Validators return the request body on success, or every failing field with
// its message. The backend re-validates everything.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

use crate::api::RegisterRequest;
use crate::models::{NewContactQuery, Plan, PlanFeatures};

/// Field name to message, in field-name order
#[derive(Error, Debug, Clone, PartialEq, Default)]
#[error("{}", summarize(.fields))]
pub struct FormError {
    pub fields: BTreeMap<&'static str, String>,
}

fn summarize(fields: &BTreeMap<&'static str, String>) -> String {
    fields.values().cloned().collect::<Vec<_>>().join("; ")
}

impl FormError {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormError> {
        if self.fields.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$")
}

fn letters_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[A-Za-z ]+$")
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[6-9]\d{9}$")
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Create/edit plan form as typed by the admin
#[derive(Debug, Clone, Default)]
pub struct PlanForm {
    pub plan_name: String,
    pub monthly_plan_amount: String,
    pub yearly_plan_amount: String,
    pub is_active: bool,
    pub is_popular: bool,
    pub features: PlanFeatures,
}

impl PlanForm {
    /// Pre-fill the form from an existing plan
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            plan_name: plan.plan_name.clone(),
            monthly_plan_amount: plan.monthly_plan_amount.to_string(),
            yearly_plan_amount: plan.yearly_plan_amount.to_string(),
            is_active: plan.is_active,
            is_popular: plan.is_popular,
            features: plan.features.clone(),
        }
    }

    pub fn validate(&self) -> Result<Plan, FormError> {
        let mut errors = FormError::default();

        if self.plan_name.trim().is_empty() {
            errors.add("planName", "Plan name is required");
        }

        let monthly = parse_amount(&self.monthly_plan_amount);
        if !monthly.is_some_and(|m| m > 0.0) {
            errors.add("monthlyPlanAmount", "Please enter a valid monthly amount");
        }

        let yearly = parse_amount(&self.yearly_plan_amount);
        if !yearly.is_some_and(|y| y > 0.0) {
            errors.add("yearlyPlanAmount", "Please enter a valid yearly amount");
        }

        if let (Some(monthly), Some(yearly)) = (monthly, yearly) {
            if yearly > monthly * 12.0 {
                errors.add(
                    "yearlyPlanAmount",
                    "Yearly amount should be less than or equal to 12 times the monthly amount",
                );
            }
        }

        errors.into_result(|| Plan {
            id: String::new(),
            plan_name: self.plan_name.trim().to_string(),
            monthly_plan_amount: monthly.unwrap_or_default(),
            yearly_plan_amount: yearly.unwrap_or_default(),
            is_active: self.is_active,
            is_popular: self.is_popular,
            features: self.features.clone(),
        })
    }
}

/// Sign-up form
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub city: String,
    pub contact: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        let mut errors = FormError::default();

        let name = self.name.trim();
        let name_len = name.chars().count();
        if !(4..=30).contains(&name_len) {
            errors.add("name", "Name must be between 4 and 30 characters");
        } else if !letters_regex().is_match(name) {
            errors.add("name", "Name must contain only alphabets");
        }

        let email = self.email.trim().to_lowercase();
        if !email_regex().is_match(&email) {
            errors.add("email", "Please enter a valid email address");
        }

        if !valid_password(&self.password) {
            errors.add(
                "password",
                "Password must be at least 8 characters long and contain at least one uppercase letter, one lowercase letter, and one number",
            );
        }

        let city = self.city.trim();
        if !letters_regex().is_match(city) {
            errors.add("city", "City must contain only alphabets and spaces");
        }

        let contact = self.contact.trim();
        if !phone_regex().is_match(contact) {
            errors.add(
                "contact",
                "Phone number must start with 9, 8, 7, or 6 and contain exactly 10 digits",
            );
        }

        errors.into_result(|| RegisterRequest {
            name: name.to_string(),
            email,
            password: self.password.clone(),
            city: city.to_string(),
            contact: contact.to_string(),
        })
    }
}

fn valid_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Feedback form; `rating` is 1 to 5 stars
#[derive(Debug, Clone)]
pub struct FeedbackForm {
    pub message: String,
    pub rating: u8,
}

impl FeedbackForm {
    pub fn validate(&self) -> Result<(String, u8), FormError> {
        let mut errors = FormError::default();

        let message = self.message.trim();
        if message.is_empty() {
            errors.add("message", "Feedback message is required");
        }
        if !(1..=5).contains(&self.rating) {
            errors.add("rating", "Rating must be between 1 and 5");
        }

        errors.into_result(|| (message.to_string(), self.rating))
    }
}

/// Login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(String, String), FormError> {
        let mut errors = FormError::default();

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", "Email is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }

        errors.into_result(|| (email.to_string(), self.password.clone()))
    }
}

/// "Contact us" form
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub city: String,
    pub phone: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<NewContactQuery, FormError> {
        let mut errors = FormError::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        let email = self.email.trim().to_lowercase();
        if !email_regex().is_match(&email) {
            errors.add("email", "Please enter a valid email address");
        }
        let phone = self.phone.trim();
        if !phone_regex().is_match(phone) {
            errors.add(
                "phone",
                "Phone number must start with 9, 8, 7, or 6 and contain exactly 10 digits",
            );
        }
        if self.message.trim().is_empty() {
            errors.add("message", "Message is required");
        }

        errors.into_result(|| NewContactQuery {
            name: self.name.trim().to_string(),
            email,
            city: self.city.trim().to_string(),
            phone: phone.to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_form(monthly: &str, yearly: &str) -> PlanForm {
        PlanForm {
            plan_name: "Gold".into(),
            monthly_plan_amount: monthly.into(),
            yearly_plan_amount: yearly.into(),
            is_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_plan() {
        let plan = plan_form("1000", "12000").validate().unwrap();
        assert_eq!(plan.monthly_plan_amount, 1000.0);
        assert_eq!(plan.yearly_plan_amount, 12000.0);
        assert!(plan.id.is_empty());
    }

    #[test]
    fn test_yearly_above_twelve_months_rejected() {
        let err = plan_form("1000", "12000.5").validate().unwrap_err();
        assert_eq!(
            err.get("yearlyPlanAmount"),
            Some("Yearly amount should be less than or equal to 12 times the monthly amount")
        );
        assert!(err.get("monthlyPlanAmount").is_none());
    }

    #[test]
    fn test_plan_field_errors() {
        let mut form = plan_form("abc", "-5");
        form.plan_name = "   ".into();
        let err = form.validate().unwrap_err();

        assert_eq!(err.get("planName"), Some("Plan name is required"));
        assert_eq!(err.get("monthlyPlanAmount"), Some("Please enter a valid monthly amount"));
        assert_eq!(err.get("yearlyPlanAmount"), Some("Please enter a valid yearly amount"));
        assert_eq!(err.fields.len(), 3);
    }

    #[test]
    fn test_register_form() {
        let form = RegisterForm {
            name: "Asha Rao".into(),
            email: "Asha@Example.com".into(),
            password: "Secret123".into(),
            city: "New Delhi".into(),
            contact: "9876543210".into(),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.email, "asha@example.com");

        let bad = RegisterForm {
            name: "Al".into(),
            email: "nope".into(),
            password: "password".into(),
            city: "Pune1".into(),
            contact: "5876543210".into(),
        };
        let err = bad.validate().unwrap_err();
        assert_eq!(err.fields.len(), 5);
    }

    #[test]
    fn test_feedback_and_login_forms() {
        let feedback = FeedbackForm {
            message: " ".into(),
            rating: 6,
        };
        assert_eq!(feedback.validate().unwrap_err().fields.len(), 2);

        let login = LoginForm {
            email: "a@b.co".into(),
            password: String::new(),
        };
        assert_eq!(
            login.validate().unwrap_err().to_string(),
            "Password is required"
        );
    }

    #[test]
    fn test_contact_form() {
        let form = ContactForm {
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            city: "Pune".into(),
            phone: "9876543210".into(),
            message: "Do you have a pool?".into(),
        };
        assert_eq!(form.validate().unwrap().phone, "9876543210");
    }
}
