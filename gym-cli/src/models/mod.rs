pub mod admin;
pub mod contact;
pub mod exercise;
pub mod feedback;
pub mod plan;
pub mod subscription;
pub mod user;

pub use admin::AdminStats;
pub use contact::{ContactQuery, ContactStatus, NewContactQuery};
pub use exercise::{Exercise, ExerciseRecord};
pub use feedback::{Feedback, UserRef};
pub use plan::{feature_label, Plan, PlanFeatures, KNOWN_FEATURES};
pub use subscription::{Billing, Subscription, SubscriptionDraft};
pub use user::{User, ADMIN_ROLE};
