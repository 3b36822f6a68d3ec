use serde::{Deserialize, Serialize};

/// Totals shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub users: u64,
    pub plans: u64,
    pub subscribers: u64,
    pub contacts: u64,
    pub feedbacks: u64,
}

impl AdminStats {
    /// (label, value) pairs in display order
    pub fn entries(&self) -> [(&'static str, u64); 5] {
        [
            ("Users", self.users),
            ("Plans", self.plans),
            ("Subscribers", self.subscribers),
            ("Queries", self.contacts),
            ("Feedbacks", self.feedbacks),
        ]
    }
}
