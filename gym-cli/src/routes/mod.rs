use std::fmt;

use crate::models::User;

/// Who may render a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    User,
    Admin,
}

/// Every screen of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login { return_to: Option<String> },
    Register,
    Contact,
    UserDashboard,
    Exercises,
    ExerciseDetail { id: String },
    Favorites,
    Plans,
    PlanDetail { id: String },
    SubmitFeedback,
    MyFeedbacks,
    AdminDashboard,
    AdminUsers,
    AdminUserDetail { id: String },
    Subscribers,
    NewSubscription,
    AdminFeedbacks,
    ContactQueries,
    AdminPlans,
    CreatePlan,
    EditPlan { id: String },
}

impl Route {
    pub fn login() -> Self {
        Route::Login { return_to: None }
    }

    /// Login route remembering where to go afterwards. Login itself is never
    /// remembered.
    pub fn login_returning_to(path: &str) -> Self {
        let return_to = (!path.is_empty() && path != "/login").then(|| path.to_string());
        Route::Login { return_to }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Login { .. } => "/login".into(),
            Route::Register => "/register".into(),
            Route::Contact => "/contact".into(),
            Route::UserDashboard => "/dashboard/user".into(),
            Route::Exercises => "/dashboard/user/exercise".into(),
            Route::ExerciseDetail { id } => format!("/dashboard/user/exercise/{id}"),
            Route::Favorites => "/dashboard/user/favourite-exercises".into(),
            Route::Plans => "/dashboard/user/plan-detail".into(),
            Route::PlanDetail { id } => format!("/dashboard/user/plan-details/{id}"),
            Route::SubmitFeedback => "/dashboard/user/feedback".into(),
            Route::MyFeedbacks => "/dashboard/user/feedbacks".into(),
            Route::AdminDashboard => "/dashboard/admin".into(),
            Route::AdminUsers => "/dashboard/admin/users".into(),
            Route::AdminUserDetail { id } => format!("/dashboard/admin/users/{id}"),
            Route::Subscribers => "/dashboard/admin/subscribers".into(),
            Route::NewSubscription => "/dashboard/admin/subscriptions/new".into(),
            Route::AdminFeedbacks => "/dashboard/admin/feedbacks".into(),
            Route::ContactQueries => "/dashboard/admin/contact-us".into(),
            Route::AdminPlans => "/dashboard/admin/plans".into(),
            Route::CreatePlan => "/dashboard/admin/plans/create".into(),
            Route::EditPlan { id } => format!("/dashboard/admin/plans/edit/{id}"),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Login { .. } | Route::Register | Route::Contact => Access::Public,
            Route::UserDashboard
            | Route::Exercises
            | Route::ExerciseDetail { .. }
            | Route::Favorites
            | Route::Plans
            | Route::PlanDetail { .. }
            | Route::SubmitFeedback
            | Route::MyFeedbacks => Access::User,
            _ => Access::Admin,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.access() != Access::Public
    }

    /// Resolve a path, following the legacy redirects (`/admin/*`,
    /// `/exercise`, `/feedback`, `/dashboard`)
    pub fn parse(path: &str) -> Option<Route> {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login {
                return_to: query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("returnTo="))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            },
            ["register"] => Route::Register,
            ["contact"] => Route::Contact,
            ["admin", ..] => Route::AdminDashboard,
            ["exercise"] => Route::Exercises,
            ["exercise", id] | ["exercise", "preview", id] => Route::ExerciseDetail { id: id.to_string() },
            ["feedback"] => Route::SubmitFeedback,
            ["dashboard"] | ["dashboard", "user"] => Route::UserDashboard,
            ["dashboard", "user", rest @ ..] => match rest {
                ["exercise"] => Route::Exercises,
                ["exercise", id] => Route::ExerciseDetail { id: id.to_string() },
                ["favourite-exercises"] => Route::Favorites,
                ["plan-detail"] => Route::Plans,
                ["plan-details", id] | ["plan-detail-full", id] => Route::PlanDetail { id: id.to_string() },
                ["feedback"] => Route::SubmitFeedback,
                ["feedbacks"] => Route::MyFeedbacks,
                _ => return None,
            },
            ["dashboard", "admin", rest @ ..] => match rest {
                [] => Route::AdminDashboard,
                ["users"] => Route::AdminUsers,
                ["users", id] => Route::AdminUserDetail { id: id.to_string() },
                ["subscribers"] | ["subscriptions"] => Route::Subscribers,
                ["subscriptions", "new"] => Route::NewSubscription,
                ["feedbacks"] => Route::AdminFeedbacks,
                ["contact-us"] => Route::ContactQueries,
                ["plans"] => Route::AdminPlans,
                ["plans", "create"] => Route::CreatePlan,
                ["plans", "edit", id] => Route::EditPlan { id: id.to_string() },
                // unknown admin pages fall back to the dashboard
                _ => Route::AdminDashboard,
            },
            _ => return None,
        };

        Some(route)
    }

    /// Dashboard a user lands on by role
    pub fn dashboard_for(user: &User) -> Route {
        if user.has_admin_role() {
            Route::AdminDashboard
        } else {
            Route::UserDashboard
        }
    }

    /// Where to go after logging in: the remembered route when the user may
    /// open it, otherwise their dashboard
    pub fn after_login(user: &User, return_to: Option<&str>) -> Route {
        return_to
            .and_then(Route::parse)
            .filter(|route| !matches!(route, Route::Login { .. }))
            .filter(|route| route.access() != Access::Admin || user.has_admin_role())
            .unwrap_or_else(|| Route::dashboard_for(user))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login {
                return_to: Some(return_to),
            } => write!(f, "/login?returnTo={return_to}"),
            route => f.write_str(&route.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: u8) -> User {
        serde_json::from_value(serde_json::json!({"_id": "u1", "role": role})).unwrap()
    }

    #[test]
    fn test_paths_parse_back() {
        let routes = [
            Route::Home,
            Route::Register,
            Route::Favorites,
            Route::ExerciseDetail { id: "0001".into() },
            Route::AdminUserDetail { id: "u9".into() },
            Route::EditPlan { id: "p1".into() },
            Route::NewSubscription,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_legacy_redirects() {
        assert_eq!(Route::parse("/admin/anything"), Some(Route::AdminDashboard));
        assert_eq!(Route::parse("/exercise"), Some(Route::Exercises));
        assert_eq!(Route::parse("/feedback"), Some(Route::SubmitFeedback));
        assert_eq!(Route::parse("/dashboard"), Some(Route::UserDashboard));
        assert_eq!(Route::parse("/dashboard/admin/nope"), Some(Route::AdminDashboard));
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_login_return_to() {
        let route = Route::login_returning_to("/dashboard/admin/plans");
        assert_eq!(route.to_string(), "/login?returnTo=/dashboard/admin/plans");
        assert_eq!(Route::parse(&route.to_string()), Some(route));
        assert_eq!(Route::login_returning_to("/login"), Route::login());
    }

    #[test]
    fn test_access_levels() {
        assert_eq!(Route::Home.access(), Access::Public);
        assert_eq!(Route::Favorites.access(), Access::User);
        assert_eq!(Route::CreatePlan.access(), Access::Admin);
        assert!(!Route::login().is_protected());
    }

    #[test]
    fn test_after_login() {
        assert_eq!(Route::after_login(&user(0), None), Route::UserDashboard);
        assert_eq!(Route::after_login(&user(1), None), Route::AdminDashboard);
        assert_eq!(
            Route::after_login(&user(0), Some("/dashboard/user/feedbacks")),
            Route::MyFeedbacks
        );
        assert_eq!(
            Route::after_login(&user(0), Some("/dashboard/admin/plans")),
            Route::UserDashboard
        );
        assert_eq!(Route::after_login(&user(1), Some("/login")), Route::AdminDashboard);
    }
}
