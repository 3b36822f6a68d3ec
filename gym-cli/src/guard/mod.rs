use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::api::{ApiClient, ApiError, GENERIC_ERROR};
use crate::routes::{Access, Route};
use crate::session::{Session, AUTH_KEY};

pub const ADMIN_REQUIRED: &str = "Admin access required";
pub const ADMIN_FORBIDDEN: &str = "You don't have permission to access the admin panel";
pub const PAGE_FORBIDDEN: &str = "You don't have permission to access this page";

/// Result of guarding a route
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Render the route with this verified session
    Render(Session),
    /// Go here instead
    Redirect(Route),
    /// A newer navigation started while verifying; ignore this result
    Superseded,
}

/// Verifies the persisted session with the backend before a protected route
/// renders.
pub struct RouteGuard {
    api: Arc<ApiClient>,
    epoch: AtomicU64,
}

impl RouteGuard {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            epoch: AtomicU64::new(0),
        }
    }

    /// Record a navigation; any check still in flight becomes stale
    pub fn navigate(&self, route: &Route) -> u64 {
        self.api.set_location(&route.path());
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    pub async fn check(&self, route: &Route) -> Result<GuardOutcome, ApiError> {
        let epoch = self.navigate(route);
        let session = self.api.session();

        if !route.is_protected() {
            return Ok(GuardOutcome::Render(session.current()));
        }

        let login = Route::login_returning_to(&route.path());

        let token = match session.cookie_token()? {
            Some(token) => Some(token),
            None => {
                let fallback = session.local_token()?;
                if let Some(token) = &fallback {
                    tracing::debug!("Auth cookie missing, re-issuing from local storage");
                    session.issue_cookie(token)?;
                }
                fallback
            }
        };

        let Some(token) = token else {
            tracing::info!(route = %route.path(), "No authentication token found");
            session.clear()?;
            return Ok(GuardOutcome::Redirect(login));
        };

        let verified = self.api.verify_user(&token).await;

        if !self.is_current(epoch) {
            tracing::debug!(route = %route.path(), "Discarding stale verification");
            return Ok(GuardOutcome::Superseded);
        }

        let user = match verified {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(route = %route.path(), "Authentication check failed: {}", e);
                session.clear()?;
                self.api.notifier().error(&failure_message(route, &e));
                return Ok(GuardOutcome::Redirect(login));
            }
        };

        let is_admin = user.has_admin_role();
        if route.access() == Access::Admin && !is_admin {
            tracing::warn!(route = %route.path(), "Non-admin user denied");
            session.clear()?;
            self.api.notifier().error(ADMIN_REQUIRED);
            return Ok(GuardOutcome::Redirect(login));
        }

        let verified = Session::new(Some(user), token);
        session.set_auth(verified.clone(), false)?;

        if route.access() == Access::Admin {
            if let Some(admin) = verified.user.clone() {
                session.store_admin_data(admin, &verified.token)?;
                session.storage().remove_item(AUTH_KEY)?;
            }
        }

        tracing::debug!(route = %route.path(), admin = is_admin, "Session verified");
        Ok(GuardOutcome::Render(verified))
    }
}

fn failure_message(route: &Route, err: &ApiError) -> String {
    if matches!(err, ApiError::Unauthorized(_)) {
        return if route.access() == Access::Admin {
            ADMIN_FORBIDDEN.to_string()
        } else {
            PAGE_FORBIDDEN.to_string()
        };
    }

    match err {
        ApiError::Rejected(msg) if msg.trim().is_empty() || msg == GENERIC_ERROR => {
            "Authentication failed".to_string()
        }
        err => err.message(),
    }
}
