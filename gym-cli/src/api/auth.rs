use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, MessageResponse};
use crate::models::{Feedback, User};
use crate::session::Session;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<String>,
}

/// Successful login: the persisted session plus the server's greeting
#[derive(Debug, Clone)]
pub struct Login {
    pub session: Session,
    pub message: String,
}

/// Registration payload
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub city: String,
    pub contact: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserResponse {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserFeedbackResponse {
    #[serde(default)]
    new_feedback: Vec<Feedback>,
}

impl ApiClient {
    /// Log in and persist the resulting session.
    ///
    /// A response without a user id or token is rejected. Any failure leaves
    /// no session behind.
    pub async fn login(&self, email: &str, password: &str) -> Result<Login, ApiError> {
        let result = self.try_login(email, password).await;

        if result.is_err() {
            if let Err(e) = self.session.clear() {
                tracing::error!("Failed to clear session after login error: {:#}", e);
            }
        }

        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Login, ApiError> {
        let request = self
            .request(Method::POST, "/auth/login")?
            .json(&LoginRequest { email, password });
        let response: LoginResponse = self.dispatch(request, false).await?;

        let (user, token) = match (response.user, response.token) {
            (Some(user), Some(token)) if !user.id.is_empty() && !token.is_empty() => (user, token),
            _ => {
                let err = ApiError::InvalidResponse("Invalid login response from server".into());
                self.notifier.error("Invalid login response from server");
                return Err(err);
            }
        };

        let session = Session::new(Some(user), token);
        self.session.set_auth(session.clone(), true)?;

        tracing::info!(admin = session.is_admin(), "Logged in");

        Ok(Login {
            session,
            message: response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Login successful".to_string()),
        })
    }

    /// Create an account; the user still has to log in afterwards
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let response: MessageResponse = self.post("/auth/register", request).await?;
        Ok(response.message_or("Registration successful"))
    }

    /// Check a token with the route-guard endpoint. No toasts, no clearing.
    pub async fn verify_user(&self, token: &str) -> Result<User, ApiError> {
        let response: UserResponse = self.get_with_token("/auth/user-auth", token).await?;
        response
            .user
            .ok_or_else(|| ApiError::InvalidResponse("Missing user in verification response".into()))
    }

    /// Check a token with the startup verification endpoint
    pub async fn verify_token(&self, token: &str) -> Result<User, ApiError> {
        let response: UserResponse = self.get_with_token("/auth/verify-token", token).await?;
        response
            .user
            .ok_or_else(|| ApiError::InvalidResponse("Missing user in verification response".into()))
    }

    /// Tell the server the session is over, then wipe local state.
    /// A failed server call never blocks the local cleanup.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(token) = self.session.token()? {
            let builder = Self::with_token(self.client.post(self.url("/auth/logout")), &token);
            match self.execute(builder).await {
                Ok((status, _)) if status.is_success() => tracing::debug!("Server logout ok"),
                Ok((status, _)) => tracing::warn!(status = status.as_u16(), "Server logout failed"),
                Err(e) => tracing::warn!("Server logout failed: {}", e),
            }
        }

        self.session.clear()?;
        self.session.storage().clear_local()?;
        Ok(())
    }

    /// All registered users
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response: UsersResponse = self.get("/auth/get-all-users").await?;
        Ok(response.users)
    }

    /// Feedback entries written by the logged-in user
    pub async fn my_feedbacks(&self) -> Result<Vec<Feedback>, ApiError> {
        let response: UserFeedbackResponse = self.get("/auth/get-all-user-feedback").await?;
        Ok(response.new_feedback)
    }
}
