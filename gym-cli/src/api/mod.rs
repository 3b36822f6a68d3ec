use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::notify::Notifier;
use crate::session::{SessionStore, AUTH_COOKIE};

mod admin;
mod auth;
mod contact;
mod error;
mod feedback;
mod plans;

pub use admin::{StatsReport, SubscriberPage, RECENT_LIMIT};
pub use auth::{Login, RegisterRequest};
pub use error::{ApiError, CONNECTION_ERROR, GENERIC_ERROR, SESSION_EXPIRED};

/// `success`/`message` fields every backend response carries
#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Body of a mutation that only reports a message
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageResponse {
    pub fn message_or(self, fallback: &str) -> String {
        self.message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Pull the human-readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}

/// API client for the gym backend.
///
/// Every request carries the persisted bearer token. A 401 clears the
/// persisted session and yields `ApiError::SessionExpired`; other failures are
/// toasted with the backend's message.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    location: RwLock<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        config: &Config,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.api.timeout_seconds);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_root(),
            session,
            notifier,
            location: RwLock::new(String::from("/")),
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Record the route being rendered; used as `return_to` after a 401
    pub fn set_location(&self, path: &str) {
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }

    pub fn location(&self) -> String {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request builder with the persisted token attached
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let builder = self
            .client
            .request(method, self.url(path))
            .header("X-Request-Id", Uuid::new_v4().to_string());

        Ok(match self.session.token()? {
            Some(token) => Self::with_token(builder, &token),
            None => builder,
        })
    }

    fn with_token(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .bearer_auth(token)
            .header(COOKIE, format!("{AUTH_COOKIE}={token}"))
    }

    /// Make an authenticated GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        self.send(request).await
    }

    /// Make an authenticated GET request with query parameters
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path)?.query(query);
        self.send(request).await
    }

    /// Make an authenticated POST request
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.send(request).await
    }

    /// Make an authenticated PUT request
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        self.send(request).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::DELETE, path)?;
        self.send(request).await
    }

    /// Send a request without toasts or session side effects
    async fn execute(&self, builder: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let request = builder
            .build()
            .map_err(|e| ApiError::Unknown(e.to_string()))?;

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "Sending request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::error!(%method, %url, "No response from server: {}", e);
            ApiError::NetworkError(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        tracing::debug!(%method, %url, status = status.as_u16(), "Received response");
        Ok((status, body))
    }

    /// Send a request through the response interceptor
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.dispatch(builder, true).await
    }

    /// Interceptor body. With `expire_on_401` unset a 401 is an ordinary
    /// rejection carrying the server's message (the login form uses this).
    async fn dispatch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        expire_on_401: bool,
    ) -> Result<T, ApiError> {
        let (status, body) = match self.execute(builder).await {
            Ok(response) => response,
            Err(err @ ApiError::NetworkError(_)) => {
                self.notifier.error(CONNECTION_ERROR);
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        if status == StatusCode::UNAUTHORIZED && expire_on_401 {
            return Err(self.handle_unauthorized());
        }

        if !status.is_success() {
            let message = error_message(&body);
            tracing::error!(status = status.as_u16(), "API error: {}", message);
            self.notifier.error(&message);
            return Err(match status {
                StatusCode::UNAUTHORIZED => ApiError::Rejected(message),
                status => ApiError::from_status(status, message),
            });
        }

        let value = Self::parse_body(&body)?;
        if let Err(err) = Self::check_success(&value) {
            self.notifier.error(&err.to_string());
            return Err(err);
        }

        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    fn parse_body(body: &str) -> Result<serde_json::Value, ApiError> {
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// A 2xx body with `success: false` is still a failure
    fn check_success(value: &serde_json::Value) -> Result<(), ApiError> {
        let status = serde_json::from_value::<Status>(value.clone()).unwrap_or(Status {
            success: true,
            message: None,
        });

        if status.success {
            Ok(())
        } else {
            let message = status
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_ERROR.to_string());
            Err(ApiError::Rejected(message))
        }
    }

    /// Clear the persisted session and point the caller back at login.
    /// Only the request that finds the session still live toasts.
    fn handle_unauthorized(&self) -> ApiError {
        let live = self.session.expire().unwrap_or_else(|e| {
            tracing::error!("Failed to clear session after 401: {:#}", e);
            true
        });

        let location = self.location();
        let return_to = (!location.is_empty() && location != "/login").then_some(location);

        if live {
            tracing::info!("Session expired, login required");
            self.notifier.error(SESSION_EXPIRED);
        }

        ApiError::SessionExpired { return_to }
    }

    /// GET with an explicit token, bypassing the interceptor. Used by route
    /// guards, which own their failure handling.
    async fn get_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        let builder = Self::with_token(self.client.get(self.url(path)), token);
        let (status, body) = self.execute(builder).await?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, error_message(&body)));
        }

        let value = Self::parse_body(&body)?;
        Self::check_success(&value)?;
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
