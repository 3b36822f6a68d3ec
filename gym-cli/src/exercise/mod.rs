// Client for the third-party exercise database (RapidAPI ExerciseDB)

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::ExerciseDbConfig;
use crate::models::{Exercise, ExerciseRecord};
use crate::notify::Notifier;

mod retry;

pub use retry::RetryConfig;

/// Toast shown when a listing cannot be fetched after every retry
pub const LIMITED_DATA: &str = "Using limited exercise data. Some features may be restricted.";

/// Body part filter meaning "no filter"
pub const ALL_BODY_PARTS: &str = "all";

#[derive(Error, Debug)]
pub enum ExerciseError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("Exercise API key is not configured (set EXERCISEDB_API_KEY)")]
    MissingApiKey,

    #[error("Exercise API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data format received: {0}")]
    InvalidResponse(String),
}

impl ExerciseError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExerciseError::Cancelled | ExerciseError::MissingApiKey)
    }
}

/// ExerciseDB client. Listing fetches retry with capped backoff and can be
/// cancelled; single-exercise lookups are tried once.
pub struct ExerciseDbClient {
    client: Client,
    base_url: String,
    has_key: bool,
    retry: RetryConfig,
    notifier: Arc<dyn Notifier>,
}

impl ExerciseDbClient {
    pub fn new(
        config: &ExerciseDbConfig,
        timeout: Duration,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let has_key = !config.api_key.trim().is_empty();
        if has_key {
            headers.insert(
                "X-RapidAPI-Key",
                HeaderValue::from_str(config.api_key.trim())
                    .context("Exercise API key is not a valid header value")?,
            );
        }
        headers.insert(
            "X-RapidAPI-Host",
            HeaderValue::from_str(&config.api_host)
                .context("Exercise API host is not a valid header value")?,
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            has_key,
            retry: RetryConfig::default(),
            notifier,
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ExerciseError> {
        if !self.has_key {
            return Err(ExerciseError::MissingApiKey);
        }

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "Fetching from exercise API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ExerciseError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExerciseError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ExerciseError::InvalidResponse(e.to_string()))
    }

    /// Listing fetch with retries; toasts once when every attempt failed
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, ExerciseError> {
        let result = self.retry.execute(cancel, || self.fetch_json(path)).await;

        match &result {
            Err(ExerciseError::Cancelled) => tracing::debug!(%path, "Exercise fetch cancelled"),
            Err(e) => {
                tracing::error!(%path, "Error fetching exercises: {}", e);
                self.notifier.error(LIMITED_DATA);
            }
            Ok(_) => {}
        }

        result
    }

    /// Exercises for a body part; `all` lists everything
    pub async fn list(
        &self,
        body_part: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Exercise>, ExerciseError> {
        let path = if body_part.is_empty() || body_part == ALL_BODY_PARTS {
            "/exercises".to_string()
        } else {
            format!("/exercises/bodyPart/{body_part}")
        };

        let exercises: Vec<ExerciseRecord> = self.fetch_list(&path, cancel).await?;
        Ok(exercises.into_iter().map(Exercise::from).collect())
    }

    pub async fn body_parts(&self, cancel: &CancellationToken) -> Result<Vec<String>, ExerciseError> {
        self.fetch_list("/exercises/bodyPartList", cancel).await
    }

    pub async fn by_target(
        &self,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Exercise>, ExerciseError> {
        let exercises: Vec<ExerciseRecord> = self
            .fetch_list(&format!("/exercises/target/{target}"), cancel)
            .await?;
        Ok(exercises.into_iter().map(Exercise::from).collect())
    }

    pub async fn by_equipment(
        &self,
        equipment: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Exercise>, ExerciseError> {
        let exercises: Vec<ExerciseRecord> = self
            .fetch_list(&format!("/exercises/equipment/{equipment}"), cancel)
            .await?;
        Ok(exercises.into_iter().map(Exercise::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Exercise, ExerciseError> {
        let record: ExerciseRecord = self.fetch_json(&format!("/exercises/exercise/{id}")).await?;
        Ok(record.into())
    }

    /// Exercise detail, or a placeholder built from the id when the API fails
    pub async fn detail_or_fallback(&self, id: &str) -> Exercise {
        match self.get(id).await {
            Ok(exercise) => exercise,
            Err(e) => {
                tracing::warn!(%id, "Using fallback exercise data: {}", e);
                Exercise::from_slug(id)
            }
        }
    }
}

/// Exercises matching `query`; a blank query keeps everything
pub fn search(exercises: &[Exercise], query: &str) -> Vec<Exercise> {
    exercises
        .iter()
        .filter(|exercise| exercise.matches(query))
        .cloned()
        .collect()
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into range
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Slice `items` into pages of `per_page`. Out-of-range pages are clamped;
/// an empty listing has a single empty page.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());

    Page {
        items: items[start.min(end)..end].to_vec(),
        page,
        total_pages,
        total: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: &str, name: &str, target: &str, body_part: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: name.into(),
            target: target.into(),
            body_part: body_part.into(),
            ..Default::default()
        }
        .normalized()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let list = vec![
            exercise("1", "Barbell Curl", "biceps", "upper arms"),
            exercise("2", "Squat", "glutes", "upper legs"),
            exercise("3", "Push-up", "pectorals", "chest"),
        ];

        assert_eq!(search(&list, "CURL").len(), 1);
        assert_eq!(search(&list, "glutes")[0].id, "2");
        assert_eq!(search(&list, "upper").len(), 2);
        assert_eq!(search(&list, "  ").len(), 3);
        assert!(search(&list, "deadlift").is_empty());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=30).collect();

        let first = paginate(&items, 1, 12);
        assert_eq!(first.items.len(), 12);
        assert_eq!(first.total_pages, 3);

        let last = paginate(&items, 3, 12);
        assert_eq!(last.items, (25..=30).collect::<Vec<_>>());

        let clamped = paginate(&items, 9, 12);
        assert_eq!(clamped.page, 3);

        let empty = paginate::<u32>(&[], 1, 12);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_error_retryability() {
        assert!(!ExerciseError::Cancelled.is_retryable());
        assert!(!ExerciseError::MissingApiKey.is_retryable());
        assert!(ExerciseError::Network("x".into()).is_retryable());
    }
}
