//! CodyStats backend API client
//!
//! Fetches the match schedule and per-team scouted records from the CodyStats
//! REST backend. The backend's JSON is loosely typed; deserialization into
//! the shared models tolerates the known spelling variants.

use cody_common::types::{ScheduleEntry, ScoutedRecord};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "codystats-recon/0.1.0";

/// Backend client errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for the CodyStats REST backend
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the ordered match schedule for an event
    pub async fn fetch_schedule(&self, event_key: &str) -> Result<Vec<ScheduleEntry>, BackendError> {
        let url = format!("{}/api/events/{}/schedule", self.base_url, event_key);
        tracing::debug!(event_key = %event_key, url = %url, "Fetching schedule");

        let response = self.get(&url, event_key).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Fetch one team's scouted match records for an event
    pub async fn fetch_scouted(
        &self,
        event_key: &str,
        team_number: u32,
    ) -> Result<Vec<ScoutedRecord>, BackendError> {
        let url = format!(
            "{}/api/events/{}/teams/{}/matches",
            self.base_url, event_key, team_number
        );
        tracing::debug!(event_key = %event_key, team = team_number, "Fetching scouted records");

        let response = self.get(&url, event_key).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn get(&self, url: &str, event_key: &str) -> Result<reqwest::Response, BackendError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::EventNotFound(event_key.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api(status.as_u16(), body));
        }
        Ok(response)
    }
}
