//! External match-result provider client
//!
//! The provider's payload shape is explicitly unconstrained: it is fetched as
//! an opaque `serde_json::Value` behind an `Arc` and handed to the walker.
//! The `Arc` identity is what the lookup cache keys on, so one fetch maps to
//! one cached lookup table.

use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

const USER_AGENT: &str = "codystats-recon/0.1.0";
const RATE_LIMIT_MS: u64 = 500; // 2 requests per second, polite default

/// Results client errors
#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Rate limiter spacing requests at a minimum interval
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Client for the external match-result provider
pub struct ResultsClient {
    http: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl ResultsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ResultsError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ResultsError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }

    /// Fetch the full reported-result payload for an event, shape unknown
    pub async fn fetch_event_results(
        &self,
        season: u16,
        event_key: &str,
    ) -> Result<Arc<Value>, ResultsError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/{}/matches/{}", self.base_url, season, event_key);
        tracing::debug!(season, event_key = %event_key, url = %url, "Fetching event results");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ResultsError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ResultsError::EventNotFound(event_key.to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(ResultsError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResultsError::Api(status.as_u16(), body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ResultsError::Parse(e.to_string()))?;
        Ok(Arc::new(payload))
    }
}
