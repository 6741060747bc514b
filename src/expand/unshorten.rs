//! Authoritative unshortening API strategy.
//!
//! Posts the shortened URL to a trusted third-party expansion service and
//! reads the long form from its JSON response. The service is rate limited,
//! so calls are spaced client-side and retried with backoff when throttled.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use url::Url;

use crate::config::{
    UNSHORTEN_API_MIN_INTERVAL, UNSHORTEN_API_RETRY_ATTEMPTS, UNSHORTEN_API_RETRY_DELAY_MS,
    UNSHORTEN_API_RETRY_MAX_DELAY_MS,
};
use crate::error_handling::ExpansionFailure;
use crate::expand::{validate_candidate, ExpansionOutcome, ExpansionStrategy, StrategyId};

/// Expected response body of the expansion service.
#[derive(Debug, Deserialize)]
struct UnshortenResponse {
    resolved_url: Option<String>,
}

/// Client for an unshorten.it-style expansion API.
pub struct UnshortenApi {
    client: Arc<reqwest::Client>,
    endpoint: String,
    min_interval: Duration,
    /// Start time of the most recent call; spaces requests to stay under
    /// the service's rate limit.
    last_call: Mutex<Option<Instant>>,
}

impl UnshortenApi {
    /// Creates the strategy against the given endpoint.
    pub fn new(client: Arc<reqwest::Client>, endpoint: String) -> Self {
        UnshortenApi {
            client,
            endpoint,
            min_interval: UNSHORTEN_API_MIN_INTERVAL,
            last_call: Mutex::new(None),
        }
    }

    /// Overrides the client-side throttle interval. Tests use a zero
    /// interval to avoid slowing the suite.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Waits until the throttle window allows another call, then claims it.
    async fn pace(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// One API round trip. `Ok(None)` means the service answered but the
    /// URL has no longer form.
    async fn call_once(&self, url: &Url) -> Result<Option<Url>, ExpansionFailure> {
        self.pace().await;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "url": url.as_str() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExpansionFailure::Status(status.as_u16()));
        }

        let body: UnshortenResponse = response
            .json()
            .await
            .map_err(|err| ExpansionFailure::Network(err.to_string()))?;

        let Some(resolved) = body.resolved_url else {
            return Err(ExpansionFailure::MissingField);
        };
        if resolved == url.as_str() {
            return Ok(None);
        }
        validate_candidate(&resolved).map(Some)
    }

    /// Whether a failure is worth retrying: throttling and transport
    /// errors are transient; a missing field or bad candidate is not.
    fn is_transient(failure: &ExpansionFailure) -> bool {
        matches!(
            failure,
            ExpansionFailure::Status(429)
                | ExpansionFailure::Status(500..=599)
                | ExpansionFailure::Network(_)
                | ExpansionFailure::Timeout
        )
    }
}

#[async_trait]
impl ExpansionStrategy for UnshortenApi {
    fn id(&self) -> StrategyId {
        StrategyId::UnshortenApi
    }

    async fn attempt(&self, url: &Url) -> ExpansionOutcome {
        let backoff = ExponentialBackoff::from_millis(UNSHORTEN_API_RETRY_DELAY_MS)
            .max_delay(Duration::from_millis(UNSHORTEN_API_RETRY_MAX_DELAY_MS))
            .take(UNSHORTEN_API_RETRY_ATTEMPTS);

        let result = RetryIf::spawn(backoff, || self.call_once(url), Self::is_transient).await;

        match result {
            Ok(Some(next)) => ExpansionOutcome::Resolved(next),
            Ok(None) => ExpansionOutcome::NoChange,
            Err(failure) => {
                log::debug!("unshorten API failed for {url}: {failure}");
                ExpansionOutcome::Failed(failure)
            }
        }
    }
}
