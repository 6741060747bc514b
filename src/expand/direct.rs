//! Direct navigation probe.
//!
//! Issues a redirect-following HEAD request and reports the final URL the
//! client landed on. No response body is retrieved. This is the cheapest
//! and most reliable technique when the shortener answers plain HTTP
//! redirects, so it runs first in every ladder.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::expand::{ExpansionOutcome, ExpansionStrategy, StrategyId};

/// Redirect-following probe restricted to retrieving only the final URL.
pub struct DirectProbe {
    /// Client built with redirect following enabled.
    client: Arc<reqwest::Client>,
}

impl DirectProbe {
    /// Creates the probe around a shared redirect-following client.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        DirectProbe { client }
    }
}

#[async_trait]
impl ExpansionStrategy for DirectProbe {
    fn id(&self) -> StrategyId {
        StrategyId::DirectProbe
    }

    async fn attempt(&self, url: &Url) -> ExpansionOutcome {
        let response = match self.client.head(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                log::debug!("direct probe failed for {url}: {err}");
                return ExpansionOutcome::Failed(err.into());
            }
        };

        // Success = the client was redirected somewhere else. The status of
        // the final response is irrelevant; a 404 at the destination is
        // still a resolved redirect.
        let final_url = response.url();
        if final_url == url {
            ExpansionOutcome::NoChange
        } else {
            ExpansionOutcome::Resolved(final_url.clone())
        }
    }
}
