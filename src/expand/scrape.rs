//! Pattern-scrape expansion strategy.
//!
//! Some shorteners publish a human-readable preview page for every short
//! link. This strategy fetches that page through a neutral fetch proxy and
//! regex-extracts the embedded destination URL with a small ordered pattern
//! list, first match wins.
//!
//! Upstream markup is outside our control, so this is best-effort by
//! definition: it runs after the direct probe and the authoritative API,
//! and every extracted candidate must re-validate as an absolute http(s)
//! URL before it is accepted.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error_handling::ExpansionFailure;
use crate::expand::{validate_candidate, ExpansionOutcome, ExpansionStrategy, StrategyId};

/// Known markup patterns carrying the destination URL, in match priority
/// order. Keep anchored to attribute/field names; bare URL matches would
/// pick up unrelated links on the preview page.
static EXTRACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"data-long-url="([^"]+)""#,
        r#""long_url"\s*:\s*"([^"]+)""#,
        r#"long_url\s*:\s*'([^']+)'"#,
        r#"redirecturl=([^&"']+)"#,
        r#"data-url="([^"]+)""#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("extraction pattern compiles"))
    .collect()
});

/// Response body of an allorigins-style fetch proxy.
#[derive(Debug, Deserialize)]
struct ProxyResponse {
    contents: Option<String>,
}

/// Regex scrape of shortener preview pages via a neutral fetch proxy.
pub struct PreviewScrape {
    client: Arc<reqwest::Client>,
    proxy_endpoint: String,
}

impl PreviewScrape {
    /// Creates the strategy against the given proxy endpoint. The proxy is
    /// expected to take the target in a `url` query parameter and wrap the
    /// fetched page in a JSON `contents` field.
    pub fn new(client: Arc<reqwest::Client>, proxy_endpoint: String) -> Self {
        PreviewScrape {
            client,
            proxy_endpoint,
        }
    }

    /// Builds the public preview URL for a short link, when the shortener
    /// has one.
    fn preview_url(url: &Url) -> Option<Url> {
        let host = url.host_str()?;
        let code = url.path().trim_start_matches('/');
        if code.is_empty() {
            return None;
        }
        let preview = match host {
            "bit.ly" => format!("https://bit.ly/{code}+"),
            "tinyurl.com" => format!("https://preview.tinyurl.com/{code}"),
            _ => return None,
        };
        Url::parse(&preview).ok()
    }

    /// Applies the pattern list to fetched markup. First match wins.
    fn extract_destination(contents: &str) -> Option<String> {
        for pattern in EXTRACTION_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(contents) {
                if let Some(m) = captures.get(1) {
                    let decoded = percent_decode_str(m.as_str())
                        .decode_utf8_lossy()
                        .into_owned();
                    return Some(decoded);
                }
            }
        }
        None
    }

    async fn fetch_preview(&self, preview: &Url) -> Result<String, ExpansionFailure> {
        let mut proxied = Url::parse(&self.proxy_endpoint)
            .map_err(|_| ExpansionFailure::InvalidCandidate(self.proxy_endpoint.clone()))?;
        proxied
            .query_pairs_mut()
            .append_pair("url", preview.as_str());

        let response = self.client.get(proxied).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExpansionFailure::Status(status.as_u16()));
        }

        let body: ProxyResponse = response
            .json()
            .await
            .map_err(|err| ExpansionFailure::Network(err.to_string()))?;
        body.contents.ok_or(ExpansionFailure::MissingField)
    }
}

#[async_trait]
impl ExpansionStrategy for PreviewScrape {
    fn id(&self) -> StrategyId {
        StrategyId::PreviewScrape
    }

    async fn attempt(&self, url: &Url) -> ExpansionOutcome {
        let Some(preview) = Self::preview_url(url) else {
            // No preview form for this host; nothing to scrape.
            return ExpansionOutcome::NoChange;
        };

        let contents = match self.fetch_preview(&preview).await {
            Ok(contents) => contents,
            Err(failure) => {
                log::debug!("preview scrape failed for {url}: {failure}");
                return ExpansionOutcome::Failed(failure);
            }
        };

        let Some(candidate) = Self::extract_destination(&contents) else {
            return ExpansionOutcome::Failed(ExpansionFailure::NoMatch);
        };

        match validate_candidate(&candidate) {
            Ok(next) if next != *url => ExpansionOutcome::Resolved(next),
            Ok(_) => ExpansionOutcome::NoChange,
            Err(failure) => ExpansionOutcome::Failed(failure),
        }
    }
}
