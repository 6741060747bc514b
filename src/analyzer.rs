//! Analysis facade.
//!
//! `UrlAnalyzer` validates the input, resolves the redirect chain, runs the
//! scorer, threat identifier and topology builder over it, and assembles
//! the final `AnalysisResult` with timing metadata. Collaborators are
//! injected at construction so tests can substitute deterministic
//! strategies for the network-backed ones.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{AnalyzerConfig, MAX_URL_LENGTH};
use crate::error_handling::AnalyzeError;
use crate::expand::{DirectProbe, ExpansionStrategy, PreviewScrape, UnshortenApi};
use crate::models::{AnalysisResult, RedirectHop, UrlMetadata};
use crate::registry::ShortenerRegistry;
use crate::resolver::ChainResolver;
use crate::scoring::{risk_level_for, score_chain};
use crate::threats::identify_threats;
use crate::topology::build_network_nodes;

/// Validates and normalizes a candidate URL.
///
/// Adds an `https://` prefix when no scheme is present, rejects over-long
/// input, and requires the result to parse as an absolute http/https URL.
///
/// # Errors
///
/// Returns [`AnalyzeError::InvalidInput`] for anything that does not
/// normalize to a valid absolute http(s) URL.
pub fn validate_and_normalize_url(raw: &str) -> Result<Url, AnalyzeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_URL_LENGTH {
        return Err(AnalyzeError::InvalidInput(raw.to_string()));
    }

    let normalized = if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        format!("https://{trimmed}")
    } else {
        trimmed.to_string()
    };
    if normalized.len() > MAX_URL_LENGTH {
        return Err(AnalyzeError::InvalidInput(raw.to_string()));
    }

    let parsed =
        Url::parse(&normalized).map_err(|_| AnalyzeError::InvalidInput(raw.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(AnalyzeError::InvalidInput(raw.to_string())),
    }
}

/// The analysis facade: one call in, one `AnalysisResult` out.
pub struct UrlAnalyzer {
    resolver: ChainResolver,
}

impl UrlAnalyzer {
    /// Creates an analyzer with the production strategy set (direct probe,
    /// unshortening API, preview scrape) built from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP clients cannot be constructed.
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let redirect_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_hops))
            .timeout(config.strategy_attempt_timeout)
            .build()
            .context("failed to build redirect-following HTTP client")?;
        let plain_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.strategy_attempt_timeout)
            .build()
            .context("failed to build HTTP client")?;

        let redirect_client = Arc::new(redirect_client);
        let plain_client = Arc::new(plain_client);

        let strategies: Vec<Arc<dyn ExpansionStrategy>> = vec![
            Arc::new(DirectProbe::new(Arc::clone(&redirect_client))),
            Arc::new(UnshortenApi::new(
                Arc::clone(&plain_client),
                config.unshorten_api_endpoint.clone(),
            )),
            Arc::new(PreviewScrape::new(
                Arc::clone(&plain_client),
                config.fetch_proxy_endpoint.clone(),
            )),
        ];

        Ok(Self::with_strategies(config, strategies))
    }

    /// Creates an analyzer over an explicit strategy set. Tests use this to
    /// substitute deterministic strategies for the network-backed ones.
    pub fn with_strategies(
        config: &AnalyzerConfig,
        strategies: Vec<Arc<dyn ExpansionStrategy>>,
    ) -> Self {
        UrlAnalyzer {
            resolver: ChainResolver::new(ShortenerRegistry::new(), strategies, config),
        }
    }

    /// Analyzes a URL: validate, resolve, score, identify threats, build
    /// topology, assemble.
    ///
    /// # Errors
    ///
    /// [`AnalyzeError::InvalidInput`] for malformed input. Network-layer
    /// degradations never fail the analysis; they shorten the chain.
    pub async fn analyze(&self, raw_url: &str) -> Result<AnalysisResult, AnalyzeError> {
        self.analyze_with_cancellation(raw_url, &CancellationToken::new())
            .await
    }

    /// Like [`analyze`](Self::analyze), but abortable. Cancelling the token
    /// cancels in-flight hop resolution promptly and surfaces
    /// [`AnalyzeError::Cancelled`].
    pub async fn analyze_with_cancellation(
        &self,
        raw_url: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalyzeError> {
        let url = validate_and_normalize_url(raw_url)?;
        log::info!("analyzing {url}");

        let started = Instant::now();
        let chain = self.resolver.resolve(url.clone(), cancel).await?;
        let scan_duration = started.elapsed();

        let risk_score = score_chain(&chain);
        let risk_level = risk_level_for(risk_score);
        let threats = identify_threats(&chain);
        let network_nodes = build_network_nodes(&chain);
        let metadata = destination_metadata(chain.last());

        log::info!(
            "resolved {url} in {} hop(s): score {risk_score} ({risk_level})",
            chain.len()
        );

        Ok(AnalysisResult {
            requested_url: url,
            total_redirects: chain.redirect_count(),
            final_destination: chain.last().url.clone(),
            chain,
            risk_score,
            risk_level,
            threats,
            network_nodes,
            scan_duration_seconds: scan_duration.as_secs_f64(),
            metadata,
        })
    }
}

/// Structural facts about the terminal hop.
fn destination_metadata(last: &RedirectHop) -> UrlMetadata {
    let is_https = last.url.scheme() == "https";
    UrlMetadata {
        domain: last.url.host_str().unwrap_or_default().to_string(),
        protocol: last.url.scheme().to_string(),
        is_https,
        // Scheme heuristic: an HTTPS destination presented a certificate.
        has_valid_certificate: is_https,
        content_type: last.headers.get("content-type").cloned(),
        server_headers: last.headers.clone(),
    }
}
