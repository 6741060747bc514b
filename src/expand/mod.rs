//! Expansion strategies: interchangeable techniques for resolving one hop
//! of a possibly-shortened URL.
//!
//! Every strategy satisfies one contract (attempt to resolve a URL to a
//! next-hop URL, or signal failure) and never raises: all network and parse
//! errors are captured and converted to [`ExpansionOutcome::Failed`]. The
//! resolver tries strategies in registry order and enforces the time budget
//! around each attempt.

mod direct;
mod fixtures;
mod scrape;
mod unshorten;

pub use direct::DirectProbe;
pub use fixtures::StaticTable;
pub use scrape::PreviewScrape;
pub use unshorten::UnshortenApi;

use std::time::Duration;

use async_trait::async_trait;
use strum_macros::Display;
use url::Url;

use crate::error_handling::ExpansionFailure;

/// Identifies one expansion technique. The registry hands the resolver an
/// ordered list of these per shortener hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StrategyId {
    /// Redirect-following probe that retrieves only the final URL reached.
    DirectProbe,
    /// Authoritative third-party unshortening API.
    UnshortenApi,
    /// Regex scrape of the shortener's public preview page via a proxy.
    PreviewScrape,
    /// Deterministic static mapping; pluggable test/sandbox slot.
    StaticTable,
}

/// Result of one expansion attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpansionOutcome {
    /// The strategy resolved the URL to a different next-hop URL.
    Resolved(Url),
    /// The strategy completed but the URL does not redirect anywhere.
    NoChange,
    /// The strategy could not complete. Recovered by trying the next one.
    Failed(ExpansionFailure),
}

/// One technique for resolving a single hop's next URL.
///
/// Implementations must complete within the resolver's attempt budget or be
/// cut off by it, and must never panic on hostile input.
#[async_trait]
pub trait ExpansionStrategy: Send + Sync {
    /// Which technique this is, for registry ordering and logs.
    fn id(&self) -> StrategyId;

    /// Attempts to resolve `url` one hop forward.
    async fn attempt(&self, url: &Url) -> ExpansionOutcome;
}

/// Runs one attempt under a time budget, converting elapse to `Failed`.
pub(crate) async fn attempt_with_timeout(
    strategy: &dyn ExpansionStrategy,
    url: &Url,
    budget: Duration,
) -> ExpansionOutcome {
    match tokio::time::timeout(budget, strategy.attempt(url)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            log::debug!("{} attempt timed out for {url}", strategy.id());
            ExpansionOutcome::Failed(ExpansionFailure::Timeout)
        }
    }
}

/// Validates a candidate next-hop URL extracted from an API response or
/// scraped markup. Upstream data is outside our control; only absolute
/// http(s) URLs are accepted.
pub(crate) fn validate_candidate(candidate: &str) -> Result<Url, ExpansionFailure> {
    let parsed = Url::parse(candidate)
        .map_err(|_| ExpansionFailure::InvalidCandidate(candidate.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(ExpansionFailure::InvalidCandidate(candidate.to_string())),
    }
}
