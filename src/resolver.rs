//! Redirect-chain resolution.
//!
//! The resolver expands a URL hop by hop, consulting the shortener registry
//! for the strategy order at each hop and trying strategies until one
//! resolves. Hops are sequential (each needs the previous result); partial
//! failure is the normal case and terminates the chain instead of failing
//! the analysis.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::AnalyzerConfig;
use crate::error_handling::AnalyzeError;
use crate::expand::{attempt_with_timeout, ExpansionOutcome, ExpansionStrategy, StrategyId};
use crate::models::{RedirectChain, RedirectHop};
use crate::registry::ShortenerRegistry;

/// Synthetic status for a hop that was left via expansion.
const REDIRECT_STATUS: u16 = 301;
/// Status reserved for the terminal hop.
const TERMINAL_STATUS: u16 = 200;

/// Orchestrates expansion strategies into an ordered redirect chain.
pub struct ChainResolver {
    registry: ShortenerRegistry,
    strategies: HashMap<StrategyId, Arc<dyn ExpansionStrategy>>,
    max_hops: usize,
    strategy_attempt_timeout: Duration,
    per_hop_timeout: Duration,
    total_timeout: Duration,
}

impl ChainResolver {
    /// Creates a resolver over the given strategy instances. Ladder slots
    /// with no registered instance are skipped at resolution time.
    pub fn new(
        registry: ShortenerRegistry,
        strategies: Vec<Arc<dyn ExpansionStrategy>>,
        config: &AnalyzerConfig,
    ) -> Self {
        let strategies = strategies
            .into_iter()
            .map(|strategy| (strategy.id(), strategy))
            .collect();
        ChainResolver {
            registry,
            strategies,
            max_hops: config.max_hops,
            strategy_attempt_timeout: config.strategy_attempt_timeout,
            per_hop_timeout: config.per_hop_timeout,
            total_timeout: config.total_timeout,
        }
    }

    /// Resolves the redirect chain for an already-validated absolute URL.
    ///
    /// Never fails for network reasons; the chain simply terminates at the
    /// last hop that resolved. The only error is caller cancellation.
    pub async fn resolve(
        &self,
        original: Url,
        cancel: &CancellationToken,
    ) -> Result<RedirectChain, AnalyzeError> {
        let deadline = Instant::now() + self.total_timeout;
        let mut hops: Vec<RedirectHop> = Vec::new();
        let mut current = original;

        for _ in 0..self.max_hops.saturating_sub(1) {
            if cancel.is_cancelled() {
                return Err(AnalyzeError::Cancelled);
            }

            let order = match current.host_str() {
                Some(host) => self.registry.strategy_order(host),
                None => &[],
            };
            if order.is_empty() {
                // Not a known shortener; the chain is final.
                break;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!(
                    "resolution budget exhausted after {} hop(s) for {current}",
                    hops.len()
                );
                break;
            }
            let hop_budget = self.per_hop_timeout.min(remaining);

            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(AnalyzeError::Cancelled),
                next = self.expand_hop(&current, order, hop_budget) => next,
            };

            match next {
                Some(next) if next != current => {
                    if hops.iter().any(|hop| hop.url == next) {
                        // Shortener chains referencing each other; stop
                        // rather than loop.
                        log::warn!("redirect cycle detected at {next}, terminating chain");
                        break;
                    }
                    let mut headers = BTreeMap::new();
                    headers.insert("location".to_string(), next.to_string());
                    hops.push(RedirectHop::new(current, REDIRECT_STATUS, headers));
                    current = next;
                }
                // NoChange collapses onto the current hop; a strategy
                // producing no change is "no redirect", not a repeated hop.
                _ => break,
            }
        }

        hops.push(RedirectHop::new(current, TERMINAL_STATUS, BTreeMap::new()));
        Ok(RedirectChain::new(hops))
    }

    /// Tries each strategy in ladder order until one resolves, all under
    /// one hop budget. `None` = hop is terminal.
    async fn expand_hop(
        &self,
        url: &Url,
        order: &[StrategyId],
        hop_budget: Duration,
    ) -> Option<Url> {
        let ladder = async {
            for id in order {
                let Some(strategy) = self.strategies.get(id) else {
                    // Vacant slot (e.g. no static table registered).
                    continue;
                };
                match attempt_with_timeout(strategy.as_ref(), url, self.strategy_attempt_timeout)
                    .await
                {
                    ExpansionOutcome::Resolved(next) => {
                        log::debug!("{id} resolved {url} -> {next}");
                        return Some(next);
                    }
                    ExpansionOutcome::NoChange => {
                        log::debug!("{id} reported no change for {url}");
                    }
                    ExpansionOutcome::Failed(failure) => {
                        log::debug!("{id} failed for {url}: {failure}");
                    }
                }
            }
            None
        };

        match tokio::time::timeout(hop_budget, ladder).await {
            Ok(next) => next,
            Err(_) => {
                log::debug!("hop budget exhausted for {url}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::StaticTable;

    fn resolver_with_table(table: StaticTable) -> ChainResolver {
        ChainResolver::new(
            ShortenerRegistry::new(),
            vec![Arc::new(table)],
            &AnalyzerConfig::default(),
        )
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn resolves_two_hop_chain() {
        let resolver = resolver_with_table(StaticTable::from_pairs([(
            "https://bit.ly/abc",
            "https://example.com/landing",
        )]));

        let chain = resolver
            .resolve(url("https://bit.ly/abc"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.first().url.as_str(), "https://bit.ly/abc");
        assert_eq!(chain.first().status_code, 301);
        assert_eq!(
            chain.first().headers.get("location").map(String::as_str),
            Some("https://example.com/landing")
        );
        assert_eq!(chain.last().url.as_str(), "https://example.com/landing");
        assert_eq!(chain.last().status_code, 200);
    }

    #[tokio::test]
    async fn follows_shortener_to_shortener_chains() {
        let resolver = resolver_with_table(StaticTable::from_pairs([
            ("https://bit.ly/abc", "https://tinyurl.com/def"),
            ("https://tinyurl.com/def", "https://example.com/final"),
        ]));

        let chain = resolver
            .resolve(url("https://bit.ly/abc"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.last().url.as_str(), "https://example.com/final");
    }

    #[tokio::test]
    async fn unknown_host_is_terminal() {
        let resolver = resolver_with_table(StaticTable::from_pairs([]));
        let chain = resolver
            .resolve(url("https://example.com/page"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.last().status_code, 200);
        assert!(chain.last().headers.is_empty());
    }

    #[tokio::test]
    async fn unresolvable_shortener_is_terminal_not_an_error() {
        // Registry knows bit.ly, but no strategy can expand this code.
        let resolver = resolver_with_table(StaticTable::from_pairs([]));
        let chain = resolver
            .resolve(url("https://bit.ly/unknown"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.first().url.as_str(), "https://bit.ly/unknown");
    }

    #[tokio::test]
    async fn cycle_guard_stops_mutual_references() {
        let resolver = resolver_with_table(StaticTable::from_pairs([
            ("https://bit.ly/a", "https://tinyurl.com/b"),
            ("https://tinyurl.com/b", "https://bit.ly/a"),
        ]));

        let chain = resolver
            .resolve(url("https://bit.ly/a"), &CancellationToken::new())
            .await
            .unwrap();

        // a -> b appended, then b -> a hits the cycle guard.
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.last().url.as_str(), "https://tinyurl.com/b");
    }

    #[tokio::test]
    async fn chain_length_is_bounded_by_max_hops() {
        // is.gd/0 -> is.gd/1 -> ... unbounded without the hop cap.
        let pairs: Vec<(String, String)> = (0..50)
            .map(|i| {
                (
                    format!("https://is.gd/{i}"),
                    format!("https://is.gd/{}", i + 1),
                )
            })
            .collect();
        let table = StaticTable::from_pairs(
            pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())),
        );
        let resolver = resolver_with_table(table);

        let chain = resolver
            .resolve(url("https://is.gd/0"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chain.len(), AnalyzerConfig::default().max_hops);
    }

    #[tokio::test]
    async fn no_consecutive_duplicate_hops() {
        let resolver = resolver_with_table(StaticTable::from_pairs([(
            "https://bit.ly/abc",
            "https://bit.ly/abc",
        )]));

        let chain = resolver
            .resolve(url("https://bit.ly/abc"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chain.len(), 1);
    }

    #[tokio::test]
    async fn pre_cancelled_token_surfaces_cancelled() {
        let resolver = resolver_with_table(StaticTable::from_pairs([(
            "https://bit.ly/abc",
            "https://example.com/landing",
        )]));
        let token = CancellationToken::new();
        token.cancel();

        let result = resolver.resolve(url("https://bit.ly/abc"), &token).await;
        assert!(matches!(result, Err(AnalyzeError::Cancelled)));
    }

    #[tokio::test]
    async fn resolution_is_idempotent_against_deterministic_strategies() {
        let resolver = resolver_with_table(StaticTable::from_pairs([(
            "https://bit.ly/abc",
            "https://example.com/landing",
        )]));

        let first = resolver
            .resolve(url("https://bit.ly/abc"), &CancellationToken::new())
            .await
            .unwrap();
        let second = resolver
            .resolve(url("https://bit.ly/abc"), &CancellationToken::new())
            .await
            .unwrap();

        let urls = |chain: &RedirectChain| {
            chain
                .hops()
                .iter()
                .map(|hop| hop.url.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(urls(&first), urls(&second));
        let statuses = |chain: &RedirectChain| {
            chain
                .hops()
                .iter()
                .map(|hop| hop.status_code)
                .collect::<Vec<_>>()
        };
        assert_eq!(statuses(&first), statuses(&second));
    }
}
