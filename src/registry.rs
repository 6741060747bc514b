//! Shortener registry: which hostnames are link shorteners, and which
//! expansion strategies apply to each, in priority order.
//!
//! The table is static and side-effect free. Exact hostname match; unknown
//! hostnames get an empty order, which the resolver reads as "not
//! shortened, no expansion attempted".

use crate::expand::StrategyId;

/// Shortener hostnames the risk scorer matches by substring, mirroring the
/// registry keys below.
pub const KNOWN_SHORTENERS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "is.gd",
];

/// Full strategy ladder for shorteners with a public preview page. The
/// static-table slot is last-resort and vacant unless the analyzer was
/// built with a table (tests, sandboxed environments).
const FULL_LADDER: &[StrategyId] = &[
    StrategyId::DirectProbe,
    StrategyId::UnshortenApi,
    StrategyId::PreviewScrape,
    StrategyId::StaticTable,
];

/// Ladder for shorteners without a scrapeable preview form.
const NO_PREVIEW_LADDER: &[StrategyId] = &[
    StrategyId::DirectProbe,
    StrategyId::UnshortenApi,
    StrategyId::StaticTable,
];

/// Static mapping of known shortener hostnames to expansion strategy order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortenerRegistry;

impl ShortenerRegistry {
    /// Creates the registry. Stateless; exists so the analyzer can hold it
    /// as an explicit collaborator.
    pub fn new() -> Self {
        ShortenerRegistry
    }

    /// Returns the strategy order for a hostname, or an empty slice when
    /// the hostname is not a known shortener.
    pub fn strategy_order(&self, hostname: &str) -> &'static [StrategyId] {
        match hostname {
            "bit.ly" | "tinyurl.com" => FULL_LADDER,
            "t.co" | "goo.gl" | "ow.ly" | "is.gd" => NO_PREVIEW_LADDER,
            _ => &[],
        }
    }

    /// True when the hostname contains a known shortener domain. Substring
    /// semantics on purpose: the scorer counts `www.bit.ly`-style hosts too.
    pub fn is_known_shortener(&self, hostname: &str) -> bool {
        KNOWN_SHORTENERS.iter().any(|s| hostname.contains(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_shorteners_get_a_ladder() {
        let registry = ShortenerRegistry::new();
        let order = registry.strategy_order("bit.ly");
        assert_eq!(order.first(), Some(&StrategyId::DirectProbe));
        assert!(order.contains(&StrategyId::PreviewScrape));

        let tco = registry.strategy_order("t.co");
        assert!(!tco.is_empty());
        assert!(!tco.contains(&StrategyId::PreviewScrape));
        // Last-resort slot present in every ladder.
        assert_eq!(order.last(), Some(&StrategyId::StaticTable));
        assert_eq!(tco.last(), Some(&StrategyId::StaticTable));
    }

    #[test]
    fn unknown_hostname_gets_empty_order() {
        let registry = ShortenerRegistry::new();
        assert!(registry.strategy_order("example.com").is_empty());
        // Exact match only: a subdomain of a shortener is not a registry hit.
        assert!(registry.strategy_order("evil.bit.ly.example.com").is_empty());
    }

    #[test]
    fn shortener_substring_check() {
        let registry = ShortenerRegistry::new();
        assert!(registry.is_known_shortener("bit.ly"));
        assert!(registry.is_known_shortener("www.bit.ly"));
        assert!(!registry.is_known_shortener("example.com"));
    }
}
