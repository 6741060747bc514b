//! Core data model for URL redirect-chain analysis.
//!
//! Everything an analysis produces lives here: the resolved redirect chain,
//! the risk classification, the threat tags, the presentational network
//! topology, and the aggregate `AnalysisResult`. All types are plain values
//! that serialize cleanly so an external history store can persist them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use url::Url;

/// One URL observed in a redirect chain, with its (real or synthesized)
/// status code and response headers.
///
/// Hops are immutable once appended to a chain. Intermediate hops carry a
/// synthetic `301` and a lowercase `location` header recording the next URL;
/// the terminal hop carries `200`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectHop {
    /// Absolute URL of this hop.
    pub url: Url,
    /// HTTP status code (synthetic for expanded shortener hops).
    pub status_code: u16,
    /// Response headers, lowercase keys. May be empty.
    pub headers: BTreeMap<String, String>,
    /// When this hop was observed.
    pub observed_at: DateTime<Utc>,
}

impl RedirectHop {
    /// Creates a hop observed now.
    pub fn new(url: Url, status_code: u16, headers: BTreeMap<String, String>) -> Self {
        RedirectHop {
            url,
            status_code,
            headers,
            observed_at: Utc::now(),
        }
    }
}

/// Ordered, non-empty sequence of hops from the originally submitted URL to
/// the resolved final destination.
///
/// Invariants (enforced by the resolver): length >= 1, no two consecutive
/// hops share a URL, and length never exceeds the configured hop limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectChain {
    hops: Vec<RedirectHop>,
}

impl RedirectChain {
    /// Builds a chain from hops. The hop list must be non-empty.
    pub fn new(hops: Vec<RedirectHop>) -> Self {
        debug_assert!(!hops.is_empty(), "a redirect chain has at least one hop");
        RedirectChain { hops }
    }

    /// All hops in order, first = submitted URL, last = final destination.
    pub fn hops(&self) -> &[RedirectHop] {
        &self.hops
    }

    /// Number of hops. Always >= 1.
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// A chain is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The first hop (the submitted URL).
    pub fn first(&self) -> &RedirectHop {
        &self.hops[0]
    }

    /// The terminal hop (the final destination).
    pub fn last(&self) -> &RedirectHop {
        self.hops.last().expect("chain is non-empty")
    }

    /// Number of redirections observed, i.e. `len() - 1`.
    pub fn redirect_count(&self) -> usize {
        self.hops.len() - 1
    }

    /// True if any hop already carries this URL.
    pub fn contains_url(&self, url: &Url) -> bool {
        self.hops.iter().any(|hop| &hop.url == url)
    }
}

/// Discrete risk classification, ordered by ascending severity.
///
/// Derived solely from the numeric risk score via fixed thresholds; see
/// [`crate::risk_level_for`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    /// Score 0-20: no structural danger signals worth acting on.
    Secure,
    /// Score 21-40: minor signals; worth a second look.
    Caution,
    /// Score 41-70: multiple signals; treat the link as hostile.
    Danger,
    /// Score 71-100: overwhelming signals.
    Critical,
}

/// Named threat observed on a chain. Closed vocabulary; a chain maps to a
/// duplicate-free list in detection order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ThreatTag {
    /// Chain is longer than three hops.
    MultipleRedirectChain,
    /// At least one hop uses plain HTTP.
    InsecureProtocol,
    /// More than two distinct hostnames appear across the chain.
    CrossDomainRedirection,
    /// A hop URL carries tracking-style parameters.
    TrackingParameters,
}

impl ThreatTag {
    /// Human-readable description of the threat.
    pub fn description(&self) -> &'static str {
        match self {
            ThreatTag::MultipleRedirectChain => "Multiple redirect chain detected",
            ThreatTag::InsecureProtocol => "Insecure HTTP protocol in chain",
            ThreatTag::CrossDomainRedirection => "Cross-domain redirections detected",
            ThreatTag::TrackingParameters => "Tracking parameters detected",
        }
    }
}

/// Role a node plays in the displayed chain topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeRole {
    /// The submitted URL.
    Origin,
    /// An intermediate redirect hop.
    Redirect,
    /// The final destination.
    Destination,
    /// A hop carrying tracking parameters.
    Tracker,
}

/// Layout coordinates in the [0,100] x [0,100] display plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPosition {
    /// Horizontal position, evenly spaced across [10,90] by hop index.
    pub x: f64,
    /// Vertical position. Layout hint only; carries no meaning.
    pub y: f64,
}

/// One node of the presentational chain topology.
///
/// Purely presentational and recomputed for every analysis; node ids are
/// stable per hop index within a single result only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// Stable-per-hop-index id, `node-<i>`.
    pub id: String,
    /// Derived role of this hop.
    pub role: NodeRole,
    /// Synthetic layout coordinates.
    pub position: LayoutPosition,
    /// Ids of downstream nodes. Linear chain: at most the immediate successor.
    pub connections: Vec<String>,
}

/// Structural facts about the final destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMetadata {
    /// Hostname of the final destination.
    pub domain: String,
    /// URL scheme of the final destination (`http` or `https`).
    pub protocol: String,
    /// Whether the final destination is served over TLS.
    pub is_https: bool,
    /// Best-effort certificate signal. This is a scheme heuristic, not a
    /// handshake: HTTPS implies a certificate was presented.
    pub has_valid_certificate: bool,
    /// `content-type` of the terminal hop, when one was observed.
    pub content_type: Option<String>,
    /// Response headers of the terminal hop, lowercase keys.
    pub server_headers: BTreeMap<String, String>,
}

/// Aggregate result of one URL analysis.
///
/// Created once per analysis request and never mutated afterwards; the
/// optional AI annotation lives outside this struct (see
/// [`crate::history::ScanRecord`]) and is attached out-of-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The URL as submitted (after normalization).
    pub requested_url: Url,
    /// The resolved redirect chain.
    pub chain: RedirectChain,
    /// Heuristic risk score in [0,100].
    pub risk_score: u8,
    /// Discrete classification derived from the score.
    pub risk_level: RiskLevel,
    /// Threat tags in detection order, duplicate-free.
    pub threats: Vec<ThreatTag>,
    /// `chain.len() - 1`.
    pub total_redirects: usize,
    /// URL of the terminal hop.
    pub final_destination: Url,
    /// Presentational topology, one node per hop.
    pub network_nodes: Vec<NetworkNode>,
    /// Wall-clock duration of chain resolution, in seconds.
    pub scan_duration_seconds: f64,
    /// Facts about the final destination.
    pub metadata: UrlMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn hop(url: &str) -> RedirectHop {
        RedirectHop::new(Url::parse(url).unwrap(), 200, BTreeMap::new())
    }

    #[test]
    fn chain_accessors() {
        let chain = RedirectChain::new(vec![hop("https://bit.ly/abc"), hop("https://example.com/")]);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.redirect_count(), 1);
        assert_eq!(chain.first().url.as_str(), "https://bit.ly/abc");
        assert_eq!(chain.last().url.as_str(), "https://example.com/");
        assert!(chain.contains_url(&Url::parse("https://example.com/").unwrap()));
        assert!(!chain.contains_url(&Url::parse("https://other.example/").unwrap()));
    }

    #[test]
    fn risk_levels_are_ordered_by_severity() {
        assert!(RiskLevel::Secure < RiskLevel::Caution);
        assert!(RiskLevel::Caution < RiskLevel::Danger);
        assert!(RiskLevel::Danger < RiskLevel::Critical);
    }

    #[test]
    fn risk_level_serializes_lowercase() {
        assert_eq!(RiskLevel::Danger.to_string(), "danger");
        assert_eq!(RiskLevel::from_str("critical").unwrap(), RiskLevel::Critical);
    }

    #[test]
    fn threat_tags_serialize_kebab_case() {
        assert_eq!(
            ThreatTag::MultipleRedirectChain.to_string(),
            "multiple-redirect-chain"
        );
        assert_eq!(
            ThreatTag::from_str("cross-domain-redirection").unwrap(),
            ThreatTag::CrossDomainRedirection
        );
        for tag in ThreatTag::iter() {
            assert!(!tag.description().is_empty());
        }
    }
}
