//! Heuristic risk scoring.
//!
//! A purely additive model over structural signals, evaluated for every hop
//! and clamped to [0,100]. This is best-effort classification, not ground
//! truth: the weights are heuristics, signals double-count across hops on
//! purpose, and the safe-domain credit floors the running total at zero as
//! it is applied.

use url::{Host, Url};

use crate::config::{
    HIGH_RISK_TLDS, LONG_URL_THRESHOLD, MAX_HOSTNAME_LABELS, MEDIUM_RISK_TLDS, SAFE_DOMAINS,
    SUSPICIOUS_KEYWORDS, SUSPICIOUS_PORTS, TRACKING_QUERY_MARKERS,
};
use crate::models::{RedirectChain, RiskLevel};
use crate::registry::KNOWN_SHORTENERS;

// Signal weights. Each applies per offending hop.
const CHAIN_LENGTH_POINTS_PER_HOP: i64 = 20;
const CHAIN_LENGTH_CAP: i64 = 40;
const HIGH_RISK_TLD_POINTS: i64 = 35;
const MEDIUM_RISK_TLD_POINTS: i64 = 15;
const SHORTENER_POINTS: i64 = 25;
const TRACKING_QUERY_POINTS: i64 = 10;
const INSECURE_SCHEME_POINTS: i64 = 30;
const SUSPICIOUS_KEYWORD_POINTS: i64 = 40;
const SUBDOMAIN_CHAIN_POINTS: i64 = 15;
const IP_LITERAL_POINTS: i64 = 25;
const SUSPICIOUS_PORT_POINTS: i64 = 10;
const LONG_URL_POINTS: i64 = 10;
const SAFE_DOMAIN_CREDIT: i64 = 20;

/// Maximum score after clamping.
pub const MAX_SCORE: u8 = 100;

/// Scores a resolved chain.
///
/// Every hop is evaluated against every rule; contributions are additive
/// and commutative apart from the safe-domain credit, which is applied to
/// the running total (floored at zero) in hop order, and the final clamp.
pub fn score_chain(chain: &RedirectChain) -> u8 {
    let mut score: i64 = 0;

    if chain.len() > 1 {
        score += ((chain.len() as i64 - 1) * CHAIN_LENGTH_POINTS_PER_HOP).min(CHAIN_LENGTH_CAP);
    }

    for hop in chain.hops() {
        score += hop_points(&hop.url);
        if is_safe_domain(&hop.url) {
            score = (score - SAFE_DOMAIN_CREDIT).max(0);
        }
    }

    score.min(MAX_SCORE as i64) as u8
}

/// Maps a score to its discrete level. Thresholds are inclusive upper
/// bounds: 20, 40, 70.
pub fn risk_level_for(score: u8) -> RiskLevel {
    match score {
        0..=20 => RiskLevel::Secure,
        21..=40 => RiskLevel::Caution,
        41..=70 => RiskLevel::Danger,
        _ => RiskLevel::Critical,
    }
}

/// Additive penalty points for one hop.
fn hop_points(url: &Url) -> i64 {
    let mut points = 0;
    let host = url.host_str().unwrap_or("");

    if HIGH_RISK_TLDS.iter().any(|tld| host.ends_with(tld)) {
        points += HIGH_RISK_TLD_POINTS;
    }
    if MEDIUM_RISK_TLDS.iter().any(|tld| host.ends_with(tld)) {
        points += MEDIUM_RISK_TLD_POINTS;
    }
    if KNOWN_SHORTENERS.iter().any(|s| host.contains(s)) {
        points += SHORTENER_POINTS;
    }
    if has_tracking_query(url) {
        points += TRACKING_QUERY_POINTS;
    }
    if url.scheme() != "https" {
        points += INSECURE_SCHEME_POINTS;
    }
    if SUSPICIOUS_KEYWORDS
        .iter()
        .any(|kw| url.as_str().contains(kw))
    {
        points += SUSPICIOUS_KEYWORD_POINTS;
    }
    if host.split('.').count() > MAX_HOSTNAME_LABELS {
        points += SUBDOMAIN_CHAIN_POINTS;
    }
    if matches!(url.host(), Some(Host::Ipv4(_))) {
        points += IP_LITERAL_POINTS;
    }
    if url
        .port()
        .is_some_and(|port| SUSPICIOUS_PORTS.contains(&port))
    {
        points += SUSPICIOUS_PORT_POINTS;
    }
    if url.as_str().len() > LONG_URL_THRESHOLD {
        points += LONG_URL_POINTS;
    }

    points
}

/// Whether the hop's query string carries a tracking-style marker.
fn has_tracking_query(url: &Url) -> bool {
    let Some(query) = url.query() else {
        return false;
    };
    TRACKING_QUERY_MARKERS
        .iter()
        .any(|marker| query.contains(marker))
}

/// Whether the hop's hostname contains a well-known safe domain.
fn is_safe_domain(url: &Url) -> bool {
    let host = url.host_str().unwrap_or("");
    SAFE_DOMAINS.iter().any(|domain| host.contains(domain))
}
