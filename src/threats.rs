//! Threat identification.
//!
//! Maps a resolved chain to a duplicate-free list of named threat tags,
//! evaluated independently of the numeric score. Deterministic: same chain,
//! same tags, in the same detection order.

use std::collections::HashSet;

use crate::models::{RedirectChain, ThreatTag};

/// Chain length above which the chain itself is flagged.
const LONG_CHAIN_THRESHOLD: usize = 3;

/// Distinct hostname count above which redirection is flagged as
/// cross-domain.
const CROSS_DOMAIN_THRESHOLD: usize = 2;

/// Substrings marking a hop URL as carrying tracking parameters. Broader
/// than the scorer's query-only markers: the whole URL is searched.
const TRACKING_URL_MARKERS: &[&str] = &["utm_", "ref=", "tracking"];

/// Identifies threats present on a chain, in detection order.
pub fn identify_threats(chain: &RedirectChain) -> Vec<ThreatTag> {
    let mut threats = Vec::new();

    if chain.len() > LONG_CHAIN_THRESHOLD {
        threats.push(ThreatTag::MultipleRedirectChain);
    }

    if chain.hops().iter().any(|hop| hop.url.scheme() != "https") {
        threats.push(ThreatTag::InsecureProtocol);
    }

    let distinct_hosts: HashSet<&str> = chain
        .hops()
        .iter()
        .filter_map(|hop| hop.url.host_str())
        .collect();
    if distinct_hosts.len() > CROSS_DOMAIN_THRESHOLD {
        threats.push(ThreatTag::CrossDomainRedirection);
    }

    let has_tracking = chain.hops().iter().any(|hop| {
        TRACKING_URL_MARKERS
            .iter()
            .any(|marker| hop.url.as_str().contains(marker))
    });
    if has_tracking {
        threats.push(ThreatTag::TrackingParameters);
    }

    threats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RedirectHop;
    use std::collections::BTreeMap;
    use url::Url;

    fn chain_of(urls: &[&str]) -> RedirectChain {
        RedirectChain::new(
            urls.iter()
                .map(|u| RedirectHop::new(Url::parse(u).unwrap(), 200, BTreeMap::new()))
                .collect(),
        )
    }

    #[test]
    fn clean_single_hop_has_no_threats() {
        let chain = chain_of(&["https://example.com/page"]);
        assert!(identify_threats(&chain).is_empty());
    }

    #[test]
    fn long_chain_is_flagged() {
        let chain = chain_of(&[
            "https://a.example/",
            "https://a.example/2",
            "https://a.example/3",
            "https://a.example/4",
        ]);
        let threats = identify_threats(&chain);
        assert!(threats.contains(&ThreatTag::MultipleRedirectChain));
        // Single distinct host, so no cross-domain tag.
        assert!(!threats.contains(&ThreatTag::CrossDomainRedirection));
    }

    #[test]
    fn three_hop_chain_is_not_long() {
        let chain = chain_of(&[
            "https://a.example/",
            "https://a.example/2",
            "https://a.example/3",
        ]);
        assert!(!identify_threats(&chain).contains(&ThreatTag::MultipleRedirectChain));
    }

    #[test]
    fn any_http_hop_flags_insecure_protocol() {
        let chain = chain_of(&["https://a.example/", "http://b.example/", "https://c.example/"]);
        assert!(identify_threats(&chain).contains(&ThreatTag::InsecureProtocol));
    }

    #[test]
    fn four_distinct_hostnames_flag_cross_domain() {
        let chain = chain_of(&[
            "https://a.example/",
            "https://b.example/",
            "https://c.example/",
            "https://d.example/",
        ]);
        let threats = identify_threats(&chain);
        assert!(threats.contains(&ThreatTag::CrossDomainRedirection));
        assert!(threats.contains(&ThreatTag::MultipleRedirectChain));
    }

    #[test]
    fn two_distinct_hostnames_do_not_flag_cross_domain() {
        let chain = chain_of(&["https://a.example/", "https://b.example/"]);
        assert!(!identify_threats(&chain).contains(&ThreatTag::CrossDomainRedirection));
    }

    #[test]
    fn tracking_markers_match_anywhere_in_url() {
        let in_query = chain_of(&["https://a.example/?utm_campaign=x"]);
        assert!(identify_threats(&in_query).contains(&ThreatTag::TrackingParameters));

        let in_path = chain_of(&["https://a.example/tracking/pixel"]);
        assert!(identify_threats(&in_path).contains(&ThreatTag::TrackingParameters));
    }

    #[test]
    fn detection_order_is_stable() {
        let chain = chain_of(&[
            "http://a.example/?ref=1",
            "https://b.example/",
            "https://c.example/",
            "https://d.example/",
        ]);
        assert_eq!(
            identify_threats(&chain),
            vec![
                ThreatTag::MultipleRedirectChain,
                ThreatTag::InsecureProtocol,
                ThreatTag::CrossDomainRedirection,
                ThreatTag::TrackingParameters,
            ]
        );
    }
}
