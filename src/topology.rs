//! Chain topology derivation for display.
//!
//! Builds one presentational node per hop with a derived role and synthetic
//! layout coordinates. Nothing downstream depends on the geometry; the
//! y-coordinate is fixed rather than jittered so results are reproducible.

use crate::models::{LayoutPosition, NetworkNode, NodeRole, RedirectChain};

/// Leftmost node x-coordinate.
const X_ORIGIN: f64 = 10.0;
/// Horizontal span the chain is spread across.
const X_SPAN: f64 = 80.0;
/// Fixed y-coordinate; a layout hint with no meaning.
const Y_BASELINE: f64 = 50.0;

/// URL substrings marking a hop as a tracker node.
const TRACKER_MARKERS: &[&str] = &["utm_", "ref="];

/// Derives the node/edge graph for a chain: linear topology, each
/// non-terminal node connected to its immediate successor.
pub fn build_network_nodes(chain: &RedirectChain) -> Vec<NetworkNode> {
    let hop_count = chain.len();
    let spacing = X_SPAN / (hop_count.saturating_sub(1)).max(1) as f64;

    chain
        .hops()
        .iter()
        .enumerate()
        .map(|(index, hop)| {
            let is_first = index == 0;
            let is_last = index == hop_count - 1;
            let has_tracking = TRACKER_MARKERS
                .iter()
                .any(|marker| hop.url.as_str().contains(marker));

            let role = if is_first {
                NodeRole::Origin
            } else if is_last {
                NodeRole::Destination
            } else if has_tracking {
                NodeRole::Tracker
            } else {
                NodeRole::Redirect
            };

            let connections = if is_last {
                Vec::new()
            } else {
                vec![format!("node-{}", index + 1)]
            };

            NetworkNode {
                id: format!("node-{index}"),
                role,
                position: LayoutPosition {
                    x: X_ORIGIN + index as f64 * spacing,
                    y: Y_BASELINE,
                },
                connections,
            }
        })
        .collect()
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
    fn single_hop_is_origin_centered_left() {
        let nodes = build_network_nodes(&chain_of(&["https://example.com/"]));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "node-0");
        assert_eq!(nodes[0].role, NodeRole::Origin);
        assert_eq!(nodes[0].position.x, 10.0);
        assert!(nodes[0].connections.is_empty());
    }

    #[test]
    fn roles_along_a_chain() {
        let nodes = build_network_nodes(&chain_of(&[
            "https://bit.ly/abc",
            "https://hop.example/?utm_source=x",
            "https://hop2.example/",
            "https://landing.example/",
        ]));
        assert_eq!(nodes[0].role, NodeRole::Origin);
        assert_eq!(nodes[1].role, NodeRole::Tracker);
        assert_eq!(nodes[2].role, NodeRole::Redirect);
        assert_eq!(nodes[3].role, NodeRole::Destination);
    }

    #[test]
    fn linear_connections_only() {
        let nodes = build_network_nodes(&chain_of(&[
            "https://a.example/",
            "https://b.example/",
            "https://c.example/",
        ]));
        assert_eq!(nodes[0].connections, vec!["node-1".to_string()]);
        assert_eq!(nodes[1].connections, vec!["node-2".to_string()]);
        assert!(nodes[2].connections.is_empty());
    }

    #[test]
    fn x_coordinates_evenly_spaced_within_bounds() {
        let nodes = build_network_nodes(&chain_of(&[
            "https://a.example/",
            "https://b.example/",
            "https://c.example/",
        ]));
        assert_eq!(nodes[0].position.x, 10.0);
        assert_eq!(nodes[1].position.x, 50.0);
        assert_eq!(nodes[2].position.x, 90.0);
        for node in &nodes {
            assert!((0.0..=100.0).contains(&node.position.x));
            assert!((0.0..=100.0).contains(&node.position.y));
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let chain = chain_of(&["https://bit.ly/abc", "https://landing.example/"]);
        assert_eq!(build_network_nodes(&chain), build_network_nodes(&chain));
    }
}
