//! Static mapping table strategy.
//!
//! A deterministic short-URL to destination mapping, supplied by the
//! caller. This is the pluggable strategy slot used by tests and sandboxed
//! environments where no network is available; it is never part of the
//! production registry ladders.

use std::collections::HashMap;

use async_trait::async_trait;
use url::Url;

use crate::expand::{ExpansionOutcome, ExpansionStrategy, StrategyId};

/// Deterministic expansion from a caller-supplied table, keyed by the full
/// short URL.
#[derive(Debug, Default)]
pub struct StaticTable {
    mappings: HashMap<String, Url>,
}

impl StaticTable {
    /// Builds the table from `(short, destination)` pairs. Pairs whose
    /// destination fails to parse are skipped.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mappings = pairs
            .into_iter()
            .filter_map(|(short, dest)| {
                let dest = Url::parse(dest).ok()?;
                Some((short.to_string(), dest))
            })
            .collect();
        StaticTable { mappings }
    }
}

#[async_trait]
impl ExpansionStrategy for StaticTable {
    fn id(&self) -> StrategyId {
        StrategyId::StaticTable
    }

    async fn attempt(&self, url: &Url) -> ExpansionOutcome {
        match self.mappings.get(url.as_str()) {
            Some(dest) if dest != url => ExpansionOutcome::Resolved(dest.clone()),
            _ => ExpansionOutcome::NoChange,
        }
    }
}
