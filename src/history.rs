//! Scan history value types.
//!
//! The core does not persist anything; an external key-value store owns
//! scan history, keyed by generated scan ids. This module provides the
//! storable record shape, id generation, the out-of-band annotation
//! attachment that record shape allows, and aggregate statistics computed
//! over a slice of records.

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::annotate::Annotation;
use crate::models::{AnalysisResult, RiskLevel};

/// Length of the random suffix in a scan id.
const SCAN_ID_SUFFIX_LEN: usize = 9;

/// Generates a scan id: epoch milliseconds plus a random alphanumeric
/// suffix, unique enough for a per-user history store.
pub fn generate_scan_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SCAN_ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix.to_lowercase())
}

/// One stored scan: the analysis result plus history bookkeeping.
///
/// The record, not the result, is the unit of mutation: an annotation can
/// be attached after the fact and the favorite flag toggled, without ever
/// re-running or altering the analysis itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Store key.
    pub id: String,
    /// When the scan was recorded.
    pub timestamp: DateTime<Utc>,
    /// The URL that was analyzed, duplicated out of the result for cheap
    /// listing queries.
    pub url: Url,
    /// The immutable analysis result.
    pub result: AnalysisResult,
    /// Optional annotation, attached out-of-band by the caller.
    pub annotation: Option<Annotation>,
    /// User-set favorite flag.
    pub favorite: bool,
}

impl ScanRecord {
    /// Wraps an analysis result into a storable record with a fresh id.
    pub fn new(result: AnalysisResult) -> Self {
        ScanRecord {
            id: generate_scan_id(),
            timestamp: Utc::now(),
            url: result.requested_url.clone(),
            result,
            annotation: None,
            favorite: false,
        }
    }

    /// Attaches (or replaces) the annotation.
    pub fn attach_annotation(&mut self, annotation: Annotation) {
        self.annotation = Some(annotation);
    }

    /// Flips the favorite flag.
    pub fn toggle_favorite(&mut self) {
        self.favorite = !self.favorite;
    }
}

/// Distribution of stored scans across risk levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    /// Scans classified secure.
    pub secure: usize,
    /// Scans classified caution.
    pub caution: usize,
    /// Scans classified danger.
    pub danger: usize,
    /// Scans classified critical.
    pub critical: usize,
}

/// Aggregate statistics over a history slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Total records counted.
    pub total_scans: usize,
    /// Per-level counts.
    pub risk_distribution: RiskDistribution,
    /// Records flagged as favorite.
    pub favorite_scans: usize,
}

impl ScanStats {
    /// Computes statistics over the given records.
    pub fn compute(records: &[ScanRecord]) -> Self {
        let mut stats = ScanStats {
            total_scans: records.len(),
            ..ScanStats::default()
        };
        for record in records {
            match record.result.risk_level {
                RiskLevel::Secure => stats.risk_distribution.secure += 1,
                RiskLevel::Caution => stats.risk_distribution.caution += 1,
                RiskLevel::Danger => stats.risk_distribution.danger += 1,
                RiskLevel::Critical => stats.risk_distribution.critical += 1,
            }
            if record.favorite {
                stats.favorite_scans += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{Language, TemplateAnnotator};
    use crate::config::AnalyzerConfig;
    use crate::expand::StaticTable;
    use crate::UrlAnalyzer;
    use std::sync::Arc;

    async fn sample_record(short: &str, destination: &str) -> ScanRecord {
        let analyzer = UrlAnalyzer::with_strategies(
            &AnalyzerConfig::default(),
            vec![Arc::new(StaticTable::from_pairs([(short, destination)]))],
        );
        ScanRecord::new(analyzer.analyze(short).await.unwrap())
    }

    #[test]
    fn scan_ids_have_timestamp_and_suffix() {
        let id = generate_scan_id();
        let (millis, suffix) = id.split_once('-').expect("id has two parts");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), SCAN_ID_SUFFIX_LEN);
        assert_ne!(generate_scan_id(), id);
    }

    #[tokio::test]
    async fn annotation_attaches_without_touching_result() {
        let mut record =
            sample_record("https://bit.ly/abc", "https://example.com/landing").await;
        let before = record.result.clone();

        let annotation = TemplateAnnotator::render(&record.result, Language::En);
        record.attach_annotation(annotation.clone());

        assert_eq!(record.annotation.as_ref(), Some(&annotation));
        assert_eq!(record.result, before);
    }

    #[tokio::test]
    async fn favorite_toggles() {
        let mut record =
            sample_record("https://bit.ly/abc", "https://example.com/landing").await;
        assert!(!record.favorite);
        record.toggle_favorite();
        assert!(record.favorite);
        record.toggle_favorite();
        assert!(!record.favorite);
    }

    #[tokio::test]
    async fn stats_count_levels_and_favorites() {
        let mut dangerous =
            sample_record("https://bit.ly/abc", "https://example.com/landing").await;
        dangerous.toggle_favorite();
        let secure = sample_record("https://github.com/rust-lang", "https://unused.example/").await;

        let stats = ScanStats::compute(&[dangerous.clone(), secure]);
        assert_eq!(stats.total_scans, 2);
        assert_eq!(stats.favorite_scans, 1);
        assert_eq!(stats.risk_distribution.danger, 1);
        assert_eq!(stats.risk_distribution.secure, 1);
        assert_eq!(stats.risk_distribution.caution, 0);
    }

    #[tokio::test]
    async fn record_round_trips_through_json() {
        let record = sample_record("https://bit.ly/abc", "https://example.com/landing").await;
        let json = serde_json::to_string(&record).unwrap();
        let back: ScanRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
