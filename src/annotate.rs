//! Result annotation.
//!
//! An `Annotator` turns an `AnalysisResult` into prose for end users. Real
//! deployments plug an LLM-backed implementation into this seam; the core
//! ships only `TemplateAnnotator`, a deterministic pure-function fallback
//! that callers use when the external annotator is unavailable or errors.
//! Annotations are attached to stored scans out-of-band, keyed by scan id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::models::AnalysisResult;

/// Redirect count above which the chain is described as complex.
const COMPLEX_CHAIN_THRESHOLD: usize = 2;

/// Confidence reported by the deterministic template.
const TEMPLATE_CONFIDENCE: u8 = 85;

/// Annotation output language.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// French.
    Fr,
}

/// Human-readable assessment of one analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Two-to-three sentence overview.
    pub summary: String,
    /// Detailed risk evaluation.
    pub risk_assessment: String,
    /// Actionable recommendations, most important first.
    pub recommendations: Vec<String>,
    /// Annotator confidence in percent.
    pub confidence: u8,
    /// Time spent producing the annotation, in seconds.
    pub processing_time_seconds: f64,
}

/// Capability to annotate an analysis result.
///
/// Invoked by the caller, never by the analysis core. Implementations may
/// call external services and fail; callers fall back to
/// [`TemplateAnnotator`] on error.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Produces an annotation for `result` in `language`.
    async fn annotate(
        &self,
        result: &AnalysisResult,
        language: Language,
    ) -> anyhow::Result<Annotation>;
}

/// Deterministic template annotator: a pure function of the result's risk
/// level, redirect count, threat count and HTTPS flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAnnotator;

impl TemplateAnnotator {
    /// Renders the template. Pure and infallible; exposed directly so
    /// synchronous callers can skip the trait.
    pub fn render(result: &AnalysisResult, language: Language) -> Annotation {
        let redirects = result.total_redirects;
        let threats = result.threats.len();
        let is_https = result.metadata.is_https;
        let complex_chain = redirects > COMPLEX_CHAIN_THRESHOLD;
        let level = result.risk_level;

        match language {
            Language::En => Annotation {
                summary: format!(
                    "This URL presents a {level} risk level with {redirects} redirects detected."
                ),
                risk_assessment: {
                    let https_note = if is_https {
                        "Final destination uses HTTPS."
                    } else {
                        "Warning: Insecure HTTP protocol detected."
                    };
                    let chain_note = if complex_chain {
                        " Complex redirect chain may obscure true destination."
                    } else {
                        ""
                    };
                    format!("Analysis reveals {threats} potential threats. {https_note}{chain_note}")
                },
                recommendations: vec![
                    if is_https {
                        "Secure HTTPS destination".to_string()
                    } else {
                        "Avoid insecure HTTP links".to_string()
                    },
                    if complex_chain {
                        "Be cautious of multiple redirects".to_string()
                    } else {
                        "Simple redirect chain".to_string()
                    },
                    "Verify destination domain reputation".to_string(),
                    "Use additional security tools if needed".to_string(),
                ],
                confidence: TEMPLATE_CONFIDENCE,
                processing_time_seconds: 0.0,
            },
            Language::Fr => Annotation {
                summary: format!(
                    "Cette URL présente un niveau de risque {level} avec {redirects} redirections détectées."
                ),
                risk_assessment: {
                    let https_note = if is_https {
                        "La destination finale utilise HTTPS."
                    } else {
                        "Attention : protocole HTTP non sécurisé détecté."
                    };
                    let chain_note = if complex_chain {
                        " La chaîne de redirection complexe peut masquer la destination réelle."
                    } else {
                        ""
                    };
                    format!("L'analyse révèle {threats} menaces potentielles. {https_note}{chain_note}")
                },
                recommendations: vec![
                    if is_https {
                        "Destination sécurisée avec HTTPS".to_string()
                    } else {
                        "Éviter les liens non sécurisés (HTTP)".to_string()
                    },
                    if complex_chain {
                        "Méfiez-vous des redirections multiples".to_string()
                    } else {
                        "Chaîne de redirection simple".to_string()
                    },
                    "Vérifiez la réputation du domaine de destination".to_string(),
                    "Utilisez des outils de sécurité supplémentaires si nécessaire".to_string(),
                ],
                confidence: TEMPLATE_CONFIDENCE,
                processing_time_seconds: 0.0,
            },
        }
    }
}

#[async_trait]
impl Annotator for TemplateAnnotator {
    async fn annotate(
        &self,
        result: &AnalysisResult,
        language: Language,
    ) -> anyhow::Result<Annotation> {
        Ok(Self::render(result, language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::expand::StaticTable;
    use crate::UrlAnalyzer;
    use std::sync::Arc;

    async fn sample_result(destination: &str) -> AnalysisResult {
        let analyzer = UrlAnalyzer::with_strategies(
            &AnalyzerConfig::default(),
            vec![Arc::new(StaticTable::from_pairs([(
                "https://bit.ly/abc",
                destination,
            )]))],
        );
        analyzer.analyze("https://bit.ly/abc").await.unwrap()
    }

    #[tokio::test]
    async fn english_template_mentions_level_and_redirects() {
        let result = sample_result("https://example.com/landing").await;
        let annotation = TemplateAnnotator::render(&result, Language::En);
        // bit.ly hop + one redirect lands in the danger band.
        assert!(annotation.summary.contains("danger"));
        assert!(annotation.summary.contains("1 redirects"));
        assert!(annotation.risk_assessment.contains("HTTPS"));
        assert_eq!(annotation.confidence, 85);
        assert_eq!(annotation.recommendations.len(), 4);
    }

    #[tokio::test]
    async fn french_template_flags_insecure_destination() {
        let result = sample_result("http://insecure.example/page").await;
        let annotation = TemplateAnnotator::render(&result, Language::Fr);
        assert!(annotation.summary.contains("risque"));
        assert!(annotation
            .risk_assessment
            .contains("protocole HTTP non sécurisé"));
        assert_eq!(
            annotation.recommendations[0],
            "Éviter les liens non sécurisés (HTTP)"
        );
    }

    #[tokio::test]
    async fn template_is_deterministic() {
        let result = sample_result("https://example.com/landing").await;
        assert_eq!(
            TemplateAnnotator::render(&result, Language::En),
            TemplateAnnotator::render(&result, Language::En)
        );
    }

    #[tokio::test]
    async fn trait_impl_matches_pure_render() {
        let result = sample_result("https://example.com/landing").await;
        let via_trait = TemplateAnnotator
            .annotate(&result, Language::En)
            .await
            .unwrap();
        assert_eq!(via_trait, TemplateAnnotator::render(&result, Language::En));
    }
}
