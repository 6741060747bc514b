//! safelinker library: URL redirect-chain resolution and risk scoring.
//!
//! Given a candidate URL, this library follows its chain of redirections
//! (shortener expansions included) to a final destination and assigns a
//! heuristic risk classification from structural signals observed along the
//! chain: suspicious TLDs, insecure schemes, tracking parameters, raw IP
//! hosts, and more.
//!
//! # Example
//!
//! ```no_run
//! use safelinker::{AnalyzerConfig, UrlAnalyzer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = UrlAnalyzer::new(&AnalyzerConfig::default())?;
//! let result = analyzer.analyze("https://bit.ly/3QzdcZp").await?;
//! println!(
//!     "{} -> {} (score {}, {})",
//!     result.requested_url, result.final_destination, result.risk_score, result.risk_level
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Resolution is best-effort by design: expansion strategies fail
//! individually and the chain terminates at the last hop that resolved.
//! Only malformed input and caller cancellation abort an analysis.
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod analyzer;
pub mod annotate;
pub mod config;
mod error_handling;
pub mod expand;
pub mod history;
mod models;
mod registry;
mod resolver;
mod scoring;
mod threats;
mod topology;

// Re-export public API
pub use analyzer::{validate_and_normalize_url, UrlAnalyzer};
pub use annotate::{Annotation, Annotator, Language, TemplateAnnotator};
pub use config::{AnalyzerConfig, Config, LogLevel, OutputFormat};
pub use error_handling::{AnalyzeError, ExpansionFailure};
pub use history::{generate_scan_id, ScanRecord, ScanStats};
pub use models::{
    AnalysisResult, LayoutPosition, NetworkNode, NodeRole, RedirectChain, RedirectHop, RiskLevel,
    ThreatTag, UrlMetadata,
};
pub use registry::ShortenerRegistry;
pub use resolver::ChainResolver;
pub use scoring::{risk_level_for, score_chain};
pub use threats::identify_threats;
pub use topology::build_network_nodes;
