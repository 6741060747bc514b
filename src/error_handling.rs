//! Error type definitions.
//!
//! Two layers: `AnalyzeError` is the only error surface callers of the
//! analysis facade ever see, and `ExpansionFailure` categorizes why a single
//! expansion-strategy attempt failed. Expansion failures are recovered
//! locally (the next strategy takes over) and never escape the resolver.

use thiserror::Error;

/// Caller-visible analysis failures.
///
/// Network-layer problems never surface here; degraded resolutions still
/// produce a result. Only malformed input and caller-initiated cancellation
/// abort an analysis.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The submitted string is not a syntactically valid absolute
    /// http/https URL.
    #[error("invalid input URL: {0}")]
    InvalidInput(String),

    /// The caller cancelled the analysis while it was in flight.
    /// Distinct from a timeout, which terminates the chain early but still
    /// yields a result.
    #[error("analysis cancelled by caller")]
    Cancelled,
}

/// Why a single expansion-strategy attempt could not resolve a hop.
///
/// Recovered locally; logged at debug level for diagnosis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionFailure {
    /// The attempt exceeded its time budget.
    #[error("attempt timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The request could not be completed (DNS, connect, TLS, read).
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response arrived but the expected field or pattern was absent.
    #[error("response carried no resolvable URL")]
    MissingField,

    /// No scrape pattern matched the fetched markup.
    #[error("no extraction pattern matched")]
    NoMatch,

    /// The candidate next-hop URL did not validate as absolute http(s).
    #[error("candidate URL invalid: {0}")]
    InvalidCandidate(String),
}

impl ExpansionFailure {
    /// Short stable code for logs and counters.
    pub fn code(&self) -> &'static str {
        match self {
            ExpansionFailure::Timeout => "timeout",
            ExpansionFailure::Status(_) => "status",
            ExpansionFailure::Network(_) => "network",
            ExpansionFailure::MissingField => "missing_field",
            ExpansionFailure::NoMatch => "no_match",
            ExpansionFailure::InvalidCandidate(_) => "invalid_candidate",
        }
    }
}

/// Converts transport errors into an `ExpansionFailure`, folding reqwest's
/// error taxonomy down to the categories the resolver cares about.
impl From<reqwest::Error> for ExpansionFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExpansionFailure::Timeout
        } else if let Some(status) = err.status() {
            ExpansionFailure::Status(status.as_u16())
        } else {
            ExpansionFailure::Network(err.to_string())
        }
    }
}
