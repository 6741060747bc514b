//! Configuration: analyzer tuning knobs, CLI options, and the constant
//! tables the risk heuristics are built from.

use std::time::Duration;

use clap::{Parser, ValueEnum};

// constants (used as defaults)

/// Maximum number of hops in a resolved chain, the submitted URL included.
/// Bounds cyclic or adversarial shortener chains.
pub const MAX_HOPS: usize = 10;

/// Time budget for a single expansion-strategy attempt.
pub const STRATEGY_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(3);

/// Time budget for resolving one hop across all strategies.
pub const PER_HOP_TIMEOUT: Duration = Duration::from_secs(6);

/// Wall-clock budget for an entire chain resolution. When exhausted the
/// chain terminates at the last resolved hop; the analysis still succeeds.
pub const TOTAL_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(20);

/// Maximum URL length accepted as input. Matches common browser and server
/// limits.
pub const MAX_URL_LENGTH: usize = 2048;

/// Minimum interval between calls to the third-party unshortening API.
/// The service is rate limited; spacing requests client-side avoids bans.
pub const UNSHORTEN_API_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Retry attempts against the unshortening API before reporting failure.
pub const UNSHORTEN_API_RETRY_ATTEMPTS: usize = 2;

/// Initial backoff delay in milliseconds for unshortening API retries.
pub const UNSHORTEN_API_RETRY_DELAY_MS: u64 = 250;

/// Cap on the backoff delay between unshortening API retries. Keeps the
/// whole retry ladder inside the strategy attempt budget.
pub const UNSHORTEN_API_RETRY_MAX_DELAY_MS: u64 = 1000;

/// Default endpoint of the authoritative unshortening API.
pub const UNSHORTEN_API_ENDPOINT: &str = "https://unshorten.it/json/";

/// Default neutral fetch proxy used by the preview-scrape strategy. The
/// target URL is appended percent-encoded in the `url` query parameter.
pub const FETCH_PROXY_ENDPOINT: &str = "https://api.allorigins.win/get";

/// Default User-Agent for outbound requests. Generic Chrome-like string;
/// shortener endpoints serve interstitial pages to obvious bots.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Risk model tables. Scoring weights live next to the rules in
// `scoring.rs`; the domain/port/keyword lists are shared and sit here.

/// TLDs with heavy abuse history. A hop whose hostname ends with one of
/// these draws the high-risk TLD penalty.
pub const HIGH_RISK_TLDS: &[&str] = &[
    ".tk", ".ml", ".ga", ".cf", ".click", ".download", ".zip", ".exe",
];

/// TLDs with moderate abuse history.
pub const MEDIUM_RISK_TLDS: &[&str] = &[".info", ".biz", ".name", ".mobi"];

/// Substrings that mark a URL as carrying tracking-style query parameters.
pub const TRACKING_QUERY_MARKERS: &[&str] = &["redirect", "ref=", "utm_"];

/// Suspicious keyword substrings in a URL (phishing/scam/fake markers).
pub const SUSPICIOUS_KEYWORDS: &[&str] = &["phish", "scam", "fake"];

/// Ports commonly seen on throwaway or staging hosts.
pub const SUSPICIOUS_PORTS: &[u16] = &[8080, 8000, 3000, 4000, 9000];

/// Hostname label count above which the subdomain-chain penalty applies.
pub const MAX_HOSTNAME_LABELS: usize = 4;

/// URL length above which the obfuscation-length penalty applies.
pub const LONG_URL_THRESHOLD: usize = 200;

/// Well-known safe domains. A hop whose hostname contains one of these
/// earns a credit against the running score.
pub const SAFE_DOMAINS: &[&str] = &[
    "youtube.com",
    "google.com",
    "github.com",
    "stackoverflow.com",
    "wikipedia.org",
    "reddit.com",
    "twitter.com",
    "facebook.com",
    "linkedin.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
];

/// Tuning knobs for a [`crate::UrlAnalyzer`].
///
/// `Default` mirrors the constants above; library consumers override fields
/// selectively.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Maximum hops per chain, the submitted URL included.
    pub max_hops: usize,
    /// Budget for one strategy attempt.
    pub strategy_attempt_timeout: Duration,
    /// Budget for one hop across all strategies.
    pub per_hop_timeout: Duration,
    /// Wall-clock budget for the whole resolution.
    pub total_timeout: Duration,
    /// User-Agent sent on outbound requests.
    pub user_agent: String,
    /// Endpoint of the authoritative unshortening API.
    pub unshorten_api_endpoint: String,
    /// Neutral fetch proxy for the preview-scrape strategy.
    pub fetch_proxy_endpoint: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            max_hops: MAX_HOPS,
            strategy_attempt_timeout: STRATEGY_ATTEMPT_TIMEOUT,
            per_hop_timeout: PER_HOP_TIMEOUT,
            total_timeout: TOTAL_RESOLUTION_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            unshorten_api_endpoint: UNSHORTEN_API_ENDPOINT.to_string(),
            fetch_proxy_endpoint: FETCH_PROXY_ENDPOINT.to_string(),
        }
    }
}

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Output format for the CLI.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable summary.
    Text,
    /// One JSON document per analyzed URL.
    Json,
}

/// Annotation language for `--annotate`.
#[derive(Clone, Debug, ValueEnum)]
pub enum CliLanguage {
    En,
    Fr,
}

/// Command-line options for the `safelinker` binary.
#[derive(Debug, Parser)]
#[command(
    name = "safelinker",
    about = "Follow a URL's redirect chain and score it for phishing and tracking risk"
)]
pub struct Config {
    /// URLs to analyze. Pass `-` to read newline-separated URLs from stdin.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Maximum redirect hops to follow per URL.
    #[arg(long, default_value_t = MAX_HOPS)]
    pub max_hops: usize,

    /// Wall-clock budget in seconds for resolving one URL.
    #[arg(long, default_value_t = TOTAL_RESOLUTION_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,

    /// Maximum URLs analyzed concurrently.
    #[arg(long, default_value_t = 4)]
    pub max_concurrency: usize,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Attach the deterministic template annotation to each result.
    #[arg(long)]
    pub annotate: bool,

    /// Language for the annotation text.
    #[arg(long, value_enum, default_value_t = CliLanguage::En)]
    pub language: CliLanguage,

    /// Logging verbosity.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// User-Agent header for outbound requests.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}
