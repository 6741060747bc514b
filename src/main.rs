//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `safelinker` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Concurrent analysis of the requested URLs
//! - User-facing output formatting (colored text or JSON)
//!
//! All core functionality is implemented in the library crate.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::Semaphore;

use safelinker::config::CliLanguage;
use safelinker::{
    AnalysisResult, Annotation, AnalyzerConfig, Config, Language, OutputFormat, RiskLevel,
    TemplateAnnotator, UrlAnalyzer,
};

/// One JSON document per analyzed URL.
#[derive(Serialize)]
struct JsonOutput<'a> {
    analysis: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<&'a Annotation>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    env_logger::Builder::from_default_env()
        .filter_level(config.log_level.clone().into())
        .init();

    let analyzer_config = AnalyzerConfig {
        max_hops: config.max_hops,
        total_timeout: std::time::Duration::from_secs(config.timeout_seconds),
        user_agent: config.user_agent.clone(),
        ..AnalyzerConfig::default()
    };
    let analyzer = Arc::new(
        UrlAnalyzer::new(&analyzer_config).context("failed to initialize analyzer")?,
    );

    let urls = gather_urls(&config).await?;
    if urls.is_empty() {
        eprintln!("safelinker: no URLs to analyze");
        process::exit(1);
    }

    let language = match config.language {
        CliLanguage::En => Language::En,
        CliLanguage::Fr => Language::Fr,
    };

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut tasks = FuturesUnordered::new();
    for url in urls {
        let analyzer = Arc::clone(&analyzer);
        let semaphore = Arc::clone(&semaphore);
        let format = config.format.clone();
        let annotate = config.annotate;
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore never closes");
            match analyzer.analyze(&url).await {
                Ok(result) => {
                    let annotation =
                        annotate.then(|| TemplateAnnotator::render(&result, language));
                    Ok(render(&result, annotation.as_ref(), &format))
                }
                Err(err) => Err((url, err)),
            }
        }));
    }

    let mut failures = 0usize;
    while let Some(joined) = tasks.next().await {
        match joined {
            Ok(Ok(output)) => println!("{output}"),
            Ok(Err((url, err))) => {
                failures += 1;
                eprintln!("{} {url}: {err}", "error:".red().bold());
            }
            Err(join_error) => {
                failures += 1;
                log::warn!("analysis task panicked: {join_error:?}");
            }
        }
    }

    if failures > 0 {
        process::exit(1);
    }
    Ok(())
}

/// Collects the URLs to analyze from the command line, or from stdin when
/// the single argument `-` was given.
async fn gather_urls(config: &Config) -> Result<Vec<String>> {
    if config.urls.len() == 1 && config.urls[0] == "-" {
        let mut urls = Vec::new();
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                urls.push(trimmed.to_string());
            }
        }
        Ok(urls)
    } else {
        Ok(config.urls.clone())
    }
}

/// Formats one result for the terminal.
fn render(result: &AnalysisResult, annotation: Option<&Annotation>, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let output = JsonOutput {
                analysis: result,
                annotation,
            };
            serde_json::to_string_pretty(&output).expect("analysis result serializes")
        }
        OutputFormat::Text => render_text(result, annotation),
    }
}

fn render_text(result: &AnalysisResult, annotation: Option<&Annotation>) -> String {
    let level = match result.risk_level {
        RiskLevel::Secure => "SECURE".green().bold(),
        RiskLevel::Caution => "CAUTION".yellow().bold(),
        RiskLevel::Danger => "DANGER".red().bold(),
        RiskLevel::Critical => "CRITICAL".bright_red().bold(),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} [{} {}/100]\n",
        "⛓".cyan(),
        result.requested_url,
        level,
        result.risk_score
    ));
    for (index, hop) in result.chain.hops().iter().enumerate() {
        let marker = if index == result.chain.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        out.push_str(&format!("  {marker} [{}] {}\n", hop.status_code, hop.url));
    }
    if result.threats.is_empty() {
        out.push_str(&format!("  threats: {}\n", "none".green()));
    } else {
        let tags: Vec<String> = result.threats.iter().map(ToString::to_string).collect();
        out.push_str(&format!("  threats: {}\n", tags.join(", ").red()));
    }
    out.push_str(&format!(
        "  {} redirect(s), resolved in {:.2}s\n",
        result.total_redirects, result.scan_duration_seconds
    ));
    if let Some(annotation) = annotation {
        out.push_str(&format!("  {}\n", annotation.summary));
        for recommendation in &annotation.recommendations {
            out.push_str(&format!("   • {recommendation}\n"));
        }
    }
    out
}
