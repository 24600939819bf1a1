use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use url::Url;
use webanalyse_core::report::{ReportFormat, generate_report, save_report};
use webanalyse_core::server::{ServerConfig, fetch_error_message, serve, shutdown_signal};
use webanalyse_scanner::{Analyser, AnalyserConfig, PageSummary, ScanError};

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Only accept what already carries an authority; "example.com" parses
    // as a URL with scheme "example.com" otherwise.
    if Url::parse(line).map(|url| url.has_host()).unwrap_or(false) {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    match Url::parse(&with_scheme) {
        Ok(url) if url.has_host() => Some(with_scheme),
        _ => None,
    }
}

pub fn analyser_config(
    threads: Option<usize>,
    probe_timeout_secs: u64,
    fetch_timeout_secs: u64,
) -> AnalyserConfig {
    let config = AnalyserConfig::default()
        .with_probe_timeout(Duration::from_secs(probe_timeout_secs))
        .with_fetch_timeout(Duration::from_secs(fetch_timeout_secs));

    match threads {
        Some(threads) => config.with_workers(threads),
        None => config,
    }
}

pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Fetch and analyse `url`, with a spinner while the probes run.
pub async fn run_analysis(
    url: &str,
    config: AnalyserConfig,
    show_progress: bool,
) -> Result<PageSummary, ScanError> {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Analysing {} ({} workers)", url, config.workers));
        Some(pb)
    } else {
        None
    };

    let result = match Analyser::new(config) {
        Ok(analyser) => analyser.analyse(url).await,
        Err(e) => Err(e),
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    result
}

/// Print `content` to stdout, or save it when an output path was given.
pub fn emit_report(content: &str, output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            save_report(content, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{} Report saved to {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub async fn handle_analyse(args: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let raw_url = args
        .get_one::<String>("url")
        .context("--url is required")?;
    let url = parse_url_line(raw_url).with_context(|| format!("Invalid URL '{}'", raw_url))?;

    let format_name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format = ReportFormat::from_str(format_name)
        .with_context(|| format!("Unknown report format '{}'", format_name))?;

    let config = analyser_config(
        args.get_one::<usize>("threads").copied(),
        args.get_one::<u64>("timeout").copied().unwrap_or(10),
        args.get_one::<u64>("fetch-timeout").copied().unwrap_or(20),
    );

    let summary = match run_analysis(&url, config, !quiet).await {
        Ok(summary) => summary,
        Err(e) => anyhow::bail!(fetch_error_message(&url, &e)),
    };

    let report = generate_report(&summary, format)?;
    emit_report(&report, args.get_one::<PathBuf>("output"))
}

pub async fn handle_serve(args: &ArgMatches) -> anyhow::Result<()> {
    let bind = args
        .get_one::<String>("bind")
        .cloned()
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let request_timeout = args.get_one::<u64>("request-timeout").copied().unwrap_or(20);

    let config = ServerConfig::default()
        .with_bind(bind)
        .with_request_timeout(Duration::from_secs(request_timeout))
        .with_analyser(analyser_config(
            args.get_one::<usize>("threads").copied(),
            args.get_one::<u64>("timeout").copied().unwrap_or(10),
            20,
        ));

    serve(config, shutdown_signal()).await
}
