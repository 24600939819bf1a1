use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;
use webanalyse::handlers::*;
use webanalyse_scanner::ScanError;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://example.com");
    assert_eq!(result, Some("https://example.com".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_url_line_host_and_port() {
    let result = parse_url_line("localhost:8080/docs");
    assert_eq!(result, Some("http://localhost:8080/docs".to_string()));
}

#[test]
fn test_parse_url_line_trims_whitespace() {
    let result = parse_url_line("  https://example.com/a  ");
    assert_eq!(result, Some("https://example.com/a".to_string()));
}

#[test]
fn test_parse_url_line_invalid() {
    assert_eq!(parse_url_line("not a valid url!!!"), None);
    assert_eq!(parse_url_line("   "), None);
}

#[test]
fn test_analyser_config_from_flags() {
    let config = analyser_config(Some(3), 4, 15);
    assert_eq!(config.workers, 3);
    assert_eq!(config.probe_timeout, Duration::from_secs(4));
    assert_eq!(config.fetch_timeout, Duration::from_secs(15));

    let config = analyser_config(None, 10, 20);
    assert!(config.workers >= 1);
}

#[tokio::test]
async fn test_run_analysis_against_mock_site() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>CLI</title></head><body>
                <h2>Section</h2>
                <a href="/a">a</a><a href="/b">b</a><a href="/a">a</a>
            </body></html>"#,
        ))
        .mount(&site)
        .await;

    let summary = run_analysis(&site.uri(), analyser_config(Some(1), 2, 5), false)
        .await
        .unwrap();

    assert_eq!(summary.title, "CLI");
    assert_eq!(summary.headings.get("h2"), Some(&1));
    assert_eq!(summary.links.internal, 2);
    assert_eq!(summary.links.external, 0);
}

#[tokio::test]
async fn test_run_analysis_reports_status() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;

    let result = run_analysis(&site.uri(), analyser_config(Some(1), 2, 5), false).await;
    assert!(matches!(result, Err(ScanError::NotOk { status: 500 })));
}

#[test]
fn test_emit_report_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_file = NamedTempFile::new()?;
    let path = PathBuf::from(temp_file.path());

    emit_report("report body\n", Some(&path))?;

    assert_eq!(std::fs::read_to_string(&path)?, "report body\n");
    Ok(())
}
