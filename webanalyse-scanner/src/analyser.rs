use crate::error::{Result, ScanError};
use crate::links::LinkScan;
use crate::pool::default_pool_size;
use crate::prober::Prober;
use crate::result::PageSummary;
use crate::structure::PageStructure;
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!(
    "webanalyse/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/crackerplace/webanalyse)"
);

#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    pub fetch_timeout: Duration,
    pub probe_timeout: Duration,
    pub workers: usize,
    pub user_agent: String,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(20),
            probe_timeout: Duration::from_secs(10),
            workers: default_pool_size(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AnalyserConfig {
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches a page and produces its [`PageSummary`].
#[derive(Debug, Clone)]
pub struct Analyser {
    client: Client,
    prober: Prober,
    config: AnalyserConfig,
}

impl Analyser {
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            prober: Prober::new(client.clone()),
            client,
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// GETs `url` and returns the body. Anything but 200 OK is an error.
    pub async fn fetch_document(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Fetching {}", parsed);
        let response = self
            .client
            .get(parsed)
            .timeout(self.config.fetch_timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScanError::NotOk {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    pub async fn analyse(&self, url: &str) -> Result<PageSummary> {
        let body = match self.fetch_document(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Error while getting document for the url: {}, error is: {}", url, e);
                return Err(e);
            }
        };
        Ok(self.summarise(url, &body).await)
    }

    /// Analyses an already fetched page. Never fails: every problem below
    /// this point only shows up in the counts.
    pub async fn summarise(&self, url: &str, body: &str) -> PageSummary {
        // The parsed document is not Send; keep it out of the await below.
        let (mut summary, links) = {
            let document = Html::parse_document(body);
            let structure = PageStructure::new(&document);
            let summary = PageSummary {
                url: url.to_string(),
                title: structure.title(),
                version: structure.version(),
                headings: structure.headings(),
                has_login_form: structure.has_login_form(),
                links: Default::default(),
            };

            let links = LinkScan::start(
                &document,
                url,
                &self.prober,
                self.config.probe_timeout,
                self.config.workers,
            );
            (summary, links)
        };

        summary.links = links.finish().await;

        info!("Summary generated for url: {}", url);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn analyser() -> Analyser {
        Analyser::new(
            AnalyserConfig::default()
                .with_probe_timeout(Duration::from_secs(2))
                .with_fetch_timeout(Duration::from_secs(5))
                .with_workers(2),
        )
        .unwrap()
    }

    #[test]
    fn test_config_builder() {
        let config = AnalyserConfig::default()
            .with_workers(0)
            .with_user_agent("agent/1.0")
            .with_probe_timeout(Duration::from_secs(3));

        assert_eq!(config.workers, 1);
        assert_eq!(config.user_agent, "agent/1.0");
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.fetch_timeout, Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_fetch_document_ok() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let body = analyser().fetch_document(&mock_server.uri()).await.unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_document_not_ok() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing", mock_server.uri());
        match analyser().fetch_document(&url).await {
            Err(ScanError::NotOk { status }) => assert_eq!(status, 404),
            other => panic!("expected NotOk, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_document_invalid_url() {
        let result = analyser().fetch_document("not a url").await;
        assert!(matches!(result, Err(ScanError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_document_unreachable() {
        let result = analyser().fetch_document("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(ScanError::Http(_))));
    }

    #[tokio::test]
    async fn test_fetch_is_bounded_by_fetch_timeout_only() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let analyser = Analyser::new(
            AnalyserConfig::default()
                .with_probe_timeout(Duration::from_nanos(1))
                .with_fetch_timeout(Duration::from_secs(5)),
        )
        .unwrap();

        let body = analyser.fetch_document(&mock_server.uri()).await.unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_analyse_full_page() {
        let mock_server = MockServer::start().await;
        let page = format!(
            r#"<!DOCTYPE html>
            <html>
            <head><title>Shop</title></head>
            <body>
                <h1>Welcome</h1>
                <h2>New</h2><h2>Popular</h2>
                <form><input type="password" name="pw"></form>
                <a href="/cart">Cart</a>
                <a href="{0}/cart">Cart absolute</a>
                <a href="http://localhost:1/down">Partner</a>
                <a href="mailto:shop@example.com">Mail</a>
            </body>
            </html>"#,
            mock_server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&mock_server)
            .await;

        let summary = analyser().analyse(&mock_server.uri()).await.unwrap();

        assert_eq!(summary.title, "Shop");
        assert_eq!(summary.version, "html");
        assert_eq!(summary.headings.get("h1"), Some(&1));
        assert_eq!(summary.headings.get("h2"), Some(&2));
        assert_eq!(summary.total_headings(), 3);
        assert!(summary.has_login_form);
        assert_eq!(summary.login_label(), "Yes");
        assert_eq!(summary.links.internal, 2);
        assert_eq!(summary.links.external, 1);
        assert_eq!(summary.links.inaccessible, 1);
    }

    #[tokio::test]
    async fn test_analysis_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let analyser = analyser();
        let future = analyser.summarise("http://example.com", "<html></html>");
        assert_send(&future);
        let summary = future.await;
        assert_eq!(summary.links, Default::default());
        assert_eq!(summary.login_label(), "No");
    }
}
