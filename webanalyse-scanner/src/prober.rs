use crate::error::ProbeError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// HEAD-based reachability check for external links.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns `true` when `url` answers with a status below 400 within
    /// `timeout`. Every failure, rejected or unreachable, yields `false`.
    pub async fn probe(&self, url: &str, timeout: Duration) -> bool {
        match self.check(url, timeout).await {
            Ok(status) => {
                debug!("Accessible url: {} ({})", url, status.as_u16());
                true
            }
            Err(ProbeError::Status { code }) => {
                warn!("Inaccessible url: {} with status code: {}", url, code);
                false
            }
            Err(ProbeError::Request(e)) => {
                warn!("Inaccessible url: {} with error: {}", url, e);
                false
            }
        }
    }

    pub async fn check(&self, url: &str, timeout: Duration) -> Result<StatusCode, ProbeError> {
        let response = self.client.head(url).timeout(timeout).send().await?;
        let status = response.status();

        if status.as_u16() >= 400 {
            return Err(ProbeError::Status {
                code: status.as_u16(),
            });
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn server_with(route: &str, template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_probe_ok_is_reachable() {
        let mock_server = server_with("/ok", ResponseTemplate::new(200)).await;
        let prober = Prober::new(Client::new());

        let url = format!("{}/ok", mock_server.uri());
        assert!(prober.probe(&url, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_probe_redirect_status_is_reachable() {
        let mock_server = server_with("/moved", ResponseTemplate::new(304)).await;
        let prober = Prober::new(Client::new());

        let url = format!("{}/moved", mock_server.uri());
        assert!(prober.probe(&url, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_probe_not_found_is_unreachable() {
        let mock_server = server_with("/missing", ResponseTemplate::new(404)).await;
        let prober = Prober::new(Client::new());

        let url = format!("{}/missing", mock_server.uri());
        assert!(!prober.probe(&url, TIMEOUT).await);

        match prober.check(&url, TIMEOUT).await {
            Err(ProbeError::Status { code }) => assert_eq!(code, 404),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_server_error_is_unreachable() {
        let mock_server = server_with("/boom", ResponseTemplate::new(503)).await;
        let prober = Prober::new(Client::new());

        let url = format!("{}/boom", mock_server.uri());
        assert!(!prober.probe(&url, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_probe_timeout_is_unreachable() {
        let mock_server = server_with(
            "/slow",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(3)),
        )
        .await;
        let prober = Prober::new(Client::new());

        let url = format!("{}/slow", mock_server.uri());
        assert!(!prober.probe(&url, Duration::from_millis(200)).await);

        match prober.check(&url, Duration::from_millis(200)).await {
            Err(ProbeError::Request(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_connection_refused_is_unreachable() {
        let prober = Prober::new(Client::new());
        assert!(!prober.probe("http://127.0.0.1:1/", TIMEOUT).await);
    }
}
