//! HTTP front end: the form at `/` and the analysis at `POST /analyse`.

use crate::report::{generate_error_page, generate_html_report};
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span, warn};
use webanalyse_scanner::{Analyser, AnalyserConfig, ScanError};

const INDEX_PAGE: &str = include_str!("../assets/index.html");

pub const EMPTY_URL_MESSAGE: &str =
    "No URL was entered. Please enter the address of the page you want to analyse.";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Upper bound for a whole request, probing included.
    pub request_timeout: Duration,
    /// How long in-flight requests may run once shutdown starts.
    pub shutdown_grace: Duration,
    pub analyser: AnalyserConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(20),
            shutdown_grace: Duration::from_secs(5),
            analyser: AnalyserConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn with_analyser(mut self, analyser: AnalyserConfig) -> Self {
        self.analyser = analyser;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyseForm {
    #[serde(default)]
    pub url: String,
}

/// User-facing explanation of why a page could not be analysed.
pub fn fetch_error_message(url: &str, error: &ScanError) -> String {
    match error {
        ScanError::NotOk { status } => {
            format!("The website did not respond properly, status code is: {}", status)
        }
        other => format!("Could not access the website: {}, error is: {}", url, other),
    }
}

/// Builds the router. If the request timeout fires mid-analysis the probe
/// tasks already queued keep running until they finish on their own.
pub fn router(analyser: Arc<Analyser>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyse", post(analyse))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(analyser)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn analyse(State(analyser): State<Arc<Analyser>>, Form(form): Form<AnalyseForm>) -> Html<String> {
    let url = form.url.trim();
    if url.is_empty() {
        return Html(generate_error_page(EMPTY_URL_MESSAGE));
    }

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("analyse", %request_id, url);

    async {
        match analyser.analyse(url).await {
            Ok(summary) => Html(generate_html_report(&summary)),
            Err(e) => {
                error!("Error while getting document for the url: {}, error is: {}", url, e);
                Html(generate_error_page(&fetch_error_message(url, &e)))
            }
        }
    }
    .instrument(span)
    .await
}

/// Binds `config.bind` and serves until `shutdown` resolves. In-flight
/// requests then get `config.shutdown_grace` to finish before the server
/// stops waiting for them.
pub async fn serve<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(&config.bind).await?;
    serve_with_listener(listener, config, shutdown).await
}

pub async fn serve_with_listener<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let analyser = Arc::new(Analyser::new(config.analyser.clone())?);
    let app = router(analyser, config.request_timeout);

    let addr: SocketAddr = listener.local_addr()?;
    info!("Service started: host={}", addr);

    let (stopping_tx, stopping_rx) = oneshot::channel::<()>();
    let signal = async move {
        shutdown.await;
        let _ = stopping_tx.send(());
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = stopping_rx => {
            match tokio::time::timeout(config.shutdown_grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    "Requests still running after {:?}, stopping without them",
                    config.shutdown_grace
                ),
            }
        }
    }

    info!("Service stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
