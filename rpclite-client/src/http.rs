//! HTTP client engine
//!
//! Posts request text to `<host>/<service>` and returns the response body.
//! Any 2xx status is a response (an empty body means every request was a
//! notification); other statuses surface as `Error::HttpStatus`, and failures
//! to reach the server at all as `Error::Http`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use rpclite_core::{ClientEngine, Error, RequestIdGenerator, Result};
use std::time::Duration;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Engine sending requests to an HTTP server engine
///
/// # Examples
///
/// ```rust,no_run
/// use rpclite_client::HttpClientEngine;
/// use rpclite_core::ClientEngine;
/// use serde_json::json;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> rpclite_core::Result<()> {
/// let engine = HttpClientEngine::new("http://localhost:8080")?
///     .with_timeout(Duration::from_secs(2))?;
/// let text = engine.process_data("ITest", "MyTest", vec![json!("hi"), json!(3)]).await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
pub struct HttpClientEngine {
    host: String,
    http: reqwest::Client,
    timeout: Duration,
    ids: RequestIdGenerator,
    logger: Dispatch,
}

impl HttpClientEngine {
    /// Create an engine for `host` (for example `http://localhost:8080`)
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let host = host.into().trim_end_matches('/').to_string();
        Ok(Self {
            http: build_http(DEFAULT_TIMEOUT)?,
            host,
            timeout: DEFAULT_TIMEOUT,
            ids: RequestIdGenerator::new(),
            logger: rpclite_core::default_logger(),
        })
    }

    /// Use a different per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_http(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Log through `logger` instead of the default
    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// Server host, without a trailing slash
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL requests for `service_name` are posted to
    pub fn service_url(&self, service_name: &str) -> String {
        format!("{}/{}", self.host, service_name)
    }

    async fn post(&self, service_name: &str, request: &str) -> Result<String> {
        let url = self.service_url(service_name);
        tracing::debug!(url = %url, bytes = request.len(), "Sending request");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(request.to_string())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Request failed");
                Error::Http(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Server returned an error status");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(body)
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Http(e.to_string()))
}

#[async_trait]
impl ClientEngine for HttpClientEngine {
    fn name(&self) -> &str {
        "RpcHttpClientEngine"
    }

    fn request_ids(&self) -> &RequestIdGenerator {
        &self.ids
    }

    async fn process_string(&self, service_name: &str, request: &str) -> Result<String> {
        self.post(service_name, request)
            .with_subscriber(self.logger.clone())
            .await
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
