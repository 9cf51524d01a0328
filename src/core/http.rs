//! Shared HTTP client used by providers.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::error::LlmError;

/// Configuration for the outbound HTTP client.
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Whole-request timeout. `None` leaves the request unbounded.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl HttpClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Thin wrapper over a pooled `reqwest::Client`.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, LlmError> {
        let default_ua = format!("promptrelay/{}", env!("CARGO_PKG_VERSION"));
        let ua = config.user_agent.as_deref().unwrap_or(&default_ua);

        let mut builder = reqwest::Client::builder().user_agent(ua);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            LlmError::ProviderConfiguration(format!("Failed to build reqwest client: {e}"))
        })?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// POST a JSON body and decode the JSON reply.
    ///
    /// An empty body or a literal `null` decodes to `Ok(None)`. Non-2xx
    /// statuses become [`LlmError::Api`] carrying the status and body text.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, headers, body),
        fields(url = %redact_query(url)),
        err
    )]
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<Option<Res>, LlmError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let mut req_builder = self.client.post(url).json(body);
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }

        let res = req_builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = res.status();

        if !status.is_success() {
            let error_text = res
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, "API returned error status");
            return Err(LlmError::Api {
                message: format!("{status}: {error_text}"),
                status_code: Some(status.as_u16()),
                source: None,
            });
        }

        debug!(status = %status, "HTTP request successful");

        let response_text = res.text().await.map_err(|e| self.transport_error(e))?;
        if response_text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Option<Res>>(&response_text).map_err(|e| LlmError::Parse {
            message: "Failed to parse API response".to_string(),
            source: Box::new(e),
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        match self.timeout {
            Some(timeout) if e.is_timeout() => LlmError::Timeout { timeout },
            _ => LlmError::Network {
                message: "Failed to complete request".to_string(),
                source: Box::new(e),
            },
        }
    }
}

/// Strip the query string so credentials passed as parameters never reach logs.
fn redact_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}
