//! HTTP transport seam.
//!
//! [`Transport`] is the single trait the search and chat clients speak.
//! [`HttpTransport`] is the real implementation over a shared
//! `reqwest::Client`; tests substitute scripted transports, and the retry
//! decorator in [`retry`](super::retry) wraps either transparently.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::telemetry;
use crate::{RagsweepError, Result};

/// Async boundary between request logic and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label for logs and metrics (e.g. "search", "chat").
    fn name(&self) -> &str;

    /// POST a JSON body and return the parsed JSON response.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
    ) -> Result<Value>;
}

/// Real transport over a pooled `reqwest` client with a fixed timeout.
#[derive(Clone)]
pub struct HttpTransport {
    name: String,
    http: Client,
}

impl HttpTransport {
    /// Build a transport with the given per-request timeout.
    pub fn new(name: impl Into<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            name: name.into(),
            http,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
    ) -> Result<Value> {
        let start = Instant::now();
        let mut request = self.http.post(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let result = match request.json(body).send().await {
            Ok(response) => handle_response_errors(response).await,
            Err(e) => Err(RagsweepError::Http(e.to_string())),
        };

        record_request(&self.name, start, result.is_ok());
        result
    }
}

/// Map the response status to a result, consuming the body.
///
/// 429 and 503 become [`RagsweepError::Overloaded`] with any integer
/// `Retry-After` hint attached; every other non-success status is a
/// terminal [`RagsweepError::Api`] carrying the body text.
async fn handle_response_errors(response: reqwest::Response) -> Result<Value> {
    let status = response.status();

    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| RagsweepError::Http(e.to_string()));
    }

    let code = status.as_u16();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs);

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };

    match code {
        429 | 503 => Err(RagsweepError::Overloaded {
            status: code,
            retry_after,
            message,
        }),
        401 | 403 => Err(RagsweepError::Api {
            status: code,
            message: format!("authentication rejected: {message}"),
        }),
        _ => Err(RagsweepError::Api {
            status: code,
            message,
        }),
    }
}

fn record_request(client: &str, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "client" => client.to_owned(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "client" => client.to_owned(),
    )
    .record(elapsed);
}
