//! Outbound GET with a body-driven retry.
//!
//! Only responses whose JSON body satisfies the retry predicate are retried.
//! Transport errors, timeouts and non-2xx statuses fail on the spot.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::AdapterError, model::UpstreamResponse};

/// A single GET, re-issued verbatim on every attempt.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Applied to each attempt separately.
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

/// dClimate's transient failure payload: `{"Response": "Error"}`.
pub fn is_transient_error(body: &Value) -> bool {
    body.get("Response").and_then(Value::as_str) == Some("Error")
}

pub async fn request<F>(
    http: &Client,
    config: &RequestConfig,
    retry_if: F,
) -> Result<UpstreamResponse, AdapterError>
where
    F: Fn(&Value) -> bool,
{
    let attempts = config.max_attempts.max(1);

    for attempt in 1..=attempts {
        debug!(url = %config.url, attempt, "sending upstream request");

        let response = send_once(http, config).await?;
        if !retry_if(&response.body) {
            return Ok(response);
        }

        if attempt < attempts {
            warn!(url = %config.url, attempt, "upstream reported a transient error, retrying");
            tokio::time::sleep(config.retry_delay).await;
        }
    }

    Err(AdapterError::UpstreamTransient { attempts })
}

async fn send_once(http: &Client, config: &RequestConfig) -> Result<UpstreamResponse, AdapterError> {
    let mut builder = http.get(&config.url).query(&config.query).timeout(config.timeout);
    for (name, value) in &config.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let res = builder.send().await.map_err(|e| {
        let kind = if e.is_timeout() { "timed out" } else { "failed" };
        AdapterError::UpstreamFailure(format!("Request to {} {kind}: {e}", config.url))
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|e| {
        AdapterError::UpstreamFailure(format!("Failed to read upstream response body: {e}"))
    })?;

    if !status.is_success() {
        return Err(AdapterError::UpstreamFailure(format!(
            "Upstream request failed with status {}: {}",
            status,
            truncate_body(&body),
        )));
    }

    let body: Value = serde_json::from_str(&body).map_err(|e| {
        AdapterError::UpstreamFailure(format!(
            "Failed to parse upstream JSON ({e}): {}",
            truncate_body(&body)
        ))
    })?;

    Ok(UpstreamResponse { status: status.as_u16(), body })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
