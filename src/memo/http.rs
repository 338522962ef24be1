//! HTTP Request Primitive
//!
//! reqwest-backed request primitive that runs each request as a tokio task and
//! reports through the configuration's callbacks.

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::memo::{Method, RequestConfig, RequestPrimitive, ResponseStatus};

// == HTTP Primitive ==
/// Sends requests with a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpPrimitive {
    client: reqwest::Client,
}

impl HttpPrimitive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestPrimitive for HttpPrimitive {
    /// Resolves to the response payload once the request settled.
    type Native = JoinHandle<Result<Value>>;

    fn send(&self, config: RequestConfig) -> Self::Native {
        let client = self.client.clone();
        tokio::spawn(execute(client, config))
    }
}

/// Performs the request, then fires `on_success` (2xx only) and `on_complete`.
async fn execute(client: reqwest::Client, mut config: RequestConfig) -> Result<Value> {
    let method = config.method.unwrap_or(Method::Get);
    let request = build_request(&client, method, &config);
    let outcome = fetch(request, method, &config.url).await;

    match outcome {
        Ok((code, value)) => {
            let status = ResponseStatus::Network(code);
            if let Some(on_success) = config.on_success.take() {
                on_success(&value, &status);
            }
            if let Some(on_complete) = config.on_complete.take() {
                on_complete(&status);
            }
            Ok(value)
        }
        Err(e) => {
            debug!("Request to {} failed: {}", config.url, e);
            if let Some(on_complete) = config.on_complete.take() {
                on_complete(&ResponseStatus::Failed(e.to_string()));
            }
            Err(e)
        }
    }
}

/// Builds the outgoing request; query string for read-only methods, JSON body
/// otherwise.
fn build_request(
    client: &reqwest::Client,
    method: Method,
    config: &RequestConfig,
) -> reqwest::RequestBuilder {
    let mut request = client.request(method.into(), &config.url);

    for (name, value) in &config.headers {
        request = request.header(name, value);
    }

    if let Some(data) = &config.data {
        request = if method.is_read_only() {
            request.query(data)
        } else {
            request.json(data)
        };
    }
    request
}

/// Sends the request and decodes the body as JSON, falling back to a string.
async fn fetch(request: reqwest::RequestBuilder, method: Method, url: &str) -> Result<(u16, Value)> {
    let response = request
        .send()
        .await
        .map_err(|e| CacheError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CacheError::Request(format!(
            "{} {} returned {}",
            method, url, status
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| CacheError::Request(e.to_string()))?;

    let value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => Value::String(body),
    };

    Ok((status.as_u16(), value))
}
