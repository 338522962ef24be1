//! Request Configuration Module
//!
//! Typed description of an outbound request and its callback hooks.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CacheError;

// == Method ==
/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// GET and HEAD do not change server state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            other => Err(CacheError::InvalidRequest(format!(
                "unsupported method: {}",
                other
            ))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

// == Response Status ==
/// Outcome reported to success and completion callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Served from the cache, no request was sent
    Cache,
    /// Answered by the network with this HTTP status
    Network(u16),
    /// The request failed
    Failed(String),
}

impl ResponseStatus {
    pub fn is_cache(&self) -> bool {
        matches!(self, ResponseStatus::Cache)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Cache => write!(f, "CACHE"),
            ResponseStatus::Network(code) => write!(f, "{}", code),
            ResponseStatus::Failed(reason) => write!(f, "error: {}", reason),
        }
    }
}

/// Invoked with the response payload on success.
pub type SuccessCallback = Box<dyn FnOnce(&Value, &ResponseStatus) + Send>;

/// Invoked once the request settled, whatever the outcome.
pub type CompleteCallback = Box<dyn FnOnce(&ResponseStatus) + Send>;

// == Request Config ==
/// An outbound request: identity fields plus callback hooks.
#[derive(Default)]
pub struct RequestConfig {
    /// None behaves like GET
    pub method: Option<Method>,
    pub url: String,
    /// Sorted so the cache key does not depend on insertion order
    pub headers: BTreeMap<String, String>,
    pub data: Option<Value>,
    /// Caller state handed back on cache hits
    pub context: Option<Value>,
    pub on_success: Option<SuccessCallback>,
    pub on_complete: Option<CompleteCallback>,
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("context", &self.context)
            .field("on_success", &self.on_success.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl RequestConfig {
    /// A request to `url` with no method set.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// A GET request to `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url).method(Method::Get)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Value, &ResponseStatus) + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&ResponseStatus) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    // == Cache Key ==
    /// Cache key: URL, then the JSON headers if any, then the JSON body if any.
    pub fn cache_key(&self) -> String {
        let mut key = self.url.clone();
        if !self.headers.is_empty() {
            key.push_str(&serde_json::to_string(&self.headers).unwrap_or_default());
        }
        if let Some(data) = &self.data {
            key.push_str(&data.to_string());
        }
        key
    }
}
