//! Request definitions and the HTTP transport

use std::collections::HashMap;
use std::time::{Duration, Instant};

use apicheck_core::{Config, Response, Variables};

/// Body of a request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
}

/// A named request of a collection
///
/// `url`, header values and the body may contain `{{variable}}` placeholders,
/// resolved against the session variables right before sending.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub name: String,
    pub method: String,
    /// Absolute URL, or a path appended to the configured base URL
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, "GET", url)
    }

    #[must_use]
    pub fn post(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, "POST", url)
    }

    #[must_use]
    pub fn put(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, "PUT", url)
    }

    #[must_use]
    pub fn delete(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, "DELETE", url)
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    #[must_use]
    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Copy with every `{{variable}}` placeholder replaced.
    #[must_use]
    pub fn resolve(&self, vars: &Variables) -> Self {
        Self {
            name: self.name.clone(),
            method: self.method.clone(),
            url: vars.substitute(&self.url),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), vars.substitute(v)))
                .collect(),
            body: self.body.as_ref().map(|body| match body {
                RequestBody::Json(value) => RequestBody::Json(substitute_json(value, vars)),
                RequestBody::Text(text) => RequestBody::Text(vars.substitute(text)),
            }),
        }
    }
}

fn substitute_json(value: &serde_json::Value, vars: &Variables) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => serde_json::Value::String(vars.substitute(s)),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(|v| substitute_json(v, vars)).collect())
        }
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_json(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Sends a resolved request and snapshots the response
pub trait Transport {
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request cannot be built or sent.
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("HTTP error: {0}")]
    Http(String),
}

/// Blocking `reqwest` transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client fails to build.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config.headers.clone(),
        })
    }

    fn full_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{url}", self.base_url)
        } else {
            format!("{}/{url}", self.base_url)
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;

        let mut req = self.client.request(method, self.full_url(&request.url));
        for (k, v) in self.headers.iter().chain(&request.headers) {
            if reqwest::header::HeaderValue::from_str(v).is_ok() {
                req = req.header(k, v);
            } else {
                log::warn!("skipping invalid header value for '{k}' on {}", request.name);
            }
        }
        match &request.body {
            Some(RequestBody::Json(value)) => req = req.json(value),
            Some(RequestBody::Text(text)) => req = req.body(text.clone()),
            None => {}
        }

        let start = Instant::now();
        let resp = req.send().map_err(|e| TransportError::Http(e.to_string()))?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status_code = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body_text = resp.text().map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Response {
            status_code,
            headers,
            body: if body_text.is_empty() {
                None
            } else {
                Some(body_text)
            },
            latency_ms,
        })
    }
}
