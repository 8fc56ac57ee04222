//! HTTP response snapshot and RFC 7807 problem details

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{BodyKind, CheckError};

/// Snapshot of an HTTP response, as handed to test scripts
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Response {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
}

impl Response {
    #[must_use]
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Raw body text.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Parse`] if the response has no body.
    pub fn text(&self) -> Result<&str, CheckError> {
        self.body.as_deref().ok_or_else(|| CheckError::Parse {
            kind: BodyKind::Text,
            message: "response has no body".into(),
        })
    }

    /// Body parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Parse`] if the body is missing or not JSON.
    pub fn json(&self) -> Result<serde_json::Value, CheckError> {
        let text = self.body.as_deref().ok_or_else(|| CheckError::Parse {
            kind: BodyKind::Json,
            message: "response has no body".into(),
        })?;
        serde_json::from_str(text).map_err(|e| CheckError::Parse {
            kind: BodyKind::Json,
            message: e.to_string(),
        })
    }

    /// Body as a problem-details object, if it is one.
    #[must_use]
    pub fn problem(&self) -> Option<ProblemDetails> {
        let value = self.json().ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Header value, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// RFC 7807 error body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Application-specific members such as `serviceCode`
    #[serde(flatten)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl ProblemDetails {
    /// Most specific human-readable description: `detail`, else `title`.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| self.title.as_deref().filter(|t| !t.is_empty()))
    }
}
