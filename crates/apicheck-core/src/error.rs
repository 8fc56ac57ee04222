//! Check failures
//!
//! Every assertion returns a [`CheckResult`]. A failure carries enough context
//! (property, expected, actual) to render a one-line message.

use std::fmt;

/// Body representation a check tried to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Text,
    Json,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// A failed assertion or a body that could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// Status code differs from the expected one
    #[error("{}", status_message(*expected, *actual, problem.as_deref()))]
    Status {
        expected: u16,
        actual: u16,
        /// `detail` or `title` of a problem-details body, if any
        problem: Option<String>,
    },

    /// Application error code differs from the expected one
    #[error("Expected {property} to be '{expected}' but got '{actual}'")]
    ServiceCode {
        property: String,
        expected: String,
        actual: String,
    },

    /// Array length outside the expected bounds
    #[error("Expected {expected} but got {actual} element(s)")]
    Cardinality { expected: String, actual: usize },

    /// Body has the wrong JSON shape (array vs. object)
    #[error("{0}")]
    Shape(String),

    /// Property condition not met
    #[error("Expected {property} {condition} but got {actual}")]
    Property {
        property: String,
        condition: String,
        actual: String,
    },

    /// Body could not be read as text or JSON
    #[error("Response body is not valid {kind}: {message}")]
    Parse { kind: BodyKind, message: String },

    /// Body does not validate against a JSON Schema
    #[error("Response body does not match schema: {0}")]
    Schema(String),

    /// Regex or schema given to a check is itself invalid
    #[error("Invalid {what} '{input}': {message}")]
    Invalid {
        what: &'static str,
        input: String,
        message: String,
    },

    /// Failure raised by a caller-supplied callback
    #[error("{0}")]
    Custom(String),
}

impl CheckError {
    /// Failure for use inside custom callbacks.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    pub(crate) fn property(
        property: &str,
        condition: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Property {
            property: property.to_string(),
            condition: condition.into(),
            actual: actual.into(),
        }
    }
}

/// Result of a single check or callback
pub type CheckResult = Result<(), CheckError>;

/// Fail with a custom message unless `condition` holds.
///
/// Lets callbacks use the same `?` chaining as the built-in checks:
///
/// ```
/// use apicheck_core::error::{ensure, CheckResult};
///
/// fn check(count: usize) -> CheckResult {
///     ensure(count > 0, "expected at least one item")?;
///     Ok(())
/// }
/// assert!(check(0).is_err());
/// ```
pub fn ensure(condition: bool, message: impl Into<String>) -> CheckResult {
    if condition {
        Ok(())
    } else {
        Err(CheckError::Custom(message.into()))
    }
}

fn status_message(expected: u16, actual: u16, problem: Option<&str>) -> String {
    match problem {
        Some(problem) => format!("Expected status {expected} but got {actual}: {problem}"),
        None => format!("Expected status {expected} but got {actual}"),
    }
}
